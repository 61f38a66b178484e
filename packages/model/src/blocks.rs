//! # Declarative Blocks
//!
//! The block/inline description an agent produces. These values carry no
//! positions; the builder turns them into concrete [`Node`](crate::Node)s.

use crate::schema::{mark_types, node_types};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
}

impl MarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkKind::Bold => mark_types::BOLD,
            MarkKind::Italic => mark_types::ITALIC,
            MarkKind::Underline => mark_types::UNDERLINE,
            MarkKind::Strike => mark_types::STRIKE,
            MarkKind::Code => mark_types::CODE,
        }
    }
}

/// Inline content of a textblock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<MarkKind>,
    },

    /// Fill-in-the-blank atom
    Blank {
        #[serde(rename = "correctAnswer")]
        correct_answer: String,
        #[serde(rename = "alternativeAnswers", default)]
        alternative_answers: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },

    HardBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Inline::Text { .. } => node_types::TEXT,
            Inline::Blank { .. } => node_types::BLANK,
            Inline::HardBreak => node_types::HARD_BREAK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Vec<Block>,
}

/// A block-level node description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Paragraph {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        content: Vec<Inline>,
    },

    Heading {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        level: u8,
        #[serde(default)]
        content: Vec<Inline>,
    },

    BulletList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        items: Vec<ListItem>,
    },

    OrderedList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u32>,
        items: Vec<ListItem>,
    },

    Blockquote {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        content: Vec<Block>,
    },

    HorizontalRule {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Task definition plus exercise body
    Exercise {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        task: Vec<Inline>,
        #[serde(default)]
        content: Vec<Block>,
    },

    Group {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        content: Vec<Block>,
    },

    NoteBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        content: Vec<Block>,
    },

    WritingArea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default = "default_lines")]
        lines: u32,
    },

    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
}

fn default_lines() -> u32 {
    3
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            id: None,
            content: vec![Inline::text(text)],
        }
    }

    /// Node type name this block builds into
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => node_types::PARAGRAPH,
            Block::Heading { .. } => node_types::HEADING,
            Block::BulletList { .. } => node_types::BULLET_LIST,
            Block::OrderedList { .. } => node_types::ORDERED_LIST,
            Block::Blockquote { .. } => node_types::BLOCKQUOTE,
            Block::HorizontalRule { .. } => node_types::HORIZONTAL_RULE,
            Block::Exercise { .. } => node_types::EXERCISE,
            Block::Group { .. } => node_types::GROUP,
            Block::NoteBlock { .. } => node_types::NOTE_BLOCK,
            Block::WritingArea { .. } => node_types::WRITING_AREA,
            Block::Image { .. } => node_types::IMAGE,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Block::Paragraph { id, .. }
            | Block::Heading { id, .. }
            | Block::BulletList { id, .. }
            | Block::OrderedList { id, .. }
            | Block::Blockquote { id, .. }
            | Block::HorizontalRule { id }
            | Block::Exercise { id, .. }
            | Block::Group { id, .. }
            | Block::NoteBlock { id, .. }
            | Block::WritingArea { id, .. }
            | Block::Image { id, .. } => id.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_json_shape() {
        let block: Block = serde_json::from_value(json!({
            "type": "heading",
            "level": 2,
            "content": [{ "type": "text", "text": "Vocabulary", "marks": ["bold"] }]
        }))
        .unwrap();

        match &block {
            Block::Heading { level, content, .. } => {
                assert_eq!(*level, 2);
                assert_eq!(
                    content[0],
                    Inline::Text {
                        text: "Vocabulary".to_string(),
                        marks: vec![MarkKind::Bold]
                    }
                );
            }
            other => panic!("Expected heading, got {:?}", other),
        }
        assert_eq!(block.type_name(), "heading");
    }

    #[test]
    fn test_blank_and_hard_break() {
        let inline: Vec<Inline> = serde_json::from_value(json!([
            { "type": "blank", "correctAnswer": "went", "alternativeAnswers": ["had gone"] },
            { "type": "hardBreak" }
        ]))
        .unwrap();

        assert_eq!(
            inline[0],
            Inline::Blank {
                correct_answer: "went".to_string(),
                alternative_answers: vec!["had gone".to_string()],
                hint: None,
            }
        );
        assert_eq!(inline[1], Inline::HardBreak);
    }

    #[test]
    fn test_writing_area_default_lines() {
        let block: Block = serde_json::from_value(json!({ "type": "writingArea", "id": "w1" })).unwrap();
        assert_eq!(
            block,
            Block::WritingArea {
                id: Some("w1".to_string()),
                lines: 3
            }
        );
        assert_eq!(block.id(), Some("w1"));
    }

    #[test]
    fn test_unknown_block_type_rejected() {
        let result: Result<Block, _> = serde_json::from_value(json!({ "type": "video", "src": "x" }));
        assert!(result.is_err());
    }
}
