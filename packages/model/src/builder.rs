//! # Node Builder
//!
//! Pure conversion from declarative [`Block`]/[`Inline`] values to
//! concrete [`Node`]s. Attributes start from the schema defaults and are
//! overridden 1:1 by the description; nothing here touches a document.

use crate::blocks::{Block, Inline, ListItem};
use crate::error::BuildError;
use crate::node::{Mark, Node};
use crate::schema::{node_types, NodeSpec, Schema};
use serde_json::{json, Map, Value};

fn node_spec<'s>(schema: &'s Schema, name: &str) -> Result<&'s NodeSpec, BuildError> {
    schema
        .node_type(name)
        .ok_or_else(|| BuildError::UnknownNodeType(name.to_string()))
}

fn empty_node(schema: &Schema, name: &str, content: Vec<Node>) -> Result<Node, BuildError> {
    let spec = node_spec(schema, name)?;
    Ok(Node::new(spec.name, spec.default_attrs.clone(), content))
}

/// Build one block node, recursing into nested blocks
pub fn build_block(schema: &Schema, block: &Block) -> Result<Node, BuildError> {
    let spec = node_spec(schema, block.type_name())?;
    let mut attrs = spec.default_attrs.clone();
    if let Some(id) = block.id() {
        attrs.insert("id".to_string(), json!(id));
    }

    let content = match block {
        Block::Paragraph { content, .. } => build_inline(schema, content)?,

        Block::Heading { level, content, .. } => {
            attrs.insert("level".to_string(), json!(level));
            build_inline(schema, content)?
        }

        Block::BulletList { items, .. } => build_items(schema, items)?,

        Block::OrderedList { start, items, .. } => {
            if let Some(start) = start {
                attrs.insert("start".to_string(), json!(start));
            }
            build_items(schema, items)?
        }

        Block::Blockquote { content, .. } | Block::Group { content, .. } | Block::NoteBlock { content, .. } => {
            build_blocks(schema, content)?
        }

        Block::HorizontalRule { .. } => Vec::new(),

        Block::Exercise { task, content, .. } => vec![
            empty_node(schema, node_types::TASK_DEFINITION, build_inline(schema, task)?)?,
            empty_node(schema, node_types::EXERCISE_BODY, build_blocks(schema, content)?)?,
        ],

        Block::WritingArea { lines, .. } => {
            attrs.insert("lines".to_string(), json!(lines));
            Vec::new()
        }

        Block::Image { src, alt, .. } => {
            attrs.insert("src".to_string(), json!(src));
            attrs.insert("alt".to_string(), json!(alt));
            Vec::new()
        }
    };

    Ok(Node::new(spec.name, attrs, content))
}

pub fn build_blocks(schema: &Schema, blocks: &[Block]) -> Result<Vec<Node>, BuildError> {
    blocks.iter().map(|block| build_block(schema, block)).collect()
}

fn build_items(schema: &Schema, items: &[ListItem]) -> Result<Vec<Node>, BuildError> {
    items
        .iter()
        .map(|item| {
            let mut node = empty_node(schema, node_types::LIST_ITEM, build_blocks(schema, &item.content)?)?;
            if let Some(id) = &item.id {
                node.set_id(id.clone());
            }
            Ok(node)
        })
        .collect()
}

/// Build inline content; empty text runs are dropped
pub fn build_inline(schema: &Schema, content: &[Inline]) -> Result<Vec<Node>, BuildError> {
    let mut nodes = Vec::with_capacity(content.len());

    for inline in content {
        let spec = node_spec(schema, inline.type_name())?;

        match inline {
            Inline::Text { text, marks } => {
                if text.is_empty() {
                    continue;
                }
                let mut built: Vec<Mark> = Vec::with_capacity(marks.len());
                for mark in marks {
                    let name = schema
                        .mark_type(mark.as_str())
                        .ok_or_else(|| BuildError::UnknownMarkType(mark.as_str().to_string()))?;
                    if !built.iter().any(|m| m.mark_type == name) {
                        built.push(Mark::new(name));
                    }
                }
                nodes.push(Node::text(text.clone(), built));
            }

            Inline::Blank {
                correct_answer,
                alternative_answers,
                hint,
            } => {
                let mut attrs = spec.default_attrs.clone();
                attrs.insert("correctAnswer".to_string(), json!(correct_answer));
                attrs.insert("alternativeAnswers".to_string(), json!(alternative_answers));
                attrs.insert("hint".to_string(), json!(hint));
                nodes.push(Node::new(spec.name, attrs, Vec::new()));
            }

            Inline::HardBreak => nodes.push(Node::new(spec.name, spec.default_attrs.clone(), Vec::new())),
        }
    }

    Ok(nodes)
}

/// Build a container of type `name` around already-built `content`
///
/// An exercise wrapper gets an empty task definition and holds the
/// content in its body.
pub fn build_wrapper(schema: &Schema, name: &str, content: Vec<Node>) -> Result<Node, BuildError> {
    let spec = node_spec(schema, name)?;
    let content = if spec.name == node_types::EXERCISE {
        vec![
            empty_node(schema, node_types::TASK_DEFINITION, Vec::new())?,
            empty_node(schema, node_types::EXERCISE_BODY, content)?,
        ]
    } else {
        content
    };
    Ok(Node::new(spec.name, spec.default_attrs.clone(), content))
}

/// Attributes with `patch` shallow-merged over `base`
pub fn merge_attrs(base: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::MarkKind;

    #[test]
    fn test_build_paragraph_with_marks() {
        let block = Block::Paragraph {
            id: Some("p1".to_string()),
            content: vec![
                Inline::Text {
                    text: "Hello ".to_string(),
                    marks: vec![MarkKind::Bold, MarkKind::Bold, MarkKind::Italic],
                },
                Inline::text(""),
                Inline::HardBreak,
            ],
        };

        let node = build_block(&Schema::lesson(), &block).unwrap();
        assert_eq!(node.node_type, "paragraph");
        assert_eq!(node.id(), Some("p1"));
        assert_eq!(node.content.len(), 2);
        assert_eq!(node.content[0].marks, vec![Mark::new("bold"), Mark::new("italic")]);
        assert_eq!(node.content[1].node_type, "hardBreak");
    }

    #[test]
    fn test_build_exercise_structure() {
        let block = Block::Exercise {
            id: None,
            task: vec![Inline::text("Fill in the gaps")],
            content: vec![Block::Paragraph {
                id: None,
                content: vec![
                    Inline::text("She "),
                    Inline::Blank {
                        correct_answer: "went".to_string(),
                        alternative_answers: vec![],
                        hint: Some("go".to_string()),
                    },
                ],
            }],
        };

        let node = build_block(&Schema::lesson(), &block).unwrap();
        assert_eq!(node.content.len(), 2);
        assert_eq!(node.content[0].node_type, "taskDefinition");
        assert_eq!(node.content[0].text_content(), "Fill in the gaps");
        assert_eq!(node.content[1].node_type, "exerciseBody");

        let blank = &node.content[1].content[0].content[1];
        assert_eq!(blank.attrs["correctAnswer"], json!("went"));
        assert_eq!(blank.attrs["hint"], json!("go"));
    }

    #[test]
    fn test_build_lists_and_defaults() {
        let block = Block::OrderedList {
            id: None,
            start: None,
            items: vec![ListItem {
                id: None,
                content: vec![Block::paragraph("one")],
            }],
        };

        let node = build_block(&Schema::lesson(), &block).unwrap();
        assert_eq!(node.attrs["start"], json!(1));
        assert_eq!(node.attrs["id"], Value::Null);
        assert_eq!(node.content[0].node_type, "listItem");
        assert_eq!(node.content[0].content[0].text_content(), "one");
    }

    #[test]
    fn test_unknown_node_type() {
        let schema = Schema::lesson().without("writingArea");
        let block = Block::Group {
            id: None,
            content: vec![Block::WritingArea { id: None, lines: 4 }],
        };

        assert_eq!(
            build_block(&schema, &block),
            Err(BuildError::UnknownNodeType("writingArea".to_string()))
        );
    }

    #[test]
    fn test_unknown_mark_type() {
        let schema = Schema::lesson().without_mark("strike");
        let content = vec![Inline::Text {
            text: "old".to_string(),
            marks: vec![MarkKind::Strike],
        }];

        assert_eq!(
            build_inline(&schema, &content),
            Err(BuildError::UnknownMarkType("strike".to_string()))
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let block = Block::paragraph("same");
        let schema = Schema::lesson();
        assert_eq!(build_block(&schema, &block), build_block(&schema, &block));
    }

    #[test]
    fn test_exercise_wrapper() {
        let schema = Schema::lesson();
        let inner = build_block(&schema, &Block::paragraph("x")).unwrap();
        let wrapper = build_wrapper(&schema, "exercise", vec![inner.clone()]).unwrap();
        assert_eq!(wrapper.content[1].content, vec![inner.clone()]);

        let group = build_wrapper(&schema, "group", vec![inner.clone()]).unwrap();
        assert_eq!(group.content, vec![inner]);
    }

    #[test]
    fn test_merge_attrs_preserves_unspecified() {
        let base = json!({ "a": 0, "b": 2 }).as_object().cloned().unwrap();
        let patch = json!({ "a": 1 }).as_object().cloned().unwrap();
        assert_eq!(Value::Object(merge_attrs(&base, &patch)), json!({ "a": 1, "b": 2 }));
    }
}
