//! # Concrete Tree Nodes
//!
//! The node representation the editing surface stores. Serializes to the
//! usual `{type, attrs, content, text, marks}` JSON shape.
//!
//! ## Positions
//!
//! ```text
//! <doc> <p> H e l l o </p> <hr> </doc>
//!      0   1 2 3 4 5   6     7
//! ```
//!
//! - text counts one per character
//! - leaf atoms count one
//! - every other node counts its content plus one for opening and closing

use crate::schema::node_types;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const LEAF_TYPES: &[&str] = &[
    node_types::HORIZONTAL_RULE,
    node_types::WRITING_AREA,
    node_types::IMAGE,
    node_types::BLANK,
    node_types::HARD_BREAK,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Node {
    pub fn new(node_type: impl Into<String>, attrs: Map<String, Value>, content: Vec<Node>) -> Self {
        Self {
            node_type: node_type.into(),
            attrs,
            content,
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            node_type: node_types::TEXT.to_string(),
            attrs: Map::new(),
            content: Vec::new(),
            text: Some(text.into()),
            marks,
        }
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.is_text() || LEAF_TYPES.contains(&self.node_type.as_str())
    }

    /// The `id` attribute, when it is a string
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.attrs.insert("id".to_string(), Value::String(id.into()));
    }

    /// Size of the node in document positions
    pub fn node_size(&self) -> usize {
        match &self.text {
            Some(text) => text.chars().count(),
            None if self.is_leaf() => 1,
            None => self.content_size() + 2,
        }
    }

    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.content.iter().map(Node::text_content).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paragraph(text: &str) -> Node {
        Node::new("paragraph", Map::new(), vec![Node::text(text, vec![])])
    }

    #[test]
    fn test_node_sizes() {
        assert_eq!(Node::text("Hello", vec![]).node_size(), 5);
        assert_eq!(paragraph("Hello").node_size(), 7);
        assert_eq!(Node::new("horizontalRule", Map::new(), vec![]).node_size(), 1);
        assert_eq!(Node::new("paragraph", Map::new(), vec![]).node_size(), 2);
    }

    #[test]
    fn test_id_attribute() {
        let mut node = paragraph("x");
        assert_eq!(node.id(), None);
        node.set_id("p1");
        assert_eq!(node.id(), Some("p1"));
    }

    #[test]
    fn test_json_shape() {
        let node: Node = serde_json::from_value(json!({
            "type": "paragraph",
            "attrs": { "id": "p1" },
            "content": [{ "type": "text", "text": "Hi", "marks": [{ "type": "bold" }] }]
        }))
        .unwrap();

        assert_eq!(node.id(), Some("p1"));
        assert_eq!(node.content[0].marks, vec![Mark::new("bold")]);
        assert_eq!(node.text_content(), "Hi");

        let value = serde_json::to_value(Node::text("a", vec![])).unwrap();
        assert_eq!(value, json!({ "type": "text", "text": "a" }));
    }
}
