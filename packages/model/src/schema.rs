//! # Schema Registry
//!
//! Maps node-type and mark names to what the editing surface can
//! construct. The builder and the executor only create nodes whose type
//! is registered here.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Node type names known to the lesson schema
pub mod node_types {
    pub const DOC: &str = "doc";
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const BULLET_LIST: &str = "bulletList";
    pub const ORDERED_LIST: &str = "orderedList";
    pub const LIST_ITEM: &str = "listItem";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const HORIZONTAL_RULE: &str = "horizontalRule";
    pub const EXERCISE: &str = "exercise";
    pub const TASK_DEFINITION: &str = "taskDefinition";
    pub const EXERCISE_BODY: &str = "exerciseBody";
    pub const GROUP: &str = "group";
    pub const NOTE_BLOCK: &str = "noteBlock";
    pub const WRITING_AREA: &str = "writingArea";
    pub const IMAGE: &str = "image";
    pub const TEXT: &str = "text";
    pub const BLANK: &str = "blank";
    pub const HARD_BREAK: &str = "hardBreak";
}

/// Mark names known to the lesson schema
pub mod mark_types {
    pub const BOLD: &str = "bold";
    pub const ITALIC: &str = "italic";
    pub const UNDERLINE: &str = "underline";
    pub const STRIKE: &str = "strike";
    pub const CODE: &str = "code";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGroup {
    Block,
    Inline,
}

/// What a node type may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Child block nodes
    Blocks,
    /// Inline content (text, blanks, hard breaks)
    Inline,
    /// Leaf atom
    Empty,
    /// The text node itself
    Text,
}

/// Which child types a container accepts, on top of its [`ContentKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRule {
    Any,
    /// Only these types, any number of them
    OneOf(&'static [&'static str]),
    /// Exactly these types, in this order
    Sequence(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: &'static str,
    pub group: NodeGroup,
    pub content: ContentKind,
    pub default_attrs: Map<String, Value>,
    pub children: ChildRule,
    /// Parent types the node may appear under; `None` means any container
    pub parents: Option<&'static [&'static str]>,
}

impl NodeSpec {
    fn block(name: &'static str, content: ContentKind, attrs: Value) -> Self {
        let mut default_attrs = Map::new();
        default_attrs.insert("id".to_string(), Value::Null);
        if let Value::Object(extra) = attrs {
            default_attrs.extend(extra);
        }
        Self {
            name,
            group: NodeGroup::Block,
            content,
            default_attrs,
            children: ChildRule::Any,
            parents: None,
        }
    }

    fn inline(name: &'static str, content: ContentKind, attrs: Value) -> Self {
        let default_attrs = match attrs {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name,
            group: NodeGroup::Inline,
            content,
            default_attrs,
            children: ChildRule::Any,
            parents: None,
        }
    }

    fn with_children(mut self, children: ChildRule) -> Self {
        self.children = children;
        self
    }

    fn within(mut self, parents: &'static [&'static str]) -> Self {
        self.parents = Some(parents);
        self
    }

    /// Whether `child` may sit directly under this node type
    pub fn allows_child(&self, child: &str) -> bool {
        match self.children {
            ChildRule::Any => true,
            ChildRule::OneOf(types) | ChildRule::Sequence(types) => types.contains(&child),
        }
    }

    /// Whether this node type may sit directly under `parent`
    pub fn allows_parent(&self, parent: &str) -> bool {
        self.parents.map_or(true, |parents| parents.contains(&parent))
    }

    pub fn is_block(&self) -> bool {
        self.group == NodeGroup::Block
    }

    /// Whether the node holds inline content directly
    pub fn is_textblock(&self) -> bool {
        self.content == ContentKind::Inline
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, ContentKind::Empty | ContentKind::Text)
    }
}

/// Registry of constructible node and mark types
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: BTreeMap<&'static str, NodeSpec>,
    marks: Vec<&'static str>,
}

impl Schema {
    pub fn new(nodes: Vec<NodeSpec>, marks: Vec<&'static str>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|spec| (spec.name, spec)).collect(),
            marks,
        }
    }

    /// The full lesson schema
    pub fn lesson() -> Self {
        use node_types::*;
        use ContentKind::*;

        const LIST_CHILDREN: &[&str] = &[LIST_ITEM];
        const LISTS: &[&str] = &[BULLET_LIST, ORDERED_LIST];
        const EXERCISE_CHILDREN: &[&str] = &[TASK_DEFINITION, EXERCISE_BODY];
        const EXERCISE_PARENT: &[&str] = &[EXERCISE];

        let nodes = vec![
            NodeSpec {
                name: DOC,
                group: NodeGroup::Block,
                content: Blocks,
                default_attrs: Map::new(),
                children: ChildRule::Any,
                parents: None,
            },
            NodeSpec::block(PARAGRAPH, Inline, json!({})),
            NodeSpec::block(HEADING, Inline, json!({ "level": 1 })),
            NodeSpec::block(BULLET_LIST, Blocks, json!({})).with_children(ChildRule::OneOf(LIST_CHILDREN)),
            NodeSpec::block(ORDERED_LIST, Blocks, json!({ "start": 1 })).with_children(ChildRule::OneOf(LIST_CHILDREN)),
            NodeSpec::block(LIST_ITEM, Blocks, json!({})).within(LISTS),
            NodeSpec::block(BLOCKQUOTE, Blocks, json!({})),
            NodeSpec::block(HORIZONTAL_RULE, Empty, json!({})),
            NodeSpec::block(EXERCISE, Blocks, json!({})).with_children(ChildRule::Sequence(EXERCISE_CHILDREN)),
            NodeSpec::block(TASK_DEFINITION, Inline, json!({})).within(EXERCISE_PARENT),
            NodeSpec::block(EXERCISE_BODY, Blocks, json!({})).within(EXERCISE_PARENT),
            NodeSpec::block(GROUP, Blocks, json!({})),
            NodeSpec::block(NOTE_BLOCK, Blocks, json!({})),
            NodeSpec::block(WRITING_AREA, Empty, json!({ "lines": 3 })),
            NodeSpec::block(IMAGE, Empty, json!({ "src": "", "alt": null })),
            NodeSpec::inline(TEXT, Text, json!({})),
            NodeSpec::inline(
                BLANK,
                Empty,
                json!({ "correctAnswer": "", "alternativeAnswers": [], "hint": null }),
            ),
            NodeSpec::inline(HARD_BREAK, Empty, json!({})),
        ];

        let marks = vec![
            mark_types::BOLD,
            mark_types::ITALIC,
            mark_types::UNDERLINE,
            mark_types::STRIKE,
            mark_types::CODE,
        ];

        Self::new(nodes, marks)
    }

    /// Copy of this schema with one node type unregistered
    pub fn without(&self, name: &str) -> Self {
        let mut schema = self.clone();
        schema.nodes.remove(name);
        schema
    }

    /// Copy of this schema with one mark type unregistered
    pub fn without_mark(&self, name: &str) -> Self {
        let mut schema = self.clone();
        schema.marks.retain(|m| *m != name);
        schema
    }

    pub fn node_type(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.get(name)
    }

    pub fn mark_type(&self, name: &str) -> Option<&'static str> {
        self.marks.iter().copied().find(|m| *m == name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.keys().copied()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::lesson()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_schema_registers_all_blocks() {
        let schema = Schema::lesson();
        for name in [
            "paragraph",
            "heading",
            "bulletList",
            "orderedList",
            "blockquote",
            "horizontalRule",
            "exercise",
            "group",
            "noteBlock",
            "writingArea",
            "image",
        ] {
            let spec = schema.node_type(name).unwrap();
            assert!(spec.is_block(), "{} should be a block", name);
            assert!(spec.default_attrs.contains_key("id"));
        }
    }

    #[test]
    fn test_content_kinds() {
        let schema = Schema::lesson();
        assert!(schema.node_type("paragraph").unwrap().is_textblock());
        assert!(schema.node_type("heading").unwrap().is_textblock());
        assert!(!schema.node_type("image").unwrap().is_textblock());
        assert!(schema.node_type("horizontalRule").unwrap().is_leaf());
        assert!(schema.node_type("blank").unwrap().is_leaf());
    }

    #[test]
    fn test_child_and_parent_rules() {
        let schema = Schema::lesson();
        let list = schema.node_type("bulletList").unwrap();
        assert!(list.allows_child("listItem"));
        assert!(!list.allows_child("paragraph"));

        let item = schema.node_type("listItem").unwrap();
        assert!(item.allows_parent("orderedList"));
        assert!(!item.allows_parent("doc"));

        let exercise = schema.node_type("exercise").unwrap();
        assert_eq!(exercise.children, ChildRule::Sequence(&["taskDefinition", "exerciseBody"]));
        assert!(schema.node_type("paragraph").unwrap().allows_parent("exerciseBody"));
    }

    #[test]
    fn test_without_removes_type() {
        let schema = Schema::lesson().without("writingArea");
        assert!(schema.node_type("writingArea").is_none());
        assert!(schema.node_type("paragraph").is_some());
    }
}
