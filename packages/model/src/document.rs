//! # In-Memory Document
//!
//! A plain tree implementation of [`DocumentHandle`]. The engine runs
//! against this in tests and in the CLI; an editing surface can provide
//! its own handle instead.
//!
//! Inserted block nodes that arrive without an `id` attribute get one
//! from the attached [`IdGenerator`] during the insertion itself, so a
//! later operation in the same batch can already address them.

use crate::blocks::Block;
use crate::builder::build_block;
use crate::error::{BuildError, DocumentError, DocumentResult};
use crate::handle::{DocumentHandle, Walk};
use crate::id_generator::IdGenerator;
use crate::node::Node;
use crate::schema::{node_types, ChildRule, ContentKind, NodeGroup, Schema};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Position between two siblings: the parent's child-index path plus the
/// index of the sibling that follows
#[derive(Debug, Clone, PartialEq, Eq)]
struct Boundary {
    path: Vec<usize>,
    index: usize,
}

#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
    schema: Schema,
    ids: IdGenerator,
}

impl Document {
    /// Wrap an existing `doc` node
    pub fn new(schema: Schema, root: Node) -> DocumentResult<Self> {
        if root.node_type != node_types::DOC {
            return Err(DocumentError::Malformed(format!(
                "root node must be '{}', found '{}'",
                node_types::DOC,
                root.node_type
            )));
        }
        check_shape(&root)?;

        Ok(Self {
            root,
            schema,
            ids: IdGenerator::default(),
        })
    }

    /// Empty lesson document
    pub fn empty(schema: Schema) -> Self {
        Self {
            root: Node::new(node_types::DOC, Map::new(), Vec::new()),
            schema,
            ids: IdGenerator::default(),
        }
    }

    /// Build a document from declarative blocks
    pub fn from_blocks(schema: Schema, blocks: &[Block]) -> Result<Self, BuildError> {
        let content = blocks
            .iter()
            .map(|block| build_block(&schema, block))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: Node::new(node_types::DOC, Map::new(), content),
            schema,
            ids: IdGenerator::default(),
        })
    }

    pub fn from_json(schema: Schema, value: Value) -> DocumentResult<Self> {
        let root: Node = serde_json::from_value(value).map_err(|e| DocumentError::Malformed(e.to_string()))?;
        Self::new(schema, root)
    }

    /// Load from the opaque byte blob a document store hands out
    pub fn from_slice(schema: Schema, bytes: &[u8]) -> DocumentResult<Self> {
        let root: Node = serde_json::from_slice(bytes).map_err(|e| DocumentError::Malformed(e.to_string()))?;
        Self::new(schema, root)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.root).unwrap_or(Value::Null)
    }

    pub fn to_bytes(&self) -> DocumentResult<Vec<u8>> {
        serde_json::to_vec(&self.root).map_err(|e| DocumentError::Malformed(e.to_string()))
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Swap in a whole new tree (used by history restore)
    pub fn set_root(&mut self, root: Node) -> DocumentResult<()> {
        if root.node_type != node_types::DOC {
            return Err(DocumentError::Malformed(format!("root node must be '{}'", node_types::DOC)));
        }
        check_shape(&root)?;
        self.root = root;
        Ok(())
    }

    pub fn content_size(&self) -> usize {
        self.root.content_size()
    }

    /// Give every id-less block node a fresh id, returning how many were assigned
    pub fn assign_missing_ids(&mut self) -> usize {
        let mut taken = self.collect_ids();
        let mut content = std::mem::take(&mut self.root.content);
        let assigned = assign_ids(&self.schema, &mut self.ids, &mut taken, &mut content);
        self.root.content = content;
        assigned
    }

    fn collect_ids(&self) -> HashSet<String> {
        let mut ids = HashSet::new();
        self.descendants(&mut |node, _| {
            if let Some(id) = node.id() {
                ids.insert(id.to_string());
            }
            Walk::Continue
        });
        ids
    }

    fn resolve(&self, pos: usize) -> DocumentResult<Boundary> {
        let size = self.content_size();
        if pos > size {
            return Err(DocumentError::invalid_position(pos, size));
        }

        let mut node = &self.root;
        let mut start = 0;
        let mut path = Vec::new();

        loop {
            let mut offset = start;
            let mut descend = None;

            for (i, child) in node.content.iter().enumerate() {
                if pos == offset {
                    return Ok(Boundary { path, index: i });
                }
                let end = offset + child.node_size();
                if pos < end {
                    if child.is_leaf() {
                        return Err(DocumentError::NotABoundary { pos });
                    }
                    descend = Some((i, offset + 1));
                    break;
                }
                offset = end;
            }

            match descend {
                Some((i, child_start)) => {
                    path.push(i);
                    node = &node.content[i];
                    start = child_start;
                }
                None => {
                    return Ok(Boundary {
                        path,
                        index: node.content.len(),
                    })
                }
            }
        }
    }

    fn container(&self, path: &[usize]) -> &Node {
        path.iter().fold(&self.root, |node, &i| &node.content[i])
    }

    fn container_mut(&mut self, path: &[usize]) -> &mut Node {
        let mut node = &mut self.root;
        for &i in path {
            node = &mut node.content[i];
        }
        node
    }

    /// Position of the boundary before child `index` of the container at `path`
    fn boundary_pos(&self, path: &[usize], index: usize) -> usize {
        let mut node = &self.root;
        let mut pos = 0;
        for &i in path {
            pos += node.content[..i].iter().map(Node::node_size).sum::<usize>() + 1;
            node = &node.content[i];
        }
        pos + node.content[..index].iter().map(Node::node_size).sum::<usize>()
    }

    fn sibling_range(&self, from: usize, to: usize) -> DocumentResult<(Boundary, Boundary)> {
        if from > to {
            return Err(DocumentError::InvalidRange { from, to });
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;
        if start.path != end.path {
            return Err(DocumentError::RangeCrossesParents { from, to });
        }
        Ok((start, end))
    }

    /// Check `nodes` standing in for `range` of the container `parent`
    fn check_content(&self, parent: &Node, range: Range<usize>, nodes: &[Node]) -> DocumentResult<()> {
        check_children(&self.schema, &parent.node_type, nodes)?;
        for node in nodes {
            check_shape(node)?;
            check_subtree(&self.schema, node)?;
        }

        let resulting: Vec<&str> = parent.content[..range.start]
            .iter()
            .chain(nodes)
            .chain(&parent.content[range.end..])
            .map(|node| node.node_type.as_str())
            .collect();
        check_sequence(&self.schema, &parent.node_type, &resulting)
    }

    /// Ids still present once `range` of the container at `path` is removed
    fn surviving_ids(&self, path: &[usize], range: Range<usize>) -> HashSet<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for_each_id(&self.root.content, &mut |id| *counts.entry(id.to_string()).or_insert(0) += 1);
        for_each_id(&self.container(path).content[range], &mut |id| {
            if let Some(count) = counts.get_mut(id) {
                *count -= 1;
            }
        });

        counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(id, _)| id)
            .collect()
    }
}

fn assign_ids(schema: &Schema, ids: &mut IdGenerator, taken: &mut HashSet<String>, nodes: &mut [Node]) -> usize {
    let mut assigned = 0;
    for node in nodes {
        let wants_id = schema
            .node_type(&node.node_type)
            .is_some_and(|spec| spec.is_block() && spec.name != node_types::DOC);

        if wants_id && node.id().is_none() {
            let mut id = ids.new_id();
            while taken.contains(&id) {
                id = ids.new_id();
            }
            taken.insert(id.clone());
            node.set_id(id);
            assigned += 1;
        }
        assigned += assign_ids(schema, ids, taken, &mut node.content);
    }
    assigned
}

fn for_each_id(nodes: &[Node], f: &mut dyn FnMut(&str)) {
    for node in nodes {
        if let Some(id) = node.id() {
            f(id);
        }
        for_each_id(&node.content, f);
    }
}

/// `text` and `content` must agree with the node kind
fn check_shape(node: &Node) -> DocumentResult<()> {
    match &node.text {
        Some(_) if node.node_type != node_types::TEXT => {
            return Err(DocumentError::Malformed(format!(
                "node type '{}' cannot carry text",
                node.node_type
            )));
        }
        Some(text) if text.is_empty() => {
            return Err(DocumentError::Malformed("text nodes must not be empty".to_string()));
        }
        None if node.node_type == node_types::TEXT => {
            return Err(DocumentError::Malformed("text node without text".to_string()));
        }
        _ => {}
    }

    if node.is_leaf() && !node.content.is_empty() {
        return Err(DocumentError::Malformed(format!(
            "leaf node type '{}' cannot have content",
            node.node_type
        )));
    }

    node.content.iter().try_for_each(check_shape)
}

/// Direct children of a `parent` node against its content kind and child rules
fn check_children(schema: &Schema, parent: &str, nodes: &[Node]) -> DocumentResult<()> {
    let Some(spec) = schema.node_type(parent) else {
        return Ok(());
    };

    for node in nodes {
        let child_spec = schema.node_type(&node.node_type);
        let child_group = child_spec.map(|s| s.group);
        let fits_kind = match spec.content {
            ContentKind::Blocks => !node.is_text() && child_group != Some(NodeGroup::Inline),
            ContentKind::Inline => node.is_text() || child_group == Some(NodeGroup::Inline),
            ContentKind::Empty | ContentKind::Text => {
                return Err(DocumentError::not_a_container(parent));
            }
        };
        let allowed = fits_kind
            && spec.allows_child(&node.node_type)
            && child_spec.map_or(true, |s| s.allows_parent(parent));

        if !allowed {
            return Err(DocumentError::InvalidContent {
                parent: parent.to_string(),
                child: node.node_type.clone(),
            });
        }
    }
    Ok(())
}

fn check_sequence(schema: &Schema, parent: &str, types: &[&str]) -> DocumentResult<()> {
    match schema.node_type(parent).map(|spec| spec.children) {
        Some(ChildRule::Sequence(expected)) if types != expected => Err(DocumentError::InvalidStructure {
            parent: parent.to_string(),
            expected: expected.join(", "),
        }),
        _ => Ok(()),
    }
}

/// Structure below a node about to enter the tree
fn check_subtree(schema: &Schema, node: &Node) -> DocumentResult<()> {
    check_children(schema, &node.node_type, &node.content)?;
    let types: Vec<&str> = node.content.iter().map(|child| child.node_type.as_str()).collect();
    check_sequence(schema, &node.node_type, &types)?;
    node.content.iter().try_for_each(|child| check_subtree(schema, child))
}

fn walk<'a>(node: &'a Node, start: usize, f: &mut dyn FnMut(&'a Node, usize) -> Walk) -> bool {
    let mut pos = start;
    for child in &node.content {
        match f(child, pos) {
            Walk::Stop => return false,
            Walk::SkipChildren => {}
            Walk::Continue => {
                if !child.content.is_empty() && !walk(child, pos + 1, f) {
                    return false;
                }
            }
        }
        pos += child.node_size();
    }
    true
}

impl DocumentHandle for Document {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn descendants<'a>(&'a self, f: &mut dyn FnMut(&'a Node, usize) -> Walk) {
        walk(&self.root, 0, f);
    }

    fn node_at(&self, pos: usize) -> Option<&Node> {
        let boundary = self.resolve(pos).ok()?;
        self.container(&boundary.path).content.get(boundary.index)
    }

    fn replace_with(&mut self, from: usize, to: usize, mut nodes: Vec<Node>) -> DocumentResult<Vec<Node>> {
        let (start, end) = self.sibling_range(from, to)?;
        let range = start.index..end.index;
        self.check_content(self.container(&start.path), range.clone(), &nodes)?;

        let mut taken = self.surviving_ids(&start.path, range.clone());
        let mut clash = None;
        for_each_id(&nodes, &mut |id| {
            if clash.is_none() && !taken.insert(id.to_string()) {
                clash = Some(id.to_string());
            }
        });
        if let Some(id) = clash {
            return Err(DocumentError::IdInUse(id));
        }
        assign_ids(&self.schema, &mut self.ids, &mut taken, &mut nodes);

        let parent = self.container_mut(&start.path);
        Ok(parent.content.splice(range, nodes).collect())
    }

    fn slice(&self, from: usize, to: usize) -> DocumentResult<Vec<Node>> {
        let (start, end) = self.sibling_range(from, to)?;
        Ok(self.container(&start.path).content[start.index..end.index].to_vec())
    }

    fn block_range(&self, from: usize, to: usize) -> DocumentResult<(usize, usize)> {
        if from > to {
            return Err(DocumentError::InvalidRange { from, to });
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;

        let depth = start
            .path
            .iter()
            .zip(&end.path)
            .take_while(|(a, b)| a == b)
            .count();
        let shared = &start.path[..depth];

        let first = start.path.get(depth).copied().unwrap_or(start.index);
        let last = end.path.get(depth).map(|i| i + 1).unwrap_or(end.index);
        if last < first {
            return Err(DocumentError::InvalidRange { from, to });
        }

        Ok((self.boundary_pos(shared, first), self.boundary_pos(shared, last)))
    }

    fn set_node_attrs(&mut self, pos: usize, attrs: Map<String, Value>) -> DocumentResult<()> {
        let boundary = self.resolve(pos)?;
        let node = self
            .container_mut(&boundary.path)
            .content
            .get_mut(boundary.index)
            .ok_or(DocumentError::NoNodeAt { pos })?;
        node.attrs = attrs;
        Ok(())
    }
}
