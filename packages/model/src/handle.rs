use crate::error::DocumentResult;
use crate::node::Node;
use crate::schema::Schema;
use serde_json::{Map, Value};

/// Traversal control returned by a [`DocumentHandle::descendants`] callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    /// Do not visit this node's children
    SkipChildren,
    /// End the traversal
    Stop,
}

/// Live, mutable document tree as exposed by an editing surface
///
/// Positions follow the convention documented in [`crate::node`]. Every
/// structural primitive works on node boundaries; the executor and the
/// resolver never need anything else.
pub trait DocumentHandle {
    fn schema(&self) -> &Schema;

    /// Depth-first walk over every node below the root, in document order,
    /// with the position directly before each node
    fn descendants<'a>(&'a self, f: &mut dyn FnMut(&'a Node, usize) -> Walk);

    /// Node starting at `pos`
    fn node_at(&self, pos: usize) -> Option<&Node>;

    /// Replace the sibling range `from..to` with `nodes`, returning what was removed
    fn replace_with(&mut self, from: usize, to: usize, nodes: Vec<Node>) -> DocumentResult<Vec<Node>>;

    /// Copies of the sibling nodes covering `from..to`
    fn slice(&self, from: usize, to: usize) -> DocumentResult<Vec<Node>>;

    /// Widen `from..to` to a sibling range in the deepest container holding both ends
    fn block_range(&self, from: usize, to: usize) -> DocumentResult<(usize, usize)>;

    /// Replace the attributes of the node at `pos`
    fn set_node_attrs(&mut self, pos: usize, attrs: Map<String, Value>) -> DocumentResult<()>;

    fn insert(&mut self, pos: usize, nodes: Vec<Node>) -> DocumentResult<()> {
        self.replace_with(pos, pos, nodes).map(|_| ())
    }

    fn delete(&mut self, from: usize, to: usize) -> DocumentResult<Vec<Node>> {
        self.replace_with(from, to, Vec::new())
    }
}
