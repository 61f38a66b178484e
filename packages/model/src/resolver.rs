//! # ID Resolver
//!
//! Locates nodes by their `id` attribute. Ids are assumed unique; when a
//! document does contain duplicates the first match in document order
//! wins for single lookups and every match is reported for set lookups.

use crate::handle::{DocumentHandle, Walk};
use crate::node::Node;
use std::collections::{HashMap, HashSet};

/// A node together with the position directly before it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoundNode<'a> {
    pub node: &'a Node,
    pub pos: usize,
}

impl FoundNode<'_> {
    /// Position directly after the node
    pub fn end(&self) -> usize {
        self.pos + self.node.node_size()
    }
}

pub fn find_node_by_id<'a, D: DocumentHandle + ?Sized>(doc: &'a D, id: &str) -> Option<FoundNode<'a>> {
    let mut found = None;
    doc.descendants(&mut |node, pos| {
        if node.id() == Some(id) {
            found = Some(FoundNode { node, pos });
            Walk::Stop
        } else {
            Walk::Continue
        }
    });
    found
}

/// Every node whose id is in `ids`, in ascending position order
pub fn find_nodes_by_ids<'a, D: DocumentHandle + ?Sized>(doc: &'a D, ids: &[String]) -> Vec<FoundNode<'a>> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut found = Vec::new();

    if wanted.is_empty() {
        return found;
    }

    doc.descendants(&mut |node, pos| {
        if node.id().is_some_and(|id| wanted.contains(id)) {
            found.push(FoundNode { node, pos });
        }
        Walk::Continue
    });

    // handles are not required to walk in document order
    found.sort_by_key(|f| f.pos);
    found
}

pub fn node_exists_by_id<D: DocumentHandle + ?Sized>(doc: &D, id: &str) -> bool {
    find_node_by_id(doc, id).is_some()
}

/// How many nodes carry `id`
pub fn count_nodes_with_id<D: DocumentHandle + ?Sized>(doc: &D, id: &str) -> usize {
    let mut count = 0;
    doc.descendants(&mut |node, _| {
        if node.id() == Some(id) {
            count += 1;
        }
        Walk::Continue
    });
    count
}

/// Ids that occur on more than one node, in order of first appearance
pub fn find_duplicate_ids<D: DocumentHandle + ?Sized>(doc: &D) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();

    doc.descendants(&mut |node, _| {
        if let Some(id) = node.id() {
            let count = counts.entry(id).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(id.to_string());
            }
        }
        Walk::Continue
    });

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::schema::Schema;
    use serde_json::json;

    fn doc() -> Document {
        Document::from_json(
            Schema::lesson(),
            json!({
                "type": "doc",
                "content": [
                    { "type": "heading", "attrs": { "id": "h1", "level": 1 }, "content": [{ "type": "text", "text": "Unit 1" }] },
                    { "type": "blockquote", "attrs": { "id": "q1" }, "content": [
                        { "type": "paragraph", "attrs": { "id": "p1" } }
                    ]},
                    { "type": "paragraph", "attrs": { "id": "p2" } }
                ]
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_find_node_by_id() {
        let doc = doc();
        let found = find_node_by_id(&doc, "p1").unwrap();
        assert_eq!(found.pos, 9);
        assert_eq!(found.node.node_type, "paragraph");
        assert_eq!(found.end(), 11);
        assert!(find_node_by_id(&doc, "missing").is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let doc = doc();
        assert_eq!(find_node_by_id(&doc, "q1"), find_node_by_id(&doc, "q1"));
    }

    #[test]
    fn test_find_nodes_sorted_by_position() {
        let doc = doc();
        let ids = vec!["p2".to_string(), "h1".to_string(), "p1".to_string()];
        let found: Vec<_> = find_nodes_by_ids(&doc, &ids).iter().map(|f| f.pos).collect();
        assert_eq!(found, vec![0, 9, 12]);
    }

    #[test]
    fn test_find_nodes_partial() {
        let doc = doc();
        let ids = vec!["p2".to_string(), "nope".to_string()];
        let found = find_nodes_by_ids(&doc, &ids);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node.id(), Some("p2"));
    }

    #[test]
    fn test_node_exists() {
        let doc = doc();
        assert!(node_exists_by_id(&doc, "h1"));
        assert!(!node_exists_by_id(&doc, "h2"));
    }

    #[test]
    fn test_duplicates_first_match_wins() {
        let doc = Document::from_json(
            Schema::lesson(),
            json!({
                "type": "doc",
                "content": [
                    { "type": "paragraph", "attrs": { "id": "dup" }, "content": [{ "type": "text", "text": "first" }] },
                    { "type": "paragraph", "attrs": { "id": "dup" }, "content": [{ "type": "text", "text": "second" }] }
                ]
            }),
        )
        .unwrap();

        assert_eq!(find_node_by_id(&doc, "dup").unwrap().node.text_content(), "first");
        assert_eq!(find_nodes_by_ids(&doc, &["dup".to_string()]).len(), 2);
        assert_eq!(count_nodes_with_id(&doc, "dup"), 2);
        assert_eq!(find_duplicate_ids(&doc), vec!["dup".to_string()]);
    }
}
