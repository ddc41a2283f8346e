//! The ordered node list.
//!
//! Order is paint order, back to front: the last node paints on top.
//! A `Document` is a plain value; the mutation engine never edits one in
//! place, so any clone held by the history stays a faithful snapshot.

use crate::id::NodeId;
use crate::model::{Node, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from nodes in paint order.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// First node of the given type, with its index.
    pub fn find_type(&self, ty: NodeType) -> Option<(usize, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, n)| n.node_type() == ty)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    /// Check the structural invariants a loaded document must satisfy:
    /// unique ids, at most one node per singleton type, finite geometry.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        let mut singletons = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id) {
                return Err(format!("duplicate node id {}", node.id));
            }
            let ty = node.node_type();
            if ty.is_singleton() && !singletons.insert(ty) {
                return Err(format!("more than one {ty} node"));
            }
            if !node.is_finite() {
                return Err(format!("node {} has non-finite geometry", node.id));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl FromIterator<Node> for Document {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
