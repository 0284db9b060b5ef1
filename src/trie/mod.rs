mod error;
mod find;
mod insert;
mod node;

use std::fmt;

use smallvec::SmallVec;

pub use error::{TrieError, TrieResult};
use node::Node;

use crate::types::NodeId;

/// A compressed prefix trie over literal path text, single dynamic
/// placeholder segments, and trailing wildcards.
///
/// Nodes live in an arena addressed by stable indices; splitting a node
/// allocates fresh children and rewrites only the parent's child-id list.
/// The trie is built incrementally with [`PathTrie::add`] during setup and
/// is read-only under [`PathTrie::find`].
pub struct PathTrie<H> {
    arena: Vec<Node<H>>,
    roots: SmallVec<[NodeId; 4]>,
    routes: usize,
}

impl<H> Default for PathTrie<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PathTrie<H> {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            roots: SmallVec::new(),
            routes: 0,
        }
    }

    /// Number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }

    fn node(&self, id: NodeId) -> &Node<H> {
        &self.arena[id as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<H> {
        &mut self.arena[id as usize]
    }

    fn alloc(&mut self, node: Node<H>) -> NodeId {
        self.arena.push(node);
        (self.arena.len() - 1) as NodeId
    }

    fn siblings(&self, slot: Slot) -> &SmallVec<[NodeId; 4]> {
        match slot {
            Slot::Roots => &self.roots,
            Slot::Child(id) => &self.node(id).children,
        }
    }

    fn siblings_mut(&mut self, slot: Slot) -> &mut SmallVec<[NodeId; 4]> {
        match slot {
            Slot::Roots => &mut self.roots,
            Slot::Child(id) => &mut self.node_mut(id).children,
        }
    }
}

impl<H> fmt::Debug for PathTrie<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTrie")
            .field("routes", &self.routes)
            .field("nodes", &self.arena.len())
            .finish()
    }
}

/// Identifies one sibling list: the top level, or a node's children.
#[derive(Clone, Copy)]
enum Slot {
    Roots,
    Child(NodeId),
}
