use std::collections::HashMap;
use std::sync::Arc;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{EntityId, EntityRecord};
use crate::domain::tree::TreeNode;

/// Tree node in the arena-based build structure.
#[derive(Debug)]
pub struct ArenaNode {
    pub id: EntityId,
    pub record: Arc<EntityRecord>,
    /// Index of parent node in the arena, None for roots and unattached nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

/// Arena-based forest used while assembling a hierarchy.
///
/// Nodes are addressed by generational index; an id index gives O(1)
/// parent lookup so the whole build stays linear in the number of records.
#[derive(Debug, Default)]
pub struct TreeArena {
    arena: Arena<ArenaNode>,
    index: HashMap<EntityId, Index>,
    roots: Vec<Index>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            roots: Vec::new(),
        }
    }

    /// Inserts an unattached node. Returns `None` if the id is already present.
    #[instrument(level = "trace", skip(self, record))]
    pub fn insert_node(&mut self, id: EntityId, record: Arc<EntityRecord>) -> Option<Index> {
        if self.index.contains_key(&id) {
            return None;
        }
        let node = ArenaNode {
            id: id.clone(),
            record,
            parent: None,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);
        self.index.insert(id, node_idx);
        Some(node_idx)
    }

    pub fn lookup(&self, id: &EntityId) -> Option<Index> {
        self.index.get(id).copied()
    }

    /// Appends `child` to `parent`'s children.
    pub fn attach(&mut self, child: Index, parent: Index) {
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.arena.get_mut(child) {
            child_node.parent = Some(parent);
        }
    }

    pub fn push_root(&mut self, idx: Index) {
        self.roots.push(idx);
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Moves every node reachable from a root into an owned forest.
    ///
    /// Works with an explicit stack, so chain depth is bounded by memory only.
    /// Nodes are removed from the arena as they are materialized, so a node
    /// can appear at most once. Whatever remains afterwards was unreachable
    /// (a parent cycle or a self-reference); the count is returned alongside.
    #[instrument(level = "debug", skip(self))]
    pub fn into_forest(mut self) -> (Vec<TreeNode>, usize) {
        let roots = std::mem::take(&mut self.roots);
        let mut forest = Vec::with_capacity(roots.len());
        let mut stack: Vec<Pending> = Vec::new();

        for root in roots {
            stack.extend(Pending::detach(&mut self.arena, root));
            while let Some(top) = stack.last_mut() {
                match top.children.next() {
                    Some(child) => stack.extend(Pending::detach(&mut self.arena, child)),
                    None => {
                        let Some(done) = stack.pop() else { break };
                        match stack.last_mut() {
                            Some(parent) => parent.node.children.push(done.node),
                            None => forest.push(done.node),
                        }
                    }
                }
            }
        }
        (forest, self.arena.len())
    }
}

/// Node taken out of the arena whose children are still being materialized.
struct Pending {
    node: TreeNode,
    children: std::vec::IntoIter<Index>,
}

impl Pending {
    fn detach(arena: &mut Arena<ArenaNode>, idx: Index) -> Option<Self> {
        let ArenaNode {
            id,
            record,
            children,
            ..
        } = arena.remove(idx)?;
        Some(Self {
            node: TreeNode::new(id, record),
            children: children.into_iter(),
        })
    }
}
