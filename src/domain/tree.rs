//! Plain data trees produced by the builder and consumed by filters and renderers.

use std::sync::Arc;

use crate::domain::entities::{EntityId, EntityRecord};

/// A group record together with its ordered children.
///
/// The record is shared behind an `Arc` so that filtered copies of a forest
/// only replace children lists and never duplicate record payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: EntityId,
    pub record: Arc<EntityRecord>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: EntityId, record: Arc<EntityRecord>) -> Self {
        Self {
            id,
            record,
            children: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.record.text
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Same node with a replaced children list.
    pub fn with_children(&self, children: Vec<TreeNode>) -> Self {
        Self {
            id: self.id.clone(),
            record: Arc::clone(&self.record),
            children,
        }
    }

    /// Number of levels in this subtree, counting the node itself.
    pub fn depth(&self) -> usize {
        forest_depth(std::slice::from_ref(self))
    }
}

// Unlinks descendants one level at a time; the derived drop would recurse
// once per level and overflow on long chains.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Sorts roots and every children list by the sibling ordering key.
pub fn sort_forest(forest: &mut [TreeNode]) {
    let mut pending: Vec<&mut [TreeNode]> = vec![forest];
    while let Some(siblings) = pending.pop() {
        siblings.sort_by(|a, b| a.record.sort_cmp(&b.record));
        for node in siblings {
            pending.push(node.children.as_mut_slice());
        }
    }
}

/// Total number of nodes in the forest.
pub fn node_count(forest: &[TreeNode]) -> usize {
    preorder(forest).count()
}

pub fn forest_depth(forest: &[TreeNode]) -> usize {
    preorder(forest).map(|(depth, _)| depth + 1).max().unwrap_or(0)
}

pub fn find<'a>(forest: &'a [TreeNode], id: &EntityId) -> Option<&'a TreeNode> {
    preorder(forest).map(|(_, node)| node).find(|node| &node.id == id)
}

/// Ids from the root down to (excluding) `id`, or `None` if `id` is not in the forest.
pub fn ancestors_of(forest: &[TreeNode], id: &EntityId) -> Option<Vec<EntityId>> {
    let mut path: Vec<EntityId> = Vec::new();
    for (depth, node) in preorder(forest) {
        path.truncate(depth);
        if &node.id == id {
            return Some(path);
        }
        path.push(node.id.clone());
    }
    None
}

/// Depth-first, left-to-right traversal yielding `(depth, node)`; roots have depth 0.
pub fn preorder(forest: &[TreeNode]) -> PreOrder<'_> {
    PreOrder::new(forest)
}

pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a TreeNode)>,
}

impl<'a> PreOrder<'a> {
    fn new(forest: &'a [TreeNode]) -> Self {
        Self {
            stack: forest.iter().rev().map(|node| (0, node)).collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
