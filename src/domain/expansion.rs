//! Expand/collapse memory with a display-time override for active searches.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::entities::EntityId;
use crate::domain::filter::normalize_query;
use crate::domain::tree::{preorder, TreeNode};

/// Stored expansion per node id.
///
/// Ids without an entry are collapsed. Search never writes here; see
/// [`ExpansionView`] for the forced expansion applied while a query is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    stored: HashMap<EntityId, bool>,
    expand_roots: bool,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpansionState {
    pub fn new() -> Self {
        Self {
            stored: HashMap::new(),
            expand_roots: true,
        }
    }

    /// Whether roots start expanded after a forest reset.
    pub fn with_root_default(mut self, expand_roots: bool) -> Self {
        self.expand_roots = expand_roots;
        self
    }

    pub fn is_expanded(&self, id: &EntityId) -> bool {
        self.stored.get(id).copied().unwrap_or(false)
    }

    /// Explicit stored entry, if any.
    pub fn stored(&self, id: &EntityId) -> Option<bool> {
        self.stored.get(id).copied()
    }

    /// Flip one node. Children keep whatever they had stored.
    pub fn toggle(&mut self, id: &EntityId) -> bool {
        let expanded = !self.is_expanded(id);
        self.stored.insert(id.clone(), expanded);
        expanded
    }

    pub fn set(&mut self, id: EntityId, expanded: bool) {
        self.stored.insert(id, expanded);
    }

    /// Apply defaults for a freshly built forest.
    ///
    /// Roots without an entry become expanded (unless disabled); deeper nodes
    /// stay collapsed. Existing entries are left alone.
    pub fn on_forest_reset(&mut self, forest: &[TreeNode]) {
        if !self.expand_roots {
            return;
        }
        for root in forest {
            self.stored.entry(root.id.clone()).or_insert(true);
        }
    }

    /// Store every node that has children as expanded.
    pub fn expand_all(&mut self, forest: &[TreeNode]) {
        for (_, node) in preorder(forest).filter(|(_, node)| !node.is_leaf()) {
            self.stored.insert(node.id.clone(), true);
        }
    }

    pub fn clear(&mut self) {
        self.stored.clear();
    }

    pub fn len(&self) -> usize {
        self.stored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }
}

/// Ids force-expanded while `query` is active: every ancestor of a match.
///
/// `filtered` must be the result of filtering with the same query. In such a
/// forest a node keeps children only if some descendant matched, so the
/// ancestors are exactly the non-leaf nodes.
pub fn forced_by_search(filtered: &[TreeNode], query: &str) -> HashSet<EntityId> {
    if normalize_query(query).is_none() {
        return HashSet::new();
    }
    preorder(filtered)
        .filter(|(_, node)| !node.is_leaf())
        .map(|(_, node)| node.id.clone())
        .collect()
}

/// Displayed expansion: stored state plus the search override.
#[derive(Debug, Clone)]
pub struct ExpansionView<'a> {
    state: &'a ExpansionState,
    forced: HashSet<EntityId>,
}

impl<'a> ExpansionView<'a> {
    pub fn new(state: &'a ExpansionState, filtered: &[TreeNode], query: &str) -> Self {
        Self {
            state,
            forced: forced_by_search(filtered, query),
        }
    }

    /// View without any search override.
    pub fn stored_only(state: &'a ExpansionState) -> Self {
        Self {
            state,
            forced: HashSet::new(),
        }
    }

    pub fn is_expanded(&self, id: &EntityId) -> bool {
        self.forced.contains(id) || self.state.is_expanded(id)
    }

    pub fn is_forced(&self, id: &EntityId) -> bool {
        self.forced.contains(id)
    }
}
