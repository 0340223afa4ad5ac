//! Ancestor-preserving search over forests and flat record lists.

use std::borrow::Cow;

use tracing::instrument;

use crate::domain::entities::{EntityKind, EntityRecord};
use crate::domain::tree::TreeNode;

/// Lowercased, trimmed needle; `None` for an empty or whitespace-only query.
///
/// Surrounding whitespace is not part of the needle, so `"A "` matches
/// `"Fleet A"`. Inner whitespace is kept as typed.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Prune `forest` to nodes whose text matches `query` plus their ancestors.
///
/// A blank query returns the input borrowed and untouched. Otherwise every
/// kept node carries only the filtered subset of its children; the input
/// forest is never modified.
#[instrument(level = "debug", skip(forest))]
pub fn filter_forest<'a>(forest: &'a [TreeNode], query: &str) -> Cow<'a, [TreeNode]> {
    match normalize_query(query) {
        None => Cow::Borrowed(forest),
        Some(needle) => Cow::Owned(prune_all(forest, &needle)),
    }
}

/// Post-order walk with an explicit stack; a node is decided only after all
/// of its children have been.
fn prune_all(forest: &[TreeNode], needle: &str) -> Vec<TreeNode> {
    let mut kept_roots = Vec::new();
    let mut stack: Vec<Visit<'_>> = Vec::new();

    for root in forest {
        stack.push(Visit::new(root));
        while let Some(top) = stack.last_mut() {
            let node = top.node;
            if let Some(child) = node.children.get(top.next) {
                top.next += 1;
                stack.push(Visit::new(child));
                continue;
            }
            let Some(done) = stack.pop() else { break };
            if done.kept.is_empty() && !node.record.matches(needle) {
                continue;
            }
            let pruned = node.with_children(done.kept);
            match stack.last_mut() {
                Some(parent) => parent.kept.push(pruned),
                None => kept_roots.push(pruned),
            }
        }
    }
    kept_roots
}

struct Visit<'a> {
    node: &'a TreeNode,
    next: usize,
    kept: Vec<TreeNode>,
}

impl<'a> Visit<'a> {
    fn new(node: &'a TreeNode) -> Self {
        Self {
            node,
            next: 0,
            kept: Vec::new(),
        }
    }
}

/// Flat list for a non-hierarchical view: records of `kind` matching `query`.
///
/// Records without an id are skipped. The result is ordered by the sibling
/// ordering key so lists and trees sort the same way.
pub fn filter_records<'a>(
    records: &'a [EntityRecord],
    kind: EntityKind,
    query: &str,
) -> Vec<&'a EntityRecord> {
    let needle = normalize_query(query);
    let mut matches: Vec<&EntityRecord> = records
        .iter()
        .filter(|r| r.kind == kind && r.id.is_some())
        .filter(|r| needle.as_deref().map_or(true, |n| r.matches(n)))
        .collect();
    matches.sort_by(|a, b| a.sort_cmp(b));
    matches
}
