//! Terminal renderers for forests and flattened rows.
//!
//! Renderers only read resolver output; they never decide expansion
//! themselves but ask an [`ExpansionView`].

use std::fmt::Write;

use termtree::Tree;

use crate::application::VisibleRow;
use crate::domain::{EntityId, ExpansionView, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self, view: &ExpansionView<'_>, selected: Option<&EntityId>) -> Tree<String>;
}

impl TreeNodeConvert for TreeNode {
    fn to_tree_string(&self, view: &ExpansionView<'_>, selected: Option<&EntityId>) -> Tree<String> {
        let expanded = view.is_expanded(&self.id);
        let root = node_label(self, expanded, selected == Some(&self.id));
        if !expanded {
            return Tree::new(root);
        }

        let leaves: Vec<_> = self
            .children
            .iter()
            .map(|c| c.to_tree_string(view, selected))
            .collect();

        Tree::new(root).with_leaves(leaves)
    }
}

/// Label for one node: text, id, and a child count when collapsed.
pub fn node_label(node: &TreeNode, expanded: bool, selected: bool) -> String {
    let mut label = String::new();
    if selected {
        label.push_str("* ");
    }
    let _ = write!(label, "{} [{}]", node.text(), node.id);
    if !expanded && !node.is_leaf() {
        let _ = write!(label, " (+{})", node.children.len());
    }
    label
}

/// Render a whole forest, one tree per root.
pub fn render_forest(
    forest: &[TreeNode],
    view: &ExpansionView<'_>,
    selected: Option<&EntityId>,
) -> String {
    forest
        .iter()
        .map(|root| root.to_tree_string(view, selected).to_string())
        .collect()
}

/// Render flattened rows with indentation and expand markers.
pub fn render_rows(rows: &[VisibleRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = match (row.has_children, row.expanded) {
            (false, _) => ' ',
            (true, true) => '-',
            (true, false) => '+',
        };
        let selected = if row.selected { "*" } else { " " };
        let _ = writeln!(
            out,
            "{}{}{} {} [{}]",
            selected,
            "  ".repeat(row.depth),
            marker,
            row.text,
            row.id
        );
    }
    out
}
