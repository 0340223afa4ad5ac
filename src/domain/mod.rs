//! Domain layer: records, forests and the resolver's state objects
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod expansion;
pub mod filter;
pub mod selection;
pub mod tree;

pub use arena::TreeArena;
pub use builder::{build_forest, BuildOutput, BuildReport, OrphanPolicy, TreeBuilder};
pub use entities::*;
pub use error::DomainError;
pub use expansion::{forced_by_search, ExpansionState, ExpansionView};
pub use filter::{filter_forest, filter_records, normalize_query};
pub use selection::SelectionController;
pub use tree::{ancestors_of, find, forest_depth, node_count, preorder, sort_forest, TreeNode};
