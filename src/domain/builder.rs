//! Tree builder turning flat group records into an ordered forest.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::arena::TreeArena;
use crate::domain::entities::{EntityKind, EntityRecord, ParentRef};
use crate::domain::error::DomainError;
use crate::domain::tree::{sort_forest, TreeNode};

/// What to do with a group whose parent reference resolves to nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Exclude the orphan (and its subtree) from the forest.
    #[default]
    Drop,
    /// Attach the orphan as an additional root.
    Promote,
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanPolicy::Drop => f.write_str("drop"),
            OrphanPolicy::Promote => f.write_str("promote"),
        }
    }
}

impl FromStr for OrphanPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(OrphanPolicy::Drop),
            "promote" => Ok(OrphanPolicy::Promote),
            other => Err(DomainError::UnknownOrphanPolicy(other.to_string())),
        }
    }
}

/// Counters describing what a build did with its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Group records seen
    pub groups: usize,
    /// Nodes in the resulting forest
    pub built: usize,
    /// Records skipped for a missing id or parent reference
    pub malformed: usize,
    /// Records skipped because their id was already taken
    pub duplicates: usize,
    /// Records whose parent did not resolve
    pub orphans: usize,
    /// Nodes attached somewhere but not reachable from any root
    pub unreachable: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    pub forest: Vec<TreeNode>,
    pub report: BuildReport,
}

/// Constructs ordered group forests from flat records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    orphan_policy: OrphanPolicy,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orphan_policy(mut self, orphan_policy: OrphanPolicy) -> Self {
        self.orphan_policy = orphan_policy;
        self
    }

    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.orphan_policy
    }

    pub fn build(&self, records: &[EntityRecord]) -> Vec<TreeNode> {
        self.build_with_report(records).forest
    }

    /// Build the group forest.
    ///
    /// Pass one indexes every well-formed group by id. Pass two attaches each
    /// node to its parent (or to the root list for the sentinel). Children are
    /// then sorted depth-first. Input records are never mutated.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build_with_report(&self, records: &[EntityRecord]) -> BuildOutput {
        let mut report = BuildReport::default();
        let mut arena = TreeArena::with_capacity(records.len());
        let mut placements: Vec<(Index, &ParentRef)> = Vec::with_capacity(records.len());

        for record in records.iter().filter(|r| r.kind == EntityKind::Group) {
            report.groups += 1;
            let (id, parent) = match record.placement() {
                Ok(placement) => placement,
                Err(e) => {
                    debug!("skipping record: {}", e);
                    report.malformed += 1;
                    continue;
                }
            };
            match arena.insert_node(id.clone(), Arc::new(record.clone())) {
                Some(idx) => placements.push((idx, parent)),
                None => {
                    warn!("{}", DomainError::DuplicateId(id.clone()));
                    report.duplicates += 1;
                }
            }
        }

        if arena.is_empty() {
            debug!(groups = report.groups, "no buildable groups");
            return BuildOutput {
                forest: Vec::new(),
                report,
            };
        }

        for (idx, parent) in placements {
            match parent {
                ParentRef::Root => arena.push_root(idx),
                ParentRef::Entity(parent_id) => match arena.lookup(parent_id) {
                    Some(parent_idx) => arena.attach(idx, parent_idx),
                    None => {
                        report.orphans += 1;
                        match self.orphan_policy {
                            OrphanPolicy::Drop => {
                                debug!("dropping orphan: parent {} not found", parent_id)
                            }
                            OrphanPolicy::Promote => arena.push_root(idx),
                        }
                    }
                },
            }
        }

        let attached = arena.len();
        let (mut forest, remaining) = arena.into_forest();
        sort_forest(&mut forest);

        report.built = attached - remaining;
        // dropped orphans stay behind in the arena and are counted separately
        report.unreachable = match self.orphan_policy {
            OrphanPolicy::Drop => remaining - report.orphans,
            OrphanPolicy::Promote => remaining,
        };
        debug!(
            built = report.built,
            malformed = report.malformed,
            duplicates = report.duplicates,
            orphans = report.orphans,
            "forest built"
        );

        BuildOutput { forest, report }
    }
}

/// Build the group forest with the default orphan policy.
pub fn build_forest(records: &[EntityRecord]) -> Vec<TreeNode> {
    TreeBuilder::default().build(records)
}
