//! Picker session: the externally-owned state of one entity picker.
//!
//! Every operation consumes the session and returns the next one together
//! with the events a host should forward to its UI. Nothing is queued and
//! nothing blocks: while a fetch is in flight, interactive actions are
//! rejected outright.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::config::Settings;
use crate::domain::{
    filter_forest, filter_records, find, BuildReport, EntityId, EntityKind, EntityRecord,
    ExpansionState, ExpansionView, SelectionController, TreeBuilder, TreeNode,
};

/// Input to [`PickerSession::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum PickerAction {
    /// The entity store started fetching `kind`; switches to it if needed.
    BeginFetch(EntityKind),
    /// The entity store delivered records for `kind`.
    CompleteFetch {
        kind: EntityKind,
        records: Vec<EntityRecord>,
    },
    SwitchKind(EntityKind),
    /// The picker was closed and opened again.
    Reopen,
    SetQuery(String),
    Toggle(EntityId),
    ExpandAll,
    Select(EntityId),
    ClearSelection,
    Commit,
}

impl PickerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PickerAction::BeginFetch(_) => "begin-fetch",
            PickerAction::CompleteFetch { .. } => "complete-fetch",
            PickerAction::SwitchKind(_) => "switch-kind",
            PickerAction::Reopen => "reopen",
            PickerAction::SetQuery(_) => "set-query",
            PickerAction::Toggle(_) => "toggle",
            PickerAction::ExpandAll => "expand-all",
            PickerAction::Select(_) => "select",
            PickerAction::ClearSelection => "clear-selection",
            PickerAction::Commit => "commit",
        }
    }

    /// Interactive actions are refused while the store is loading.
    fn is_interactive(&self) -> bool {
        matches!(
            self,
            PickerAction::SetQuery(_)
                | PickerAction::Toggle(_)
                | PickerAction::ExpandAll
                | PickerAction::Select(_)
                | PickerAction::ClearSelection
                | PickerAction::Commit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Loading,
    UnknownId(EntityId),
    /// Expansion only applies to hierarchical kinds.
    FlatKind(EntityKind),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Loading => f.write_str("records are loading"),
            RejectReason::UnknownId(id) => write!(f, "no entity with id {id}"),
            RejectReason::FlatKind(kind) => write!(f, "{kind} entities have no hierarchy"),
        }
    }
}

/// Output of [`PickerSession::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    /// Fired on commit with zero or one record.
    SelectionChanged(Vec<EntityRecord>),
    QueryChanged(String),
    ExpandToggled { id: EntityId, expanded: bool },
    RecordsLoaded { kind: EntityKind, report: BuildReport },
    /// A fetch result arrived for a kind that is no longer active.
    FetchDiscarded { kind: EntityKind },
    Rejected {
        action: &'static str,
        reason: RejectReason,
    },
}

/// One row of the flattened, displayable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: EntityId,
    pub text: String,
    pub kind: EntityKind,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct PickerSession {
    active_kind: EntityKind,
    loading: bool,
    records: Vec<EntityRecord>,
    forest: Vec<TreeNode>,
    builder: TreeBuilder,
    expand_roots: bool,
    expansion: ExpansionState,
    selection: SelectionController,
}

impl Default for PickerSession {
    fn default() -> Self {
        Self::new(EntityKind::default())
    }
}

impl PickerSession {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            active_kind: kind,
            loading: false,
            records: Vec::new(),
            forest: Vec::new(),
            builder: TreeBuilder::default(),
            expand_roots: true,
            expansion: ExpansionState::new(),
            selection: SelectionController::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.default_kind)
            .with_builder(TreeBuilder::new().with_orphan_policy(settings.tree.orphans))
            .with_root_expansion(settings.tree.expand_roots)
    }

    pub fn with_builder(mut self, builder: TreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_root_expansion(mut self, expand_roots: bool) -> Self {
        self.expand_roots = expand_roots;
        self.expansion = self.expansion.with_root_default(expand_roots);
        self
    }

    pub fn active_kind(&self) -> EntityKind {
        self.active_kind
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// Unfiltered group forest.
    pub fn forest(&self) -> &[TreeNode] {
        &self.forest
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn query(&self) -> &str {
        self.selection.query()
    }

    pub fn filtered_forest(&self) -> Cow<'_, [TreeNode]> {
        filter_forest(&self.forest, self.query())
    }

    /// Records of the active kind matching the query, for flat views.
    pub fn filtered_list(&self) -> Vec<&EntityRecord> {
        filter_records(&self.records, self.active_kind, self.query())
    }

    /// Apply one action, returning the next session and the resulting events.
    #[instrument(level = "debug", skip(self, action), fields(action = action.name(), kind = %self.active_kind))]
    pub fn apply(mut self, action: PickerAction) -> (Self, Vec<PickerEvent>) {
        let mut events = Vec::new();

        if self.loading && action.is_interactive() {
            debug!("rejecting {} while loading", action.name());
            events.push(PickerEvent::Rejected {
                action: action.name(),
                reason: RejectReason::Loading,
            });
            return (self, events);
        }

        match action {
            PickerAction::BeginFetch(kind) => {
                if kind != self.active_kind {
                    self.switch_kind(kind, &mut events);
                }
                self.loading = true;
            }
            PickerAction::CompleteFetch { kind, records } => {
                if kind != self.active_kind {
                    warn!("discarding stale {} fetch, active kind is {}", kind, self.active_kind);
                    events.push(PickerEvent::FetchDiscarded { kind });
                } else {
                    let report = self.load(records);
                    info!(kind = %kind, records = self.records.len(), "records loaded");
                    events.push(PickerEvent::RecordsLoaded { kind, report });
                }
            }
            PickerAction::SwitchKind(kind) => {
                if kind != self.active_kind {
                    self.switch_kind(kind, &mut events);
                }
            }
            PickerAction::Reopen => self.reset_context(&mut events),
            PickerAction::SetQuery(query) => {
                if self.selection.set_query(query) {
                    events.push(PickerEvent::QueryChanged(self.query().to_string()));
                }
            }
            PickerAction::Toggle(id) => {
                let name = "toggle";
                if !self.active_kind.is_hierarchical() {
                    events.push(PickerEvent::Rejected {
                        action: name,
                        reason: RejectReason::FlatKind(self.active_kind),
                    });
                } else if find(&self.forest, &id).is_none() {
                    events.push(PickerEvent::Rejected {
                        action: name,
                        reason: RejectReason::UnknownId(id),
                    });
                } else {
                    let expanded = self.expansion.toggle(&id);
                    events.push(PickerEvent::ExpandToggled { id, expanded });
                }
            }
            PickerAction::ExpandAll => self.expansion.expand_all(&self.forest),
            PickerAction::Select(id) => match self.lookup(&id) {
                Some(record) => {
                    let record = record.clone();
                    self.selection.select(&record);
                }
                None => events.push(PickerEvent::Rejected {
                    action: "select",
                    reason: RejectReason::UnknownId(id),
                }),
            },
            PickerAction::ClearSelection => self.selection.clear(),
            PickerAction::Commit => {
                events.push(PickerEvent::SelectionChanged(self.selection.commit()));
            }
        }

        (self, events)
    }

    /// Flatten the current view into displayable rows.
    ///
    /// Groups are walked with an explicit stack, descending only into nodes
    /// whose displayed expansion is open. Other kinds yield a flat list.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        if !self.active_kind.is_hierarchical() {
            return self
                .filtered_list()
                .into_iter()
                .filter_map(|record| {
                    let id = record.id.clone()?;
                    Some(VisibleRow {
                        selected: self.selection.is_selected(&id),
                        id,
                        text: record.text.clone(),
                        kind: record.kind,
                        depth: 0,
                        has_children: false,
                        expanded: false,
                    })
                })
                .collect();
        }

        let filtered = self.filtered_forest();
        let view = ExpansionView::new(&self.expansion, &filtered, self.query());
        let mut rows = Vec::new();
        let mut stack: Vec<(usize, &TreeNode)> =
            filtered.iter().rev().map(|node| (0, node)).collect();

        while let Some((depth, node)) = stack.pop() {
            let expanded = !node.is_leaf() && view.is_expanded(&node.id);
            rows.push(VisibleRow {
                id: node.id.clone(),
                text: node.text().to_string(),
                kind: node.record.kind,
                depth,
                has_children: !node.is_leaf(),
                expanded,
                selected: self.selection.is_selected(&node.id),
            });
            if expanded {
                for child in node.children.iter().rev() {
                    stack.push((depth + 1, child));
                }
            }
        }
        rows
    }

    fn load(&mut self, records: Vec<EntityRecord>) -> BuildReport {
        self.records = records;
        let output = self.builder.build_with_report(&self.records);
        self.forest = output.forest;
        self.expansion.on_forest_reset(&self.forest);
        self.loading = false;
        output.report
    }

    /// Resolve a selectable record of the active kind.
    ///
    /// Groups must be part of the built forest, so orphans and cycle members
    /// the builder left out cannot be selected.
    fn lookup(&self, id: &EntityId) -> Option<&EntityRecord> {
        if self.active_kind.is_hierarchical() {
            return find(&self.forest, id).map(|node| node.record.as_ref());
        }
        self.records
            .iter()
            .find(|r| r.kind == self.active_kind && r.id.as_ref() == Some(id))
    }

    /// Records, forest and expansion belong to the previous kind; they are
    /// dropped until the next fetch for `kind` completes.
    fn switch_kind(&mut self, kind: EntityKind, events: &mut Vec<PickerEvent>) {
        debug!("switching kind {} -> {}", self.active_kind, kind);
        self.active_kind = kind;
        self.reset_context(events);
        self.records.clear();
        self.forest.clear();
        self.expansion = ExpansionState::new().with_root_default(self.expand_roots);
    }

    fn reset_context(&mut self, events: &mut Vec<PickerEvent>) {
        let had_query = !self.selection.query().is_empty();
        self.selection.on_context_reset();
        if had_query {
            events.push(PickerEvent::QueryChanged(String::new()));
        }
    }
}
