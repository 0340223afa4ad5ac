//! Single selection across entity kinds, plus the per-context search query.

use tracing::debug;

use crate::domain::entities::{EntityId, EntityRecord};

/// Holds at most one selected record and the active query.
///
/// Both are ephemeral: a context reset (kind switch, picker reopened)
/// clears them while expansion memory lives elsewhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionController {
    selected: Option<EntityRecord>,
    query: String,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection with `record`.
    ///
    /// Records without an id cannot be selected; the call is ignored and
    /// returns `false`.
    pub fn select(&mut self, record: &EntityRecord) -> bool {
        if record.id.is_none() {
            debug!("ignoring selection of record without id: {:?}", record.text);
            return false;
        }
        self.selected = Some(record.clone());
        true
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&EntityRecord> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected
            .as_ref()
            .and_then(|r| r.id.as_ref())
            .is_some_and(|selected| selected == id)
    }

    /// Selection as a list: empty or exactly one record.
    pub fn commit(&self) -> Vec<EntityRecord> {
        self.selected.iter().cloned().collect()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns whether the query changed.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query == self.query {
            return false;
        }
        self.query = query;
        true
    }

    pub fn on_context_reset(&mut self) {
        self.selected = None;
        self.query.clear();
    }
}
