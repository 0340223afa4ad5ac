//! Entity store boundary
//!
//! The resolver never fetches anything itself. Hosts hand it records obtained
//! through a [`RecordSource`], which lets tests substitute fixed collections.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::domain::{EntityKind, EntityRecord};
use crate::infrastructure::error::{InfraError, InfraResult};

/// Supplies the flat record collection for one entity kind.
pub trait RecordSource: Send + Sync {
    /// Fetch all records of `kind`.
    fn fetch(&self, kind: EntityKind) -> InfraResult<Vec<EntityRecord>>;
}

/// Parse a JSON array of records.
///
/// Elements that are not valid records (not an object, unknown kind, ...)
/// are skipped individually with a warning. Only a document that is not a
/// JSON array at all is an error.
pub fn parse_records(content: &str, origin: &Path) -> InfraResult<Vec<EntityRecord>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(|e| InfraError::json(origin, e))?;

    let total = values.len();
    let records: Vec<EntityRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(pos, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("{}: skipping element {}: {}", origin.display(), pos, e);
                None
            }
        })
        .collect();
    debug!("parsed {} of {} elements from {}", records.len(), total, origin.display());
    Ok(records)
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Records stored as a JSON array in a file, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn fetch(&self, kind: EntityKind) -> InfraResult<Vec<EntityRecord>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| InfraError::io(format!("read {}", self.path.display()), e))?;
        let mut records = parse_records(&content, &self.path)?;
        records.retain(|r| r.kind == kind);
        Ok(records)
    }
}

/// Fixed in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<EntityRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<EntityRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for InMemorySource {
    fn fetch(&self, kind: EntityKind) -> InfraResult<Vec<EntityRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect())
    }
}
