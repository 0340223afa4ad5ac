//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::EntityId;

/// Domain errors describe why an individual record or value was rejected.
///
/// The builder never fails as a whole; these are reported per record and
/// logged as skip reasons.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("record has no id (text: {text:?})")]
    MissingId { text: String },

    #[error("record {id} has no parent reference")]
    MissingParent { id: EntityId },

    #[error("duplicate record id: {0}")]
    DuplicateId(EntityId),

    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("unknown orphan policy: {0} (expected drop or promote)")]
    UnknownOrphanPolicy(String),
}
