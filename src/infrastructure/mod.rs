//! Infrastructure layer: record sources and I/O errors
//!
//! This layer implements the entity store boundary used by hosts.

pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use traits::{parse_records, InMemorySource, JsonFileSource, RecordSource};
