//! Application layer: the picker session and its use cases
//!
//! This layer orchestrates domain logic; it performs no I/O itself.

pub mod error;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use session::{PickerAction, PickerEvent, PickerSession, RejectReason, VisibleRow};
