//! Fleet hierarchy resolver.
//!
//! Turns a flat collection of vehicle, driver and group records into an
//! ordered group forest, filters it by text while keeping ancestors of every
//! match, tracks expand/collapse state, and enforces a single selection
//! across entity kinds. All transformations are synchronous and pure; the
//! [`application::PickerSession`] ties them together as an explicit state
//! value that hosts pass in and get back.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
