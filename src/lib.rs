//! Inventory API checker - end-to-end contract checks for the inventory
//! management HTTP API
//!
//! Registers a user, logs in, creates a product, lists products, updates the
//! product's quantity and queries analytics, reporting each step as it goes.

pub mod common;
pub mod http;
pub mod testing;

// Re-export commonly used types for tests
pub use common::config::Config;
pub use common::{Error, Result};
pub use testing::{run_checks, RunSummary, StepKind, StepOutcome};
