//! Tidemark Runtime - Event handling and delivery
//!
//! This crate wraps the reconciliation store in a delivery pipeline:
//! 1. Dispatch an event to the handler for its kind
//! 2. Apply it to the injected store
//! 3. On failure, back off and retry up to a fixed budget
//! 4. Dead-letter the event when the budget is exhausted
//!
//! Terminal outcomes are: applied, discarded as stale, or dead-lettered.

pub mod config;
pub mod dead_letter;
pub mod delivery;
pub mod dispatcher;
pub mod handler;
pub mod retry;
pub mod telemetry;

pub use config::*;
pub use dead_letter::*;
pub use delivery::*;
pub use dispatcher::*;
pub use handler::*;
pub use retry::*;
pub use telemetry::*;
