//! Tidemark Core - Fundamental types
//!
//! This crate defines the types shared by the store and the delivery runtime:
//! - Identifiers (EntityId)
//! - Event time (EventTime), the sole ordering authority
//! - Entity records and payloads
//! - Lifecycle events (Created, Updated, Deleted)
//! - Error taxonomy and apply outcomes

pub mod id;
pub mod time;
pub mod record;
pub mod event;
pub mod error;

pub use id::*;
pub use time::*;
pub use record::*;
pub use event::*;
pub use error::*;
