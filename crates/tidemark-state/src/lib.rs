//! Tidemark State Engine - Event reconciliation over an in-memory entity map
//!
//! This crate implements the reconciliation store:
//! - Entity field management (the live map)
//! - Strict policy: ordered create/update, time-guarded delete
//! - Time-tolerant policy: every mutation guarded by the entity watermark
//! - Read-only snapshots for inspection

pub mod field;
pub mod reconcile;
pub mod strict;
pub mod tolerant;

pub use field::*;
pub use reconcile::*;
pub use strict::*;
pub use tolerant::*;
