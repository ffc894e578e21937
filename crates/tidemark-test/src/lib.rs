//! Tidemark Test Harness - Delivery scenarios and reconciliation fuzzing
//!
//! This crate provides:
//! - A scenario runner that schedules overlapping deliveries on a dispatcher
//! - The fixture permutations for create/update/delete arrival orders
//! - A seeded delivery-order fuzzer for the time-tolerant store

pub mod scenario;
pub mod fixtures;
pub mod order_fuzzer;

pub use scenario::*;
pub use fixtures::*;
pub use order_fuzzer::*;
