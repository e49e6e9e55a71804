//! Common types module for the ramp system.
//!
//! This module defines the core data types and structures shared across
//! the ramp crates. It provides a centralized location for value objects
//! to ensure consistency between the planner, the task state machines and
//! the external collaborator services.

/// Chain-level types: families, transactions, receipts, permit payloads.
pub mod chains;
/// Event types emitted by the task driver and queue.
pub mod events;
/// User intent value object and derived predicates.
pub mod intent;
/// Route and route-leg types returned by the routing oracle.
pub mod routing;
/// Task descriptor and per-task parameter types.
pub mod task;
/// Token metadata and asset keys.
pub mod tokens;
/// Utility functions shared across crates.
pub mod utils;
/// Venue backend types: task ids, task states, balance snapshots.
pub mod venue;

// Re-export all types for convenient access
pub use chains::*;
pub use events::*;
pub use intent::*;
pub use routing::*;
pub use task::*;
pub use tokens::*;
pub use utils::truncate_id;
pub use venue::*;
