//! Core task planning and execution engine for the ramp system.
//!
//! This crate contains the control-flow heart of the ramp: the planner
//! that turns a user [`Intent`](ramp_types::Intent) into an ordered list
//! of tasks, the six resumable task state machines, the sequential
//! driver/queue executor, and the shared execution context tasks read
//! and mutate along the way.
//!
//! Execution is strictly sequential. Tasks mutate shared context state
//! (the permit slot, the route-output accumulator) without
//! synchronization, so a queue never runs more than one task at a time
//! and aborts the remaining sequence on the first failure.

/// Shared mutable state for one planning and execution cycle.
pub mod context;
/// Driver executing a single task to completion.
pub mod driver;
/// Broadcast bus carrying task and queue lifecycle events.
pub mod event_bus;
/// Intent-to-task planning.
pub mod planner;
/// Sequential fail-fast task queue.
pub mod queue;
/// The task contract and the concrete task state machines.
pub mod tasks;

#[cfg(test)]
pub(crate) mod testutil;

pub use context::{ContextError, ExecutionContext};
pub use driver::TaskDriver;
pub use event_bus::EventBus;
pub use planner::{plan_tasks, PlannerError};
pub use queue::TaskQueue;
pub use tasks::{Task, TaskError};
