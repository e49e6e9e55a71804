//! Event types emitted during task execution.
//!
//! Events flow through a broadcast bus scoped to one driver/queue
//! construction site, letting a presentation layer observe per-step
//! progress and failure information without coupling to the executor.

use crate::task::TaskDescriptor;
use serde::{Deserialize, Serialize};

/// Main event type encompassing all ramp events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RampEvent {
	/// Events about a single task's lifecycle.
	Task(TaskEvent),
	/// Events about a whole queue run.
	Queue(QueueEvent),
}

/// Events related to a single task's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskEvent {
	/// The driver started executing a task.
	Started { descriptor: TaskDescriptor },
	/// A step completed and the task advanced to a new state.
	Updated {
		descriptor: TaskDescriptor,
		state: String,
	},
	/// The task reached its terminal completed state.
	Completed { descriptor: TaskDescriptor },
	/// A step failed. The retryable flag is part of the error contract but
	/// is not consulted by the executor.
	Errored {
		descriptor: TaskDescriptor,
		error: String,
		retryable: bool,
	},
}

/// Events related to a whole queue run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueueEvent {
	/// All tasks in the queue completed.
	Completed { tasks: usize },
	/// A task failed and the remaining sequence was aborted.
	Errored { error: String },
}
