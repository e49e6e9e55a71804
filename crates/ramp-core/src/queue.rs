//! Sequential fail-fast task queue.
//!
//! Executes a planned task list strictly in order, one task at a time,
//! aborting the remaining sequence on the first failure. There is no
//! partial-failure continuation and no rollback: downstream tasks of a
//! failed step simply never run, and the user must re-initiate.

use crate::context::ExecutionContext;
use crate::driver::TaskDriver;
use crate::event_bus::EventBus;
use crate::tasks::{Task, TaskError};
use ramp_types::{QueueEvent, RampEvent};

/// Ordered list of tasks executed sequentially via the driver.
pub struct TaskQueue {
	tasks: Vec<Box<dyn Task>>,
	driver: TaskDriver,
	events: EventBus,
}

impl TaskQueue {
	/// Creates a queue over a planned task list, publishing to the
	/// given event bus.
	pub fn new(tasks: Vec<Box<dyn Task>>, events: EventBus) -> Self {
		let driver = TaskDriver::new(events.clone());
		Self {
			tasks,
			driver,
			events,
		}
	}

	/// The queued tasks, in execution order.
	pub fn tasks(&self) -> &[Box<dyn Task>] {
		&self.tasks
	}

	/// Runs the queue to completion, stopping at the first failure.
	pub async fn run(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		let driver = &self.driver;
		let events = &self.events;

		for task in self.tasks.iter_mut() {
			if let Err(e) = driver.run_task(task.as_mut(), ctx).await {
				tracing::warn!(error = %e, "Queue aborted");
				let _ = events.publish(RampEvent::Queue(QueueEvent::Errored {
					error: e.to_string(),
				}));
				return Err(e);
			}
		}

		tracing::info!(tasks = self.tasks.len(), "Queue completed");
		let _ = events.publish(RampEvent::Queue(QueueEvent::Completed {
			tasks: self.tasks.len(),
		}));
		Ok(())
	}
}
