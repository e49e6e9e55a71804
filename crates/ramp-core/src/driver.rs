//! Driver executing a single task to completion.
//!
//! The driver repeatedly steps a task until it reports completed,
//! emitting lifecycle events after every transition and yielding
//! cooperatively between steps so tight polling loops cannot starve the
//! scheduler. The first error a step raises is propagated to the caller
//! after the finalization hook has run.

use crate::context::ExecutionContext;
use crate::event_bus::EventBus;
use crate::tasks::{Task, TaskError};
use ramp_types::{truncate_id, RampEvent, TaskEvent};

/// Executes one task at a time, emitting lifecycle events.
pub struct TaskDriver {
	events: EventBus,
}

impl TaskDriver {
	/// Creates a driver publishing to the given event bus.
	pub fn new(events: EventBus) -> Self {
		Self { events }
	}

	/// Runs a task until it completes or a step fails.
	///
	/// The finalization hook runs exactly once with the outcome; a
	/// failing hook is logged and never masks the step error.
	pub async fn run_task(
		&self,
		task: &mut dyn Task,
		ctx: &mut ExecutionContext,
	) -> Result<(), TaskError> {
		let descriptor = task.descriptor().clone();
		tracing::info!(
			task_id = %truncate_id(&descriptor.id),
			task = %task.name(),
			"Starting task"
		);
		let _ = self.events.publish(RampEvent::Task(TaskEvent::Started {
			descriptor: descriptor.clone(),
		}));

		while !task.completed() {
			match task.step(ctx).await {
				Ok(()) => {
					let _ = self.events.publish(RampEvent::Task(TaskEvent::Updated {
						descriptor: descriptor.clone(),
						state: task.state_label().to_string(),
					}));
					// Hand control back to the scheduler between steps.
					tokio::task::yield_now().await;
				},
				Err(e) => {
					tracing::warn!(
						task_id = %truncate_id(&descriptor.id),
						error = %e,
						"Task failed"
					);
					let _ = self.events.publish(RampEvent::Task(TaskEvent::Errored {
						descriptor: descriptor.clone(),
						error: e.to_string(),
						retryable: e.retryable(),
					}));
					if let Err(cleanup_err) = task.cleanup(ctx, false).await {
						tracing::warn!(
							task_id = %truncate_id(&descriptor.id),
							error = %cleanup_err,
							"Task cleanup failed"
						);
					}
					return Err(e);
				},
			}
		}

		tracing::info!(task_id = %truncate_id(&descriptor.id), "Task completed");
		let _ = self
			.events
			.publish(RampEvent::Task(TaskEvent::Completed { descriptor }));
		if let Err(cleanup_err) = task.cleanup(ctx, true).await {
			tracing::warn!(error = %cleanup_err, "Task cleanup failed");
		}
		Ok(())
	}
}
