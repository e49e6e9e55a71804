//! Fee payment task.
//!
//! Pays accrued venue fees ahead of a withdrawal. The planning-time
//! needed check reads the venue-side fee balance so the task is dropped
//! when nothing is owed. The venue may settle a fee payment
//! synchronously, in which case there is no task to poll and the
//! submitted phase is skipped.

use crate::context::ExecutionContext;
use crate::tasks::{Task, TaskError};
use async_trait::async_trait;
use ramp_types::{TaskDescriptor, TaskParams, VenueTaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayFeesState {
	Pending,
	Submitted,
	Completed,
}

/// Task paying accrued venue fees.
pub struct PayFeesTask {
	descriptor: TaskDescriptor,
	chain_id: u64,
	state: PayFeesState,
	venue_task: Option<VenueTaskId>,
}

impl PayFeesTask {
	/// Creates a pending fee payment task.
	pub fn new(chain_id: u64) -> Self {
		Self {
			descriptor: TaskDescriptor::new(TaskParams::PayFees { chain_id }),
			chain_id,
			state: PayFeesState::Pending,
			venue_task: None,
		}
	}
}

#[async_trait]
impl Task for PayFeesTask {
	fn descriptor(&self) -> &TaskDescriptor {
		&self.descriptor
	}

	fn name(&self) -> String {
		"Pay venue fees".to_string()
	}

	fn state_label(&self) -> &'static str {
		match self.state {
			PayFeesState::Pending => "Pending",
			PayFeesState::Submitted => "Submitted",
			PayFeesState::Completed => "Completed",
		}
	}

	fn completed(&self) -> bool {
		self.state == PayFeesState::Completed
	}

	async fn step(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		match self.state {
			PayFeesState::Pending => {
				match ctx.venue().submit_fee_payment(self.chain_id).await? {
					Some(task_id) => {
						tracing::info!(venue_task = %task_id, "Fee payment submitted");
						self.venue_task = Some(task_id);
						self.state = PayFeesState::Submitted;
					},
					// Settled synchronously; nothing to poll.
					None => {
						tracing::info!("Fee payment settled synchronously");
						self.state = PayFeesState::Completed;
					},
				}
				Ok(())
			},
			PayFeesState::Submitted => {
				let task_id = self.venue_task.as_ref().ok_or_else(|| {
					TaskError::Precondition("venue task id missing".to_string())
				})?;
				ctx.venue().poll_until_terminal(task_id).await?;
				self.state = PayFeesState::Completed;
				Ok(())
			},
			PayFeesState::Completed => Err(TaskError::AlreadyComplete),
		}
	}

	async fn is_needed(&self, ctx: &ExecutionContext) -> Result<bool, TaskError> {
		let owed = ctx.venue().fee_balance(ctx.user()).await?;
		Ok(!owed.is_zero())
	}
}
