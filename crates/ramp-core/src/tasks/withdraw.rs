//! Venue withdrawal task.
//!
//! Submits a withdrawal from the venue balance and polls the venue's
//! task system until it reports a terminal state.

use crate::context::ExecutionContext;
use crate::tasks::{Task, TaskError};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use ramp_types::{TaskDescriptor, TaskParams, TokenMetadata, VenueTaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WithdrawState {
	Pending,
	Submitted,
	Completed,
}

/// Task withdrawing funds from the venue balance.
pub struct WithdrawTask {
	descriptor: TaskDescriptor,
	chain_id: u64,
	token: Address,
	amount: U256,
	metadata: Option<TokenMetadata>,
	state: WithdrawState,
	venue_task: Option<VenueTaskId>,
}

impl WithdrawTask {
	/// Creates a pending withdrawal task.
	pub fn new(
		chain_id: u64,
		token: Address,
		amount: U256,
		metadata: Option<TokenMetadata>,
	) -> Self {
		Self {
			descriptor: TaskDescriptor::new(TaskParams::Withdraw {
				chain_id,
				token,
				amount,
			}),
			chain_id,
			token,
			amount,
			metadata,
			state: WithdrawState::Pending,
			venue_task: None,
		}
	}
}

#[async_trait]
impl Task for WithdrawTask {
	fn descriptor(&self) -> &TaskDescriptor {
		&self.descriptor
	}

	fn name(&self) -> String {
		match &self.metadata {
			Some(metadata) => format!("Withdraw {}", metadata.ticker),
			None => "Withdraw".to_string(),
		}
	}

	fn state_label(&self) -> &'static str {
		match self.state {
			WithdrawState::Pending => "Pending",
			WithdrawState::Submitted => "Submitted",
			WithdrawState::Completed => "Completed",
		}
	}

	fn completed(&self) -> bool {
		self.state == WithdrawState::Completed
	}

	async fn step(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		match self.state {
			WithdrawState::Pending => {
				let task_id = ctx
					.venue()
					.submit_withdrawal(self.chain_id, self.token, self.amount)
					.await?;
				tracing::info!(token = %self.token, amount = %self.amount, venue_task = %task_id, "Withdrawal submitted");
				self.venue_task = Some(task_id);
				self.state = WithdrawState::Submitted;
				Ok(())
			},
			WithdrawState::Submitted => {
				let task_id = self.venue_task.as_ref().ok_or_else(|| {
					TaskError::Precondition("venue task id missing".to_string())
				})?;
				ctx.venue().poll_until_terminal(task_id).await?;
				self.state = WithdrawState::Completed;
				Ok(())
			},
			WithdrawState::Completed => Err(TaskError::AlreadyComplete),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil;
	use ramp_types::VenueTaskState;

	fn task() -> WithdrawTask {
		WithdrawTask::new(
			testutil::VENUE_CHAIN,
			testutil::token_a(),
			U256::from(40u64),
			None,
		)
	}

	#[tokio::test]
	async fn test_states_advance_in_order() {
		let (mut ctx, handles) = testutil::context_with_handles(testutil::Stubs::default());
		let mut task = task();

		task.step(&mut ctx).await.unwrap();
		assert_eq!(task.state_label(), "Submitted");
		task.step(&mut ctx).await.unwrap();
		assert!(task.completed());

		let withdrawals = handles.venue.withdrawals.lock().unwrap();
		assert_eq!(
			withdrawals[0],
			(testutil::VENUE_CHAIN, testutil::token_a(), U256::from(40u64))
		);
	}

	#[tokio::test]
	async fn test_venue_failure_surfaces() {
		let stubs = testutil::Stubs {
			venue_statuses: vec![VenueTaskState::Failed("rejected".to_string())],
			..Default::default()
		};
		let mut ctx = testutil::context(stubs);
		let mut task = task();

		task.step(&mut ctx).await.unwrap();
		let result = task.step(&mut ctx).await;
		assert!(matches!(result, Err(TaskError::Venue(_))));
		assert_eq!(task.state_label(), "Submitted");
	}

	#[tokio::test]
	async fn test_step_after_completion_fails() {
		let mut ctx = testutil::context(testutil::Stubs::default());
		let mut task = task();

		task.step(&mut ctx).await.unwrap();
		task.step(&mut ctx).await.unwrap();
		assert!(matches!(
			task.step(&mut ctx).await,
			Err(TaskError::AlreadyComplete)
		));
	}
}
