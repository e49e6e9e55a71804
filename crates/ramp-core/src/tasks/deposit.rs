//! Venue deposit task.
//!
//! Submits a deposit into the venue balance, authorized by the permit
//! signature a preceding permit task wrote into the context. The
//! deposited amount is the finalized amount: when a route leg recorded
//! actually-received output for the deposit asset, the snapshot balance
//! plus that output is used instead of the originally planned amount.

use crate::context::ExecutionContext;
use crate::tasks::{Task, TaskError};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use ramp_types::{AssetKey, TaskDescriptor, TaskParams, TokenMetadata, VenueTaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepositState {
	Pending,
	Submitted,
	Completed,
}

/// Task depositing funds into the venue balance.
pub struct DepositTask {
	descriptor: TaskDescriptor,
	chain_id: u64,
	token: Address,
	amount: U256,
	metadata: Option<TokenMetadata>,
	state: DepositState,
	venue_task: Option<VenueTaskId>,
}

impl DepositTask {
	/// Creates a pending deposit task for the planned amount.
	pub fn new(
		chain_id: u64,
		token: Address,
		amount: U256,
		metadata: Option<TokenMetadata>,
	) -> Self {
		Self {
			descriptor: TaskDescriptor::new(TaskParams::Deposit {
				chain_id,
				token,
				amount,
			}),
			chain_id,
			token,
			amount,
			metadata,
			state: DepositState::Pending,
			venue_task: None,
		}
	}
}

#[async_trait]
impl Task for DepositTask {
	fn descriptor(&self) -> &TaskDescriptor {
		&self.descriptor
	}

	fn name(&self) -> String {
		match &self.metadata {
			Some(metadata) => format!("Deposit {}", metadata.ticker),
			None => "Deposit".to_string(),
		}
	}

	fn state_label(&self) -> &'static str {
		match self.state {
			DepositState::Pending => "Pending",
			DepositState::Submitted => "Submitted",
			DepositState::Completed => "Completed",
		}
	}

	fn completed(&self) -> bool {
		self.state == DepositState::Completed
	}

	async fn step(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		match self.state {
			DepositState::Pending => {
				// A deposit without its permit cannot recover by retrying.
				let permit = ctx.permit().cloned().ok_or_else(|| {
					TaskError::Precondition("permit signature not available".to_string())
				})?;

				let key = AssetKey::new(self.chain_id, self.token);
				let amount = ctx.finalized_amount(&key, self.amount);
				let task_id = ctx
					.venue()
					.submit_deposit(self.chain_id, self.token, amount, &permit)
					.await?;
				tracing::info!(token = %self.token, amount = %amount, venue_task = %task_id, "Deposit submitted");
				self.venue_task = Some(task_id);
				self.state = DepositState::Submitted;
				Ok(())
			},
			DepositState::Submitted => {
				let task_id = self.venue_task.as_ref().ok_or_else(|| {
					TaskError::Precondition("venue task id missing".to_string())
				})?;
				ctx.venue().poll_until_terminal(task_id).await?;
				self.state = DepositState::Completed;
				Ok(())
			},
			DepositState::Completed => Err(TaskError::AlreadyComplete),
		}
	}
}
