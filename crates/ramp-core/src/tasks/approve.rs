//! ERC-20 approval task.
//!
//! Grants a spender an allowance over the user's tokens ahead of a
//! deposit or a route leg. The planning-time needed check compares the
//! on-chain allowance against the required amount so redundant
//! approvals are dropped from the plan.

use crate::context::ExecutionContext;
use crate::tasks::{submit_prepared, Task, TaskError};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use ramp_types::{
	PreparedTransaction, TaskDescriptor, TaskParams, TokenMetadata, TransactionHash,
};

/// approve(address,uint256)
const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApproveState {
	Pending,
	Submitted,
	Completed,
}

/// Task granting an ERC-20 allowance to a spender.
pub struct ApproveTask {
	descriptor: TaskDescriptor,
	chain_id: u64,
	token: Address,
	spender: Address,
	amount: U256,
	metadata: Option<TokenMetadata>,
	state: ApproveState,
	tx_hash: Option<TransactionHash>,
	explorer: Option<String>,
}

impl ApproveTask {
	/// Creates a pending approval task.
	pub fn new(
		chain_id: u64,
		token: Address,
		spender: Address,
		amount: U256,
		metadata: Option<TokenMetadata>,
	) -> Self {
		Self {
			descriptor: TaskDescriptor::new(TaskParams::Approve {
				chain_id,
				token,
				spender,
				amount,
			}),
			chain_id,
			token,
			spender,
			amount,
			metadata,
			state: ApproveState::Pending,
			tx_hash: None,
			explorer: None,
		}
	}

	fn transaction(&self, amount: U256) -> PreparedTransaction {
		let mut data = Vec::with_capacity(68);
		data.extend_from_slice(&APPROVE_SELECTOR);
		data.extend_from_slice(&[0u8; 12]);
		data.extend_from_slice(self.spender.as_slice());
		data.extend_from_slice(&amount.to_be_bytes::<32>());
		PreparedTransaction {
			chain_id: self.chain_id,
			to: self.token,
			data: Bytes::from(data),
			value: U256::ZERO,
		}
	}
}

#[async_trait]
impl Task for ApproveTask {
	fn descriptor(&self) -> &TaskDescriptor {
		&self.descriptor
	}

	fn name(&self) -> String {
		match &self.metadata {
			Some(metadata) => format!("Approve {}", metadata.ticker),
			None => "Approve token".to_string(),
		}
	}

	fn state_label(&self) -> &'static str {
		match self.state {
			ApproveState::Pending => "Pending",
			ApproveState::Submitted => "Submitted",
			ApproveState::Completed => "Completed",
		}
	}

	fn completed(&self) -> bool {
		self.state == ApproveState::Completed
	}

	async fn step(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		match self.state {
			ApproveState::Pending => {
				let nonstandard = self
					.metadata
					.as_ref()
					.map(|m| m.flags.nonstandard_approval)
					.unwrap_or(false);
				if nonstandard {
					// Tokens with the non-standard approve ABI refuse to
					// raise a non-zero allowance; reset it first.
					let current = ctx
						.chains()
						.allowance(self.chain_id, ctx.user(), self.spender, self.token)
						.await?;
					if !current.is_zero() {
						let reset = self.transaction(U256::ZERO);
						let hash = submit_prepared(ctx, &reset).await?;
						let receipt = ctx
							.chains()
							.client(self.chain_id)
							.await?
							.wait_for_receipt(&hash)
							.await?;
						if !receipt.success {
							return Err(TaskError::Chain(
								"allowance reset transaction reverted".to_string(),
							));
						}
					}
				}

				let tx = self.transaction(self.amount);
				let hash = submit_prepared(ctx, &tx).await?;
				tracing::info!(token = %self.token, spender = %self.spender, tx_hash = %hash, "Approval submitted");
				self.tx_hash = Some(hash);
				self.state = ApproveState::Submitted;
				Ok(())
			},
			ApproveState::Submitted => {
				let hash = self
					.tx_hash
					.ok_or_else(|| TaskError::Precondition("approval hash missing".to_string()))?;
				let client = ctx.chains().client(self.chain_id).await?;
				let receipt = client.wait_for_receipt(&hash).await?;
				if !receipt.success {
					return Err(TaskError::Chain("approval transaction reverted".to_string()));
				}
				self.explorer = client.explorer_link(&hash);
				self.state = ApproveState::Completed;
				Ok(())
			},
			ApproveState::Completed => Err(TaskError::AlreadyComplete),
		}
	}

	fn explorer_link(&self) -> Option<String> {
		self.explorer.clone()
	}

	async fn is_needed(&self, ctx: &ExecutionContext) -> Result<bool, TaskError> {
		let allowance = ctx
			.chains()
			.allowance(self.chain_id, ctx.user(), self.spender, self.token)
			.await?;
		Ok(allowance < self.amount)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil;
	use ramp_types::TokenFlags;

	fn task(metadata: Option<TokenMetadata>) -> ApproveTask {
		ApproveTask::new(
			testutil::VENUE_CHAIN,
			testutil::token_a(),
			testutil::venue_spender(),
			U256::from(100u64),
			metadata,
		)
	}

	fn nonstandard_metadata() -> TokenMetadata {
		TokenMetadata {
			address: testutil::token_a(),
			ticker: "ODD".to_string(),
			decimals: 18,
			flags: TokenFlags {
				nonstandard_approval: true,
			},
		}
	}

	#[tokio::test]
	async fn test_states_advance_in_order() {
		let mut ctx = testutil::context(testutil::Stubs::default());
		let mut task = task(None);

		assert_eq!(task.state_label(), "Pending");
		assert!(!task.completed());

		task.step(&mut ctx).await.unwrap();
		assert_eq!(task.state_label(), "Submitted");
		assert!(!task.completed());

		task.step(&mut ctx).await.unwrap();
		assert_eq!(task.state_label(), "Completed");
		assert!(task.completed());
		assert!(task.explorer_link().is_some());
	}

	#[tokio::test]
	async fn test_step_after_completion_fails() {
		let mut ctx = testutil::context(testutil::Stubs::default());
		let mut task = task(None);

		task.step(&mut ctx).await.unwrap();
		task.step(&mut ctx).await.unwrap();
		assert!(task.completed());

		let result = task.step(&mut ctx).await;
		assert!(matches!(result, Err(TaskError::AlreadyComplete)));
		assert!(task.completed());
	}

	#[tokio::test]
	async fn test_not_needed_when_allowance_sufficient() {
		let stubs = testutil::Stubs {
			allowance: U256::from(200u64),
			..Default::default()
		};
		let ctx = testutil::context(stubs);

		assert!(!task(None).is_needed(&ctx).await.unwrap());
	}

	#[tokio::test]
	async fn test_needed_when_allowance_insufficient() {
		let ctx = testutil::context(testutil::Stubs::default());

		assert!(task(None).is_needed(&ctx).await.unwrap());
	}

	#[tokio::test]
	async fn test_nonstandard_token_resets_allowance_first() {
		let stubs = testutil::Stubs {
			allowance: U256::from(50u64),
			..Default::default()
		};
		let (mut ctx, handles) = testutil::context_with_handles(stubs);
		let mut task = task(Some(nonstandard_metadata()));

		task.step(&mut ctx).await.unwrap();

		let submissions = handles.chain.submissions.lock().unwrap();
		assert_eq!(submissions.len(), 2);
		// The first submission zeroes the allowance.
		assert_eq!(U256::from_be_slice(&submissions[0].1.data[36..]), U256::ZERO);
		assert_eq!(
			U256::from_be_slice(&submissions[1].1.data[36..]),
			U256::from(100u64)
		);
	}

	#[tokio::test]
	async fn test_standard_token_submits_once() {
		let (mut ctx, handles) = testutil::context_with_handles(testutil::Stubs::default());
		let mut task = task(None);

		task.step(&mut ctx).await.unwrap();

		assert_eq!(handles.chain.submissions.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_reverted_approval_is_an_error() {
		let stubs = testutil::Stubs {
			receipt_success: false,
			..Default::default()
		};
		let mut ctx = testutil::context(stubs);
		let mut task = task(None);

		task.step(&mut ctx).await.unwrap();
		let result = task.step(&mut ctx).await;

		assert!(matches!(result, Err(TaskError::Chain(_))));
		assert_eq!(task.state_label(), "Submitted");
	}
}
