//! Permit signature task.
//!
//! Requests an off-chain typed-data signature authorizing the venue to
//! pull the deposited tokens, and writes the resulting nonce, deadline
//! and signature into the context's permit slot for the deposit task to
//! consume. No on-chain transaction is involved.

use crate::context::ExecutionContext;
use crate::tasks::{Task, TaskError};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use ramp_types::{PermitSeal, TaskDescriptor, TaskParams, TokenMetadata};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermitState {
	Pending,
	Completed,
}

/// Task producing the deposit permit signature.
pub struct PermitTask {
	descriptor: TaskDescriptor,
	chain_id: u64,
	token: Address,
	amount: U256,
	metadata: Option<TokenMetadata>,
	state: PermitState,
}

impl PermitTask {
	/// Creates a pending permit task.
	pub fn new(
		chain_id: u64,
		token: Address,
		amount: U256,
		metadata: Option<TokenMetadata>,
	) -> Self {
		Self {
			descriptor: TaskDescriptor::new(TaskParams::PermitSignature {
				chain_id,
				token,
				amount,
			}),
			chain_id,
			token,
			amount,
			metadata,
			state: PermitState::Pending,
		}
	}

	fn typed_data(&self, nonce: U256, deadline: u64) -> serde_json::Value {
		serde_json::json!({
			"types": {
				"EIP712Domain": [
					{ "name": "name", "type": "string" },
					{ "name": "version", "type": "string" },
					{ "name": "chainId", "type": "uint256" },
				],
				"DepositPermit": [
					{ "name": "token", "type": "address" },
					{ "name": "amount", "type": "uint256" },
					{ "name": "nonce", "type": "uint256" },
					{ "name": "deadline", "type": "uint256" },
				],
			},
			"primaryType": "DepositPermit",
			"domain": {
				"name": "ramp-venue",
				"version": "1",
				"chainId": self.chain_id,
			},
			"message": {
				"token": self.token,
				"amount": self.amount.to_string(),
				"nonce": nonce.to_string(),
				"deadline": deadline.to_string(),
			},
		})
	}
}

#[async_trait]
impl Task for PermitTask {
	fn descriptor(&self) -> &TaskDescriptor {
		&self.descriptor
	}

	fn name(&self) -> String {
		match &self.metadata {
			Some(metadata) => format!("Sign {} deposit permit", metadata.ticker),
			None => "Sign deposit permit".to_string(),
		}
	}

	fn state_label(&self) -> &'static str {
		match self.state {
			PermitState::Pending => "Pending",
			PermitState::Completed => "Completed",
		}
	}

	fn completed(&self) -> bool {
		self.state == PermitState::Completed
	}

	async fn step(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		match self.state {
			PermitState::Pending => {
				let now = SystemTime::now()
					.duration_since(UNIX_EPOCH)
					.unwrap_or_default();
				// Unordered nonce scheme: any unused value is valid, so a
				// millisecond timestamp never collides within a session.
				let nonce = U256::from(now.as_millis());
				let deadline = now.as_secs() + ctx.venue().permit_ttl_secs();

				let payload = self.typed_data(nonce, deadline);
				let client = ctx.chains().client(self.chain_id).await?;
				let signature = client.sign_typed_data(&payload).await?;

				ctx.set_permit(PermitSeal {
					nonce,
					deadline,
					signature,
				})?;
				tracing::info!(token = %self.token, deadline, "Deposit permit signed");
				self.state = PermitState::Completed;
				Ok(())
			},
			PermitState::Completed => Err(TaskError::AlreadyComplete),
		}
	}
}
