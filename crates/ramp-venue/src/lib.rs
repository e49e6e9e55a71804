//! Venue backend module for the ramp system.
//!
//! The venue runs its own asynchronous task system: deposit, withdrawal
//! and fee-payment submissions return an opaque task id which is polled
//! until terminal. This module defines the venue interface and a service
//! layer adding terminal-status polling on top of it.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use ramp_config::VenueConfig;
use ramp_types::{BalanceSnapshot, PermitSeal, SubmitResponse, VenueTaskId, VenueTaskState};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur during venue operations.
#[derive(Debug, Error)]
pub enum VenueError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The venue reported a terminal failure for a task.
	#[error("Venue task failed: {0}")]
	TaskFailed(String),
	/// The venue did not return a task id where one is required.
	#[error("Venue returned no task id")]
	MissingTaskId,
	/// The status poller exhausted its attempt budget.
	#[error("Status polling exhausted: {0}")]
	PollExhausted(String),
}

/// Trait defining the interface for venue backend implementations.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait VenueApi: Send + Sync {
	/// Submits a deposit into the venue balance, authorized by a permit
	/// signature. Returns the venue-side task id.
	async fn submit_deposit(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
		permit: &PermitSeal,
	) -> Result<SubmitResponse, VenueError>;

	/// Submits a withdrawal from the venue balance. Returns the
	/// venue-side task id.
	async fn submit_withdrawal(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
	) -> Result<SubmitResponse, VenueError>;

	/// Submits a payment of accrued fees. A response without a task id
	/// means the venue settled the payment synchronously.
	async fn submit_fee_payment(&self, chain_id: u64) -> Result<SubmitResponse, VenueError>;

	/// Reports the current state of a venue-side task.
	async fn task_status(&self, task_id: &VenueTaskId) -> Result<VenueTaskState, VenueError>;

	/// A snapshot of the venue-visible wallet balances for a user.
	async fn balance_snapshot(&self, owner: Address) -> Result<BalanceSnapshot, VenueError>;

	/// The user's outstanding venue fee balance.
	async fn fee_balance(&self, owner: Address) -> Result<U256, VenueError>;
}

/// Service wrapping a venue backend implementation.
///
/// Adds a fixed-interval terminal-status poller on top of the raw task
/// status endpoint, bounded by the configured attempt budget or unbounded
/// when none is set.
pub struct VenueService {
	implementation: Arc<dyn VenueApi>,
	config: VenueConfig,
}

impl VenueService {
	/// Creates a new VenueService with the specified implementation.
	pub fn new(implementation: Arc<dyn VenueApi>, config: VenueConfig) -> Self {
		Self {
			implementation,
			config,
		}
	}

	/// The configured permit lifetime in seconds.
	pub fn permit_ttl_secs(&self) -> u64 {
		self.config.permit_ttl_secs
	}

	/// Submits a deposit into the venue balance.
	pub async fn submit_deposit(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
		permit: &PermitSeal,
	) -> Result<VenueTaskId, VenueError> {
		let response = self
			.implementation
			.submit_deposit(chain_id, token, amount, permit)
			.await?;
		response.task_id.ok_or(VenueError::MissingTaskId)
	}

	/// Submits a withdrawal from the venue balance.
	pub async fn submit_withdrawal(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
	) -> Result<VenueTaskId, VenueError> {
		let response = self
			.implementation
			.submit_withdrawal(chain_id, token, amount)
			.await?;
		response.task_id.ok_or(VenueError::MissingTaskId)
	}

	/// Submits a fee payment, returning the task id to poll when the
	/// venue did not settle the payment synchronously.
	pub async fn submit_fee_payment(
		&self,
		chain_id: u64,
	) -> Result<Option<VenueTaskId>, VenueError> {
		Ok(self.implementation.submit_fee_payment(chain_id).await?.task_id)
	}

	/// A snapshot of the venue-visible wallet balances for a user.
	pub async fn balance_snapshot(&self, owner: Address) -> Result<BalanceSnapshot, VenueError> {
		self.implementation.balance_snapshot(owner).await
	}

	/// The user's outstanding venue fee balance.
	pub async fn fee_balance(&self, owner: Address) -> Result<U256, VenueError> {
		self.implementation.fee_balance(owner).await
	}

	/// Polls a venue task until it reaches a terminal state.
	///
	/// `Completed` returns successfully; `Failed` becomes
	/// [`VenueError::TaskFailed`]. With a configured attempt budget,
	/// exhaustion surfaces the last observed poll error when there was
	/// one, otherwise a generic exhaustion error.
	pub async fn poll_until_terminal(&self, task_id: &VenueTaskId) -> Result<(), VenueError> {
		let interval = Duration::from_millis(self.config.poll_interval_ms);
		let mut attempts: u32 = 0;
		let mut last_error: Option<VenueError> = None;

		loop {
			if let Some(max) = self.config.poll_attempts {
				if attempts >= max {
					return Err(last_error.unwrap_or_else(|| {
						VenueError::PollExhausted(format!(
							"task {} not terminal after {} polls",
							task_id, max
						))
					}));
				}
			}
			attempts += 1;

			match self.implementation.task_status(task_id).await {
				Ok(VenueTaskState::Completed) => return Ok(()),
				Ok(VenueTaskState::Failed(reason)) => return Err(VenueError::TaskFailed(reason)),
				Ok(state) => {
					tracing::debug!(task_id = %task_id, state = ?state, "Venue task not terminal yet");
				},
				Err(e) => {
					tracing::debug!(task_id = %task_id, error = %e, "Venue status poll failed");
					last_error = Some(e);
				},
			}

			tokio::time::sleep(interval).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	/// Venue returning scripted task states in order.
	struct ScriptedVenue {
		states: Mutex<Vec<Result<VenueTaskState, VenueError>>>,
	}

	#[async_trait]
	impl VenueApi for ScriptedVenue {
		async fn submit_deposit(
			&self,
			_chain_id: u64,
			_token: Address,
			_amount: U256,
			_permit: &PermitSeal,
		) -> Result<SubmitResponse, VenueError> {
			Ok(SubmitResponse {
				task_id: Some(VenueTaskId("task-1".to_string())),
			})
		}

		async fn submit_withdrawal(
			&self,
			_chain_id: u64,
			_token: Address,
			_amount: U256,
		) -> Result<SubmitResponse, VenueError> {
			Ok(SubmitResponse { task_id: None })
		}

		async fn submit_fee_payment(&self, _chain_id: u64) -> Result<SubmitResponse, VenueError> {
			Ok(SubmitResponse { task_id: None })
		}

		async fn task_status(&self, _task_id: &VenueTaskId) -> Result<VenueTaskState, VenueError> {
			let mut states = self.states.lock().unwrap();
			if states.is_empty() {
				Ok(VenueTaskState::Running)
			} else {
				states.remove(0)
			}
		}

		async fn balance_snapshot(&self, _owner: Address) -> Result<BalanceSnapshot, VenueError> {
			Ok(BalanceSnapshot::new())
		}

		async fn fee_balance(&self, _owner: Address) -> Result<U256, VenueError> {
			Ok(U256::ZERO)
		}
	}

	fn config(attempts: Option<u32>) -> VenueConfig {
		VenueConfig {
			base_url: "http://localhost".to_string(),
			poll_interval_ms: 1,
			poll_attempts: attempts,
			permit_ttl_secs: 3600,
		}
	}

	fn service(
		states: Vec<Result<VenueTaskState, VenueError>>,
		attempts: Option<u32>,
	) -> VenueService {
		VenueService::new(
			Arc::new(ScriptedVenue {
				states: Mutex::new(states),
			}),
			config(attempts),
		)
	}

	#[tokio::test]
	async fn test_poll_until_completed() {
		let service = service(
			vec![
				Ok(VenueTaskState::Queued),
				Ok(VenueTaskState::Running),
				Ok(VenueTaskState::Completed),
			],
			Some(10),
		);

		service
			.poll_until_terminal(&VenueTaskId("task-1".to_string()))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_poll_failed_task_is_an_error() {
		let service = service(vec![Ok(VenueTaskState::Failed("rejected".into()))], Some(10));

		let result = service
			.poll_until_terminal(&VenueTaskId("task-1".to_string()))
			.await;
		match result {
			Err(VenueError::TaskFailed(reason)) => assert_eq!(reason, "rejected"),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_poll_exhaustion() {
		let service = service(vec![], Some(3));

		let result = service
			.poll_until_terminal(&VenueTaskId("task-1".to_string()))
			.await;
		assert!(matches!(result, Err(VenueError::PollExhausted(_))));
	}

	#[tokio::test]
	async fn test_withdrawal_without_task_id_is_an_error() {
		let service = service(vec![], Some(1));

		let result = service
			.submit_withdrawal(42161, Address::from([0xaa; 20]), U256::from(1u64))
			.await;
		assert!(matches!(result, Err(VenueError::MissingTaskId)));
	}
}
