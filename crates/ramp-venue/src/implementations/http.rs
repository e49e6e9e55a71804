//! HTTP venue backend implementation.
//!
//! Talks to the venue's relayer API over HTTP: task submissions, task
//! status lookups, balance snapshots and fee balances.

use crate::{VenueApi, VenueError};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use ramp_types::{
	AssetKey, BalanceSnapshot, PermitSeal, SubmitResponse, VenueTaskId, VenueTaskState,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// HTTP venue backend implementation.
pub struct HttpVenue {
	client: Client,
	base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponseDto {
	#[serde(default)]
	task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskStatusDto {
	state: String,
	#[serde(default)]
	reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceDto {
	chain_id: u64,
	token: Address,
	amount: String,
}

#[derive(Debug, Deserialize)]
struct BalancesDto {
	balances: Vec<BalanceDto>,
}

#[derive(Debug, Deserialize)]
struct FeeBalanceDto {
	amount: String,
}

fn parse_amount(value: &str) -> Result<U256, VenueError> {
	U256::from_str_radix(value, 10)
		.map_err(|e| VenueError::Network(format!("Invalid amount '{}': {}", value, e)))
}

impl HttpVenue {
	/// Creates a new HTTP venue client.
	pub fn new(base_url: String) -> Result<Self, VenueError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| VenueError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self { client, base_url })
	}

	async fn post_submit(
		&self,
		path: &str,
		body: serde_json::Value,
	) -> Result<SubmitResponse, VenueError> {
		let response = self
			.client
			.post(format!("{}{}", self.base_url, path))
			.json(&body)
			.send()
			.await
			.map_err(|e| VenueError::Network(format!("Submission failed: {}", e)))?
			.error_for_status()
			.map_err(|e| VenueError::Network(format!("Submission rejected: {}", e)))?;

		let parsed: SubmitResponseDto = response
			.json()
			.await
			.map_err(|e| VenueError::Network(format!("Invalid submission response: {}", e)))?;

		Ok(SubmitResponse {
			task_id: parsed.task_id.map(VenueTaskId),
		})
	}
}

#[async_trait]
impl VenueApi for HttpVenue {
	async fn submit_deposit(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
		permit: &PermitSeal,
	) -> Result<SubmitResponse, VenueError> {
		self.post_submit(
			"/deposit",
			json!({
				"chainId": chain_id,
				"token": token,
				"amount": amount.to_string(),
				"permitNonce": permit.nonce.to_string(),
				"permitDeadline": permit.deadline,
				"permitSignature": permit.signature,
			}),
		)
		.await
	}

	async fn submit_withdrawal(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
	) -> Result<SubmitResponse, VenueError> {
		self.post_submit(
			"/withdraw",
			json!({
				"chainId": chain_id,
				"token": token,
				"amount": amount.to_string(),
			}),
		)
		.await
	}

	async fn submit_fee_payment(&self, chain_id: u64) -> Result<SubmitResponse, VenueError> {
		self.post_submit("/fees/pay", json!({ "chainId": chain_id })).await
	}

	async fn task_status(&self, task_id: &VenueTaskId) -> Result<VenueTaskState, VenueError> {
		let response = self
			.client
			.get(format!("{}/task/{}", self.base_url, task_id))
			.send()
			.await
			.map_err(|e| VenueError::Network(format!("Status request failed: {}", e)))?
			.error_for_status()
			.map_err(|e| VenueError::Network(format!("Status request rejected: {}", e)))?;

		let parsed: TaskStatusDto = response
			.json()
			.await
			.map_err(|e| VenueError::Network(format!("Invalid status response: {}", e)))?;

		Ok(match parsed.state.as_str() {
			"Completed" => VenueTaskState::Completed,
			"Failed" => VenueTaskState::Failed(parsed.reason.unwrap_or_default()),
			"Running" => VenueTaskState::Running,
			_ => VenueTaskState::Queued,
		})
	}

	async fn balance_snapshot(&self, owner: Address) -> Result<BalanceSnapshot, VenueError> {
		let response = self
			.client
			.get(format!("{}/balances/{}", self.base_url, owner))
			.send()
			.await
			.map_err(|e| VenueError::Network(format!("Balance request failed: {}", e)))?
			.error_for_status()
			.map_err(|e| VenueError::Network(format!("Balance request rejected: {}", e)))?;

		let parsed: BalancesDto = response
			.json()
			.await
			.map_err(|e| VenueError::Network(format!("Invalid balances response: {}", e)))?;

		let mut snapshot = BalanceSnapshot::new();
		for balance in parsed.balances {
			snapshot.set(
				AssetKey::new(balance.chain_id, balance.token),
				parse_amount(&balance.amount)?,
			);
		}
		Ok(snapshot)
	}

	async fn fee_balance(&self, owner: Address) -> Result<U256, VenueError> {
		let response = self
			.client
			.get(format!("{}/fees/{}", self.base_url, owner))
			.send()
			.await
			.map_err(|e| VenueError::Network(format!("Fee balance request failed: {}", e)))?
			.error_for_status()
			.map_err(|e| VenueError::Network(format!("Fee balance request rejected: {}", e)))?;

		let parsed: FeeBalanceDto = response
			.json()
			.await
			.map_err(|e| VenueError::Network(format!("Invalid fee balance response: {}", e)))?;

		parse_amount(&parsed.amount)
	}
}
