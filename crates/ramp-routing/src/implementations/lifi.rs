//! LI.FI-style HTTP routing oracle implementation.
//!
//! Talks to a routing aggregator API over HTTP: quote requests, per-leg
//! transaction population and cross-chain status lookups. Response shapes
//! follow the LI.FI wire format.

use crate::{RoutingError, RoutingOracle};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use ramp_types::{PreparedTransaction, Route, RouteLeg, RouteRequest, RouteStatus, TransactionHash};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// HTTP routing oracle implementation.
pub struct LifiRouting {
	client: Client,
	base_url: String,
	slippage_bps: u32,
}

#[derive(Debug, Deserialize)]
struct RoutesResponse {
	routes: Vec<RouteDto>,
}

#[derive(Debug, Deserialize)]
struct RouteDto {
	id: String,
	steps: Vec<StepDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepDto {
	id: String,
	tool: String,
	action: ActionDto,
	estimate: EstimateDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionDto {
	from_chain_id: u64,
	to_chain_id: u64,
	from_token: TokenDto,
	to_token: TokenDto,
	from_amount: String,
}

#[derive(Debug, Deserialize)]
struct TokenDto {
	address: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EstimateDto {
	to_amount: String,
	approval_address: Option<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepTransactionResponse {
	transaction_request: TransactionRequestDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequestDto {
	chain_id: u64,
	to: Address,
	data: Bytes,
	#[serde(default)]
	value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
	status: String,
	receiving: Option<ReceivingDto>,
}

#[derive(Debug, Deserialize)]
struct ReceivingDto {
	amount: Option<String>,
}

/// Parses a decimal string amount into a U256.
fn parse_amount(value: &str) -> Result<U256, RoutingError> {
	U256::from_str_radix(value, 10)
		.map_err(|e| RoutingError::Network(format!("Invalid amount '{}': {}", value, e)))
}

impl LifiRouting {
	/// Creates a new HTTP routing oracle.
	pub fn new(base_url: String, slippage_bps: u32) -> Result<Self, RoutingError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| RoutingError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url,
			slippage_bps,
		})
	}

	fn convert_route(&self, dto: RouteDto) -> Result<Route, RoutingError> {
		let legs = dto
			.steps
			.into_iter()
			.map(|step| {
				Ok(RouteLeg {
					id: step.id,
					tool: step.tool,
					from_chain: step.action.from_chain_id,
					to_chain: step.action.to_chain_id,
					from_token: step.action.from_token.address,
					to_token: step.action.to_token.address,
					from_amount: parse_amount(&step.action.from_amount)?,
					to_amount_estimate: parse_amount(&step.estimate.to_amount)?,
					approval_spender: step.estimate.approval_address,
				})
			})
			.collect::<Result<Vec<_>, RoutingError>>()?;

		Ok(Route { id: dto.id, legs })
	}
}

#[async_trait]
impl RoutingOracle for LifiRouting {
	async fn request_routes(&self, request: &RouteRequest) -> Result<Vec<Route>, RoutingError> {
		let body = json!({
			"fromChainId": request.from_chain,
			"toChainId": request.to_chain,
			"fromTokenAddress": request.from_token,
			"toTokenAddress": request.to_token,
			"fromAmount": request.amount.to_string(),
			"fromAddress": request.from_address,
			"options": {
				"slippage": self.slippage_bps as f64 / 10_000.0,
			},
		});

		let response = self
			.client
			.post(format!("{}/advanced/routes", self.base_url))
			.json(&body)
			.send()
			.await
			.map_err(|e| RoutingError::Network(format!("Route request failed: {}", e)))?
			.error_for_status()
			.map_err(|e| RoutingError::Network(format!("Route request rejected: {}", e)))?;

		let parsed: RoutesResponse = response
			.json()
			.await
			.map_err(|e| RoutingError::Network(format!("Invalid routes response: {}", e)))?;

		parsed
			.routes
			.into_iter()
			.map(|dto| self.convert_route(dto))
			.collect()
	}

	async fn transaction_for(&self, leg: &RouteLeg) -> Result<PreparedTransaction, RoutingError> {
		let body = json!({ "stepId": leg.id, "tool": leg.tool });

		let response = self
			.client
			.post(format!("{}/advanced/stepTransaction", self.base_url))
			.json(&body)
			.send()
			.await
			.map_err(|e| RoutingError::Network(format!("Step transaction request failed: {}", e)))?;

		if !response.status().is_success() {
			let message = response.text().await.unwrap_or_default();
			// The aggregator reports quote drift beyond tolerance as a
			// slippage error; it must surface distinctly so the caller can
			// treat it as fatal for the whole plan.
			if message.to_ascii_lowercase().contains("slippage") {
				return Err(RoutingError::Slippage(message));
			}
			return Err(RoutingError::Network(format!(
				"Step transaction rejected: {}",
				message
			)));
		}

		let parsed: StepTransactionResponse = response
			.json()
			.await
			.map_err(|e| RoutingError::Network(format!("Invalid step transaction: {}", e)))?;

		let value = match parsed.transaction_request.value {
			Some(value) => match value.strip_prefix("0x") {
				Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| {
					RoutingError::Network(format!("Invalid value '{}': {}", value, e))
				})?,
				None => parse_amount(&value)?,
			},
			None => U256::ZERO,
		};

		Ok(PreparedTransaction {
			chain_id: parsed.transaction_request.chain_id,
			to: parsed.transaction_request.to,
			data: parsed.transaction_request.data,
			value,
		})
	}

	async fn poll_status(
		&self,
		tx_hash: &TransactionHash,
		from_chain: u64,
		to_chain: u64,
	) -> Result<RouteStatus, RoutingError> {
		let response = self
			.client
			.get(format!("{}/status", self.base_url))
			.query(&[
				("txHash", tx_hash.to_string()),
				("fromChain", from_chain.to_string()),
				("toChain", to_chain.to_string()),
			])
			.send()
			.await
			.map_err(|e| RoutingError::Network(format!("Status request failed: {}", e)))?
			.error_for_status()
			.map_err(|e| RoutingError::Network(format!("Status request rejected: {}", e)))?;

		let parsed: StatusResponse = response
			.json()
			.await
			.map_err(|e| RoutingError::Network(format!("Invalid status response: {}", e)))?;

		match parsed.status.as_str() {
			"DONE" => {
				let received = parsed
					.receiving
					.and_then(|r| r.amount)
					.map(|amount| parse_amount(&amount))
					.transpose()?
					.unwrap_or(U256::ZERO);
				Ok(RouteStatus::Done { received })
			},
			"FAILED" => Ok(RouteStatus::Failed),
			"INVALID" => Ok(RouteStatus::Invalid),
			_ => Ok(RouteStatus::Pending),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_amount_decimal() {
		assert_eq!(parse_amount("1000000").unwrap(), U256::from(1_000_000u64));
		assert!(parse_amount("not a number").is_err());
	}

	#[test]
	fn test_routes_response_deserializes() {
		let json = r#"{
			"routes": [{
				"id": "route-1",
				"steps": [{
					"id": "step-1",
					"tool": "stargate",
					"action": {
						"fromChainId": 1,
						"toChainId": 42161,
						"fromToken": { "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48" },
						"toToken": { "address": "0xaf88d065e77c8cc2239327c5edb3a432268e5831" },
						"fromAmount": "100"
					},
					"estimate": {
						"toAmount": "99",
						"approvalAddress": "0x1231deb6f5749ef6ce6943a275a1d3e7486f4eae"
					}
				}]
			}]
		}"#;

		let parsed: RoutesResponse = serde_json::from_str(json).unwrap();
		assert_eq!(parsed.routes.len(), 1);
		assert_eq!(parsed.routes[0].steps[0].tool, "stargate");
	}

	#[test]
	fn test_convert_route() {
		let oracle = LifiRouting::new("http://localhost".to_string(), 50).unwrap();
		let dto = RouteDto {
			id: "route-1".to_string(),
			steps: vec![StepDto {
				id: "step-1".to_string(),
				tool: "uniswap".to_string(),
				action: ActionDto {
					from_chain_id: 1,
					to_chain_id: 1,
					from_token: TokenDto {
						address: Address::from([0xaa; 20]),
					},
					to_token: TokenDto {
						address: Address::from([0xbb; 20]),
					},
					from_amount: "70".to_string(),
				},
				estimate: EstimateDto {
					to_amount: "69".to_string(),
					approval_address: None,
				},
			}],
		};

		let route = oracle.convert_route(dto).unwrap();
		assert_eq!(route.legs.len(), 1);
		assert_eq!(route.legs[0].from_amount, U256::from(70u64));
		assert_eq!(route.legs[0].to_amount_estimate, U256::from(69u64));
	}
}
