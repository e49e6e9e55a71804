//! Route types returned by the routing oracle.
//!
//! A route is an ordered sequence of legs moving value from a source
//! chain/token to a destination chain/token. Each leg is one atomic
//! on-chain step (a swap or a bridge hop) executed by a route-leg task.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A request for routes from the routing oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
	/// Chain the funds start on.
	pub from_chain: u64,
	/// Chain the funds must end on.
	pub to_chain: u64,
	/// Token the funds start in.
	pub from_token: Address,
	/// Token the funds must end in.
	pub to_token: Address,
	/// Input amount in atomic form. Must be non-zero; callers are expected
	/// to skip the request entirely when no input is required.
	pub amount: U256,
	/// Address funding the route.
	pub from_address: Address,
}

/// One atomic step of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
	/// Oracle-assigned leg identifier.
	pub id: String,
	/// Name of the tool executing this leg, e.g. a DEX or bridge.
	pub tool: String,
	/// Chain this leg starts on.
	pub from_chain: u64,
	/// Chain this leg ends on.
	pub to_chain: u64,
	/// Input token.
	pub from_token: Address,
	/// Output token.
	pub to_token: Address,
	/// Input amount in atomic form.
	pub from_amount: U256,
	/// Estimated output amount in atomic form. The actual received amount
	/// is only known once the leg's terminal status is observed.
	pub to_amount_estimate: U256,
	/// Contract that must be approved to spend the input token, when the
	/// leg requires an ERC-20 approval.
	pub approval_spender: Option<Address>,
}

/// An ordered sequence of legs fulfilling a route request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
	/// Oracle-assigned route identifier.
	pub id: String,
	/// Legs in execution order.
	pub legs: Vec<RouteLeg>,
}

/// Status of a submitted route leg as reported by the routing oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
	/// The leg has not reached a terminal state yet.
	Pending,
	/// The leg completed; `received` is the actually-received output amount.
	Done { received: U256 },
	/// The leg failed.
	Failed,
	/// The transaction was not recognized by the oracle.
	Invalid,
}

impl RouteStatus {
	/// Whether this status is terminal.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, RouteStatus::Pending)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_route_status_terminality() {
		assert!(!RouteStatus::Pending.is_terminal());
		assert!(RouteStatus::Done {
			received: U256::from(1u64)
		}
		.is_terminal());
		assert!(RouteStatus::Failed.is_terminal());
		assert!(RouteStatus::Invalid.is_terminal());
	}
}
