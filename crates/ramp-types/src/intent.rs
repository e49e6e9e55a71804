//! User intent value object.
//!
//! An intent describes what the user wants to happen: deposit into or
//! withdraw from the venue, with a source and destination chain and token
//! and an atomic amount. It is constructed once per user action, never
//! mutated, and re-derived whenever the originating input changes.

use crate::tokens::AssetKey;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Direction of a ramp flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
	/// Move funds from a wallet into the venue balance.
	Deposit,
	/// Move funds from the venue balance back to a wallet.
	Withdraw,
}

/// Immutable description of a user-initiated transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
	/// Whether this is a deposit or a withdrawal.
	pub kind: IntentKind,
	/// The user's wallet address.
	pub user: Address,
	/// Chain the funds start on.
	pub from_chain: u64,
	/// Chain the funds must end on.
	pub to_chain: u64,
	/// Source token. Defaults to the destination token for non-routed flows.
	pub from_token: Option<Address>,
	/// Destination token.
	pub to_token: Address,
	/// Amount in atomic (smallest-unit) form.
	pub amount: U256,
}

impl Intent {
	/// The effective source token, falling back to the destination token
	/// when no explicit source token was provided.
	pub fn source_token(&self) -> Address {
		self.from_token.unwrap_or(self.to_token)
	}

	/// Whether fulfilling this intent requires a bridge or swap route.
	///
	/// True when the source and destination chains differ, or when they
	/// match but the tokens differ.
	pub fn needs_routing(&self) -> bool {
		self.from_chain != self.to_chain || self.source_token() != self.to_token
	}

	/// Whether the available balance covers the intent amount.
	pub fn is_balance_sufficient(&self, available: U256) -> bool {
		available >= self.amount
	}

	/// Asset key for the intent's destination side.
	pub fn destination_asset(&self) -> AssetKey {
		AssetKey::new(self.to_chain, self.to_token)
	}
}
