//! Token metadata and asset key types.
//!
//! Token metadata is resolved through the token registry collaborator and
//! consumed read-only by the planner and task state machines.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Identifies a token on a specific chain.
///
/// Used as the key for wallet balance snapshots and the execution
/// context's route-output accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetKey {
	/// Chain the token lives on.
	pub chain_id: u64,
	/// Token contract address.
	pub token: Address,
}

impl AssetKey {
	pub fn new(chain_id: u64, token: Address) -> Self {
		Self { chain_id, token }
	}
}

/// Capability flags attached to token metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFlags {
	/// Token uses a non-standard approve ABI and requires the allowance to
	/// be reset to zero before it can be raised to a new value.
	#[serde(default)]
	pub nonstandard_approval: bool,
}

/// Metadata describing a token on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
	/// Token contract address.
	pub address: Address,
	/// Display ticker, e.g. "USDC".
	pub ticker: String,
	/// Number of decimals in the token's atomic representation.
	pub decimals: u8,
	/// Capability flags.
	#[serde(default)]
	pub flags: TokenFlags,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_asset_key_equality() {
		let token = Address::from([0xaa; 20]);
		assert_eq!(AssetKey::new(1, token), AssetKey::new(1, token));
		assert_ne!(AssetKey::new(1, token), AssetKey::new(2, token));
	}

	#[test]
	fn test_token_flags_default() {
		let flags = TokenFlags::default();
		assert!(!flags.nonstandard_approval);
	}
}
