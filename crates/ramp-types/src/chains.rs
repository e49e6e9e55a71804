//! Chain-level types for the ramp system.
//!
//! This module defines types related to blockchain transaction submission
//! and signing, including transaction hashes, receipts and the permit
//! payload written into the execution context by the permit task.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Family of a chain, determining which signing path transactions take.
///
/// Transactions on the venue's native chain are signed and submitted with
/// the session signer directly. Transactions on any other chain go through
/// the connected wallet, which first receives a chain-switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
	/// The venue's native chain family.
	VenueNative,
	/// Any other supported chain family.
	External,
}

/// Blockchain transaction hash representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl std::fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

/// A fully-populated transaction ready for submission.
///
/// Produced either by the routing oracle (for route legs) or built locally
/// (for approvals). Carries everything a chain client needs to submit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedTransaction {
	/// Chain the transaction must be submitted on.
	pub chain_id: u64,
	/// Recipient contract address.
	pub to: Address,
	/// Call data.
	pub data: Bytes,
	/// Native value attached to the call.
	pub value: U256,
}

/// Transaction receipt containing execution details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// A permit signature produced by the permit task and consumed by the
/// deposit task through the execution context's permit slot.
///
/// The slot is write-once-then-read within a single queue execution and
/// must be considered stale across separate planning cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitSeal {
	/// Permit nonce included in the signed typed data.
	pub nonce: U256,
	/// Unix deadline after which the permit is invalid.
	pub deadline: u64,
	/// The typed-data signature bytes.
	pub signature: Bytes,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_transaction_hash_display() {
		let hash = TransactionHash(B256::from([0x12; 32]));
		let display = hash.to_string();
		assert!(display.starts_with("0x12"));
		assert_eq!(display.len(), 66);
	}

	#[test]
	fn test_chain_family_serde() {
		let family: ChainFamily = serde_json::from_str("\"venue_native\"").unwrap();
		assert_eq!(family, ChainFamily::VenueNative);
		let family: ChainFamily = serde_json::from_str("\"external\"").unwrap();
		assert_eq!(family, ChainFamily::External);
	}
}
