//! Venue backend types.
//!
//! The venue runs its own asynchronous task system: submissions return an
//! opaque task id which is then polled until it reaches a terminal state.

use crate::tokens::AssetKey;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque identifier of a task in the venue's backend task system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueTaskId(pub String);

impl std::fmt::Display for VenueTaskId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// State of a venue-side task as reported by the venue backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VenueTaskState {
	/// Accepted but not yet running.
	Queued,
	/// Currently being processed.
	Running,
	/// Finished successfully.
	Completed,
	/// Finished with a failure.
	Failed(String),
}

impl VenueTaskState {
	/// Whether this state is terminal.
	pub fn is_terminal(&self) -> bool {
		matches!(self, VenueTaskState::Completed | VenueTaskState::Failed(_))
	}
}

/// Response to a venue submission.
///
/// A `None` task id means the venue completed the operation synchronously
/// and no polling is required. Only fee payments can take this path;
/// deposits and withdrawals always return a task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
	pub task_id: Option<VenueTaskId>,
}

/// A snapshot of wallet balances keyed by chain and token.
///
/// Captured once before planning and read by the planner (shortfall
/// computation) and the deposit task (finalized-amount resolution).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
	balances: HashMap<AssetKey, U256>,
}

impl BalanceSnapshot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records the balance for an asset, replacing any previous entry.
	pub fn set(&mut self, key: AssetKey, amount: U256) {
		self.balances.insert(key, amount);
	}

	/// The recorded balance for an asset, zero when never captured.
	pub fn amount_for(&self, key: &AssetKey) -> U256 {
		self.balances.get(key).copied().unwrap_or(U256::ZERO)
	}
}
