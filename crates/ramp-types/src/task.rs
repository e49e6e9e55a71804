//! Task descriptors.
//!
//! A descriptor is the immutable, serializable identity of one planned
//! task: a stable id, a kind tag and the type-specific parameters. It is
//! used for logging, event payloads and prerequisite injection decisions;
//! the mutable progress state lives on the task itself.

use crate::routing::RouteLeg;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Tag identifying a task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
	Approve,
	PermitSignature,
	Deposit,
	Withdraw,
	RouteLeg,
	PayFees,
}

/// Type-specific parameters for one task instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskParams {
	/// ERC-20 approval of `spender` for `amount` of `token`.
	Approve {
		chain_id: u64,
		token: Address,
		spender: Address,
		amount: U256,
	},
	/// Off-chain permit signature authorizing the venue deposit.
	PermitSignature {
		chain_id: u64,
		token: Address,
		amount: U256,
	},
	/// Deposit into the venue balance.
	Deposit {
		chain_id: u64,
		token: Address,
		amount: U256,
	},
	/// Withdrawal from the venue balance.
	Withdraw {
		chain_id: u64,
		token: Address,
		amount: U256,
	},
	/// One leg of a bridge/swap route. `final_leg` marks the leg that is
	/// responsible for recording the actually-received output amount.
	RouteLeg { leg: RouteLeg, final_leg: bool },
	/// Payment of accrued venue fees.
	PayFees { chain_id: u64 },
}

impl TaskParams {
	/// The kind tag for these parameters.
	pub fn kind(&self) -> TaskKind {
		match self {
			TaskParams::Approve { .. } => TaskKind::Approve,
			TaskParams::PermitSignature { .. } => TaskKind::PermitSignature,
			TaskParams::Deposit { .. } => TaskKind::Deposit,
			TaskParams::Withdraw { .. } => TaskKind::Withdraw,
			TaskParams::RouteLeg { .. } => TaskKind::RouteLeg,
			TaskParams::PayFees { .. } => TaskKind::PayFees,
		}
	}
}

/// Immutable, serializable identity of a planned task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
	/// Stable unique id assigned at planning time.
	pub id: String,
	/// Type-specific parameters.
	pub params: TaskParams,
}

impl TaskDescriptor {
	/// Creates a descriptor with a freshly generated id.
	pub fn new(params: TaskParams) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			params,
		}
	}

	/// The kind tag of the described task.
	pub fn kind(&self) -> TaskKind {
		self.params.kind()
	}
}
