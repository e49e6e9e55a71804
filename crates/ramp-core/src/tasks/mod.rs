//! The task contract and the concrete task state machines.
//!
//! A task is the atomic unit of work: a typed, resumable state machine
//! advanced one transition at a time by [`step`](Task::step). Tasks are
//! created by the planner in their initial state and mutated only by the
//! driver. Terminal outcomes are the completed state or a propagated
//! [`TaskError`]; a task never stores a failed state of its own.

use crate::context::{ContextError, ExecutionContext};
use async_trait::async_trait;
use ramp_chains::ChainError;
use ramp_routing::RoutingError;
use ramp_types::{ChainFamily, PreparedTransaction, TaskDescriptor, TransactionHash};
use ramp_venue::VenueError;
use thiserror::Error;

pub mod approve;
pub mod deposit;
pub mod fees;
pub mod leg;
pub mod permit;
pub mod withdraw;

pub use approve::ApproveTask;
pub use deposit::DepositTask;
pub use fees::PayFeesTask;
pub use leg::RouteLegTask;
pub use permit::PermitTask;
pub use withdraw::WithdrawTask;

/// Errors raised by task state machines.
///
/// Every error carries an implicit retryable classification through
/// [`TaskError::retryable`]. The flag is surfaced on errored events but
/// is not consulted by the driver or queue; it exists as a contract for
/// future backoff logic.
#[derive(Debug, Error)]
pub enum TaskError {
	/// `step` was called on an already-completed task. Indicates a
	/// caller bug; the driver never does this.
	#[error("Task stepped after completion")]
	AlreadyComplete,
	/// Required shared state was missing when a task needed it.
	#[error("Precondition failed: {0}")]
	Precondition(String),
	/// The wallet refused or failed a signing request.
	#[error("Wallet error: {0}")]
	Wallet(String),
	/// An on-chain read, submission or receipt wait failed.
	#[error("Chain error: {0}")]
	Chain(String),
	/// The routing oracle failed or reported a leg failure.
	#[error("Routing error: {0}")]
	Routing(String),
	/// The routing oracle refused a leg transaction because the quoted
	/// rate can no longer be met within the slippage tolerance.
	#[error("Slippage tolerance exceeded: {0}")]
	Slippage(String),
	/// The venue backend failed or reported a task failure.
	#[error("Venue error: {0}")]
	Venue(String),
	/// A bounded status poll exhausted its attempt budget.
	#[error("Polling exhausted: {0}")]
	PollExhausted(String),
}

impl TaskError {
	/// Whether a retry of the same step could plausibly succeed.
	///
	/// Only transient transport failures qualify; precondition,
	/// slippage, venue-rejection and exhaustion errors do not.
	pub fn retryable(&self) -> bool {
		matches!(self, TaskError::Chain(_) | TaskError::Routing(_))
	}
}

impl From<ContextError> for TaskError {
	fn from(err: ContextError) -> Self {
		TaskError::Precondition(err.to_string())
	}
}

impl From<ChainError> for TaskError {
	fn from(err: ChainError) -> Self {
		match err {
			ChainError::Signing(msg) => TaskError::Wallet(msg),
			other => TaskError::Chain(other.to_string()),
		}
	}
}

impl From<RoutingError> for TaskError {
	fn from(err: RoutingError) -> Self {
		match err {
			RoutingError::Slippage(msg) => TaskError::Slippage(msg),
			RoutingError::PollExhausted(msg) => TaskError::PollExhausted(msg),
			other => TaskError::Routing(other.to_string()),
		}
	}
}

impl From<VenueError> for TaskError {
	fn from(err: VenueError) -> Self {
		match err {
			VenueError::PollExhausted(msg) => TaskError::PollExhausted(msg),
			other => TaskError::Venue(other.to_string()),
		}
	}
}

/// Contract every concrete task type implements.
#[async_trait]
pub trait Task: Send + Sync {
	/// The immutable descriptor identifying this task.
	fn descriptor(&self) -> &TaskDescriptor;

	/// Display name for progress rendering. Falls back to a generic
	/// label when token metadata was not resolved at planning time.
	fn name(&self) -> String;

	/// Label of the current state, for progress events.
	fn state_label(&self) -> &'static str;

	/// Whether the task has reached its terminal completed state.
	fn completed(&self) -> bool;

	/// Advances the state machine by exactly one transition.
	///
	/// Fails with [`TaskError::AlreadyComplete`] when called after
	/// [`completed`](Task::completed) is true. Errors are never caught
	/// inside the task; they propagate to the driver.
	async fn step(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError>;

	/// Finalization hook invoked exactly once by the driver after the
	/// task completes or fails.
	async fn cleanup(
		&mut self,
		_ctx: &mut ExecutionContext,
		_success: bool,
	) -> Result<(), TaskError> {
		Ok(())
	}

	/// Block explorer link, once a transaction hash exists.
	fn explorer_link(&self) -> Option<String> {
		None
	}

	/// Planning-time hint whether this task is necessary at all.
	///
	/// Checks are read-only probes evaluated concurrently across the
	/// candidate list. A failed check must be treated by the planner as
	/// "needed": dropping a required prerequisite is more dangerous
	/// than running a redundant one.
	async fn is_needed(&self, _ctx: &ExecutionContext) -> Result<bool, TaskError> {
		Ok(true)
	}
}

/// Submits a prepared transaction on its chain, dispatching on the
/// chain's signing-path family: the session signer on the venue-native
/// chain, the connected wallet elsewhere.
pub(crate) async fn submit_prepared(
	ctx: &ExecutionContext,
	tx: &PreparedTransaction,
) -> Result<TransactionHash, TaskError> {
	let client = ctx.chains().client(tx.chain_id).await?;
	let hash = match client.family() {
		ChainFamily::VenueNative => client.sign_and_submit(tx).await?,
		ChainFamily::External => client.request_wallet_submit(tx).await?,
	};
	Ok(hash)
}
