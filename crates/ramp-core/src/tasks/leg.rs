//! Route leg task.
//!
//! Executes one atomic step of a bridge/swap route: fetches the
//! populated transaction from the routing oracle, submits it on the
//! leg's source chain through the family-appropriate signing path, then
//! polls the oracle's cross-chain status until terminal. The final leg
//! of a route records the actually-received output amount into the
//! context's route-output accumulator for downstream tasks.

use crate::context::ExecutionContext;
use crate::tasks::{submit_prepared, Task, TaskError};
use async_trait::async_trait;
use ramp_types::{
	AssetKey, PreparedTransaction, RouteLeg, RouteStatus, TaskDescriptor, TaskParams,
	TokenMetadata, TransactionHash,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegState {
	Pending,
	AwaitingWallet,
	Submitted,
	Completed,
}

/// Task executing one leg of a bridge/swap route.
pub struct RouteLegTask {
	descriptor: TaskDescriptor,
	leg: RouteLeg,
	final_leg: bool,
	metadata: Option<TokenMetadata>,
	state: LegState,
	prepared: Option<PreparedTransaction>,
	tx_hash: Option<TransactionHash>,
	explorer: Option<String>,
}

impl RouteLegTask {
	/// Creates a pending leg task. `final_leg` marks the leg responsible
	/// for recording the route's received output.
	pub fn new(leg: RouteLeg, final_leg: bool, metadata: Option<TokenMetadata>) -> Self {
		Self {
			descriptor: TaskDescriptor::new(TaskParams::RouteLeg {
				leg: leg.clone(),
				final_leg,
			}),
			leg,
			final_leg,
			metadata,
			state: LegState::Pending,
			prepared: None,
			tx_hash: None,
			explorer: None,
		}
	}

	fn is_bridge(&self) -> bool {
		self.leg.from_chain != self.leg.to_chain
	}
}

#[async_trait]
impl Task for RouteLegTask {
	fn descriptor(&self) -> &TaskDescriptor {
		&self.descriptor
	}

	fn name(&self) -> String {
		let verb = if self.is_bridge() { "Bridge" } else { "Swap" };
		match &self.metadata {
			Some(metadata) => format!("{} {} via {}", verb, metadata.ticker, self.leg.tool),
			None => format!("{} via {}", verb, self.leg.tool),
		}
	}

	fn state_label(&self) -> &'static str {
		match self.state {
			LegState::Pending => "Pending",
			LegState::AwaitingWallet => "AwaitingWallet",
			LegState::Submitted => "Submitted",
			LegState::Completed => "Completed",
		}
	}

	fn completed(&self) -> bool {
		self.state == LegState::Completed
	}

	async fn step(&mut self, ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		match self.state {
			LegState::Pending => {
				// A slippage refusal here is fatal; the quote must be redone.
				let tx = ctx.routing().transaction_for(&self.leg).await?;
				self.prepared = Some(tx);
				self.state = LegState::AwaitingWallet;
				Ok(())
			},
			LegState::AwaitingWallet => {
				let tx = self.prepared.as_ref().ok_or_else(|| {
					TaskError::Precondition("leg transaction missing".to_string())
				})?;
				let hash = submit_prepared(ctx, tx).await?;
				tracing::info!(leg = %self.leg.id, tool = %self.leg.tool, tx_hash = %hash, "Leg submitted");
				self.explorer = ctx.chains().client(tx.chain_id).await?.explorer_link(&hash);
				self.tx_hash = Some(hash);
				self.state = LegState::Submitted;
				Ok(())
			},
			LegState::Submitted => {
				let hash = self.tx_hash.ok_or_else(|| {
					TaskError::Precondition("leg transaction hash missing".to_string())
				})?;
				let status = ctx
					.routing()
					.poll_until_terminal(&hash, self.leg.from_chain, self.leg.to_chain)
					.await?;
				if self.final_leg {
					if let RouteStatus::Done { received } = status {
						let key = AssetKey::new(self.leg.to_chain, self.leg.to_token);
						ctx.record_route_output(key, received);
						tracing::info!(leg = %self.leg.id, received = %received, "Route output recorded");
					}
				}
				self.state = LegState::Completed;
				Ok(())
			},
			LegState::Completed => Err(TaskError::AlreadyComplete),
		}
	}

	fn explorer_link(&self) -> Option<String> {
		self.explorer.clone()
	}
}
