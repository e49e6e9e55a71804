//! Routing oracle module for the ramp system.
//!
//! The routing oracle quotes multi-leg bridge/swap routes, populates
//! per-leg transactions and reports cross-chain execution status. This
//! module defines the oracle interface and a service layer adding
//! best-route selection and terminal-status polling on top of it.

use async_trait::async_trait;
use ramp_config::RoutingConfig;
use ramp_types::{PreparedTransaction, Route, RouteLeg, RouteRequest, RouteStatus, TransactionHash};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod lifi;
}

/// Errors that can occur during routing operations.
#[derive(Debug, Error)]
pub enum RoutingError {
	/// The oracle returned no routes for a request.
	#[error("No routes available")]
	NoRoutes,
	/// The oracle refused to populate a leg transaction because the quoted
	/// rate can no longer be met within the slippage tolerance.
	#[error("Slippage tolerance exceeded: {0}")]
	Slippage(String),
	/// The oracle reported a terminal failure for a submitted leg.
	#[error("Route leg failed with status {0}")]
	LegFailed(String),
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The status poller exhausted its attempt budget.
	#[error("Status polling exhausted: {0}")]
	PollExhausted(String),
}

/// Trait defining the interface for routing oracle implementations.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait RoutingOracle: Send + Sync {
	/// Requests routes for moving value as described by the request.
	/// Returns the oracle's candidates, best first. May be empty.
	async fn request_routes(&self, request: &RouteRequest) -> Result<Vec<Route>, RoutingError>;

	/// Populates a ready-to-submit transaction for one leg.
	async fn transaction_for(&self, leg: &RouteLeg) -> Result<PreparedTransaction, RoutingError>;

	/// Reports the current cross-chain status of a submitted leg.
	async fn poll_status(
		&self,
		tx_hash: &TransactionHash,
		from_chain: u64,
		to_chain: u64,
	) -> Result<RouteStatus, RoutingError>;
}

/// Service wrapping a routing oracle implementation.
///
/// Adds best-route selection and a fixed-interval terminal-status poller,
/// bounded by the configured attempt budget or unbounded when none is set.
pub struct RoutingService {
	implementation: Arc<dyn RoutingOracle>,
	config: RoutingConfig,
}

impl RoutingService {
	/// Creates a new RoutingService with the specified implementation.
	pub fn new(implementation: Arc<dyn RoutingOracle>, config: RoutingConfig) -> Self {
		Self {
			implementation,
			config,
		}
	}

	/// Requests routes and returns the oracle's best candidate.
	///
	/// Fails with [`RoutingError::NoRoutes`] when the oracle returns an
	/// empty set; planning cannot proceed without a route.
	pub async fn best_route(&self, request: &RouteRequest) -> Result<Route, RoutingError> {
		let mut routes = self.implementation.request_routes(request).await?;
		if routes.is_empty() {
			return Err(RoutingError::NoRoutes);
		}
		Ok(routes.remove(0))
	}

	/// Populates a ready-to-submit transaction for one leg.
	pub async fn transaction_for(
		&self,
		leg: &RouteLeg,
	) -> Result<PreparedTransaction, RoutingError> {
		self.implementation.transaction_for(leg).await
	}

	/// Polls a submitted leg until it reaches a terminal status.
	///
	/// `Done` is returned to the caller; `Failed` and `Invalid` become
	/// [`RoutingError::LegFailed`]. With a configured attempt budget,
	/// exhaustion surfaces the last observed poll error when there was
	/// one, otherwise a generic exhaustion error.
	pub async fn poll_until_terminal(
		&self,
		tx_hash: &TransactionHash,
		from_chain: u64,
		to_chain: u64,
	) -> Result<RouteStatus, RoutingError> {
		let interval = Duration::from_millis(self.config.poll_interval_ms);
		let mut attempts: u32 = 0;
		let mut last_error: Option<RoutingError> = None;

		loop {
			if let Some(max) = self.config.poll_attempts {
				if attempts >= max {
					return Err(last_error.unwrap_or_else(|| {
						RoutingError::PollExhausted(format!(
							"no terminal status for {} after {} polls",
							tx_hash, max
						))
					}));
				}
			}
			attempts += 1;

			match self
				.implementation
				.poll_status(tx_hash, from_chain, to_chain)
				.await
			{
				Ok(status) if status.is_terminal() => match status {
					RouteStatus::Done { .. } => return Ok(status),
					RouteStatus::Failed => {
						return Err(RoutingError::LegFailed("FAILED".to_string()))
					},
					RouteStatus::Invalid => {
						return Err(RoutingError::LegFailed("INVALID".to_string()))
					},
					RouteStatus::Pending => unreachable!("pending is not terminal"),
				},
				Ok(_) => {
					tracing::debug!(tx_hash = %tx_hash, attempts, "Leg still pending");
				},
				Err(e) => {
					// Transient poll failures are retried until the budget runs out.
					tracing::debug!(tx_hash = %tx_hash, error = %e, "Status poll failed");
					last_error = Some(e);
				},
			}

			tokio::time::sleep(interval).await;
		}
	}

}
