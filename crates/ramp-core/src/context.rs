//! Shared mutable state for one planning and execution cycle.
//!
//! The execution context bundles the session credentials, the
//! collaborator services and the cross-task state written and read by
//! the task state machines: the write-once permit slot, the wallet
//! balance snapshot captured before planning, and the route-output
//! accumulator filled in by completed route legs.
//!
//! The context is not thread-safe and must not be: the queue runs one
//! task at a time and hands each a `&mut` borrow. A fresh context must
//! be constructed for every planning cycle; permit and route-output
//! state from a previous cycle is stale and must never leak forward.

use alloy_primitives::{Address, U256};
use ramp_chains::{ChainError, ChainService};
use ramp_config::Config;
use ramp_registry::RegistryService;
use ramp_routing::RoutingService;
use ramp_types::{AssetKey, BalanceSnapshot, PermitSeal};
use ramp_venue::VenueService;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by context state transitions.
#[derive(Debug, Error)]
pub enum ContextError {
	/// The permit slot was written twice within one cycle.
	#[error("Permit slot already populated")]
	PermitAlreadySet,
}

/// Session-scoped bundle of credentials, services and cross-task state.
pub struct ExecutionContext {
	user: Address,
	config: Config,
	chains: Arc<ChainService>,
	registry: Arc<RegistryService>,
	routing: Arc<RoutingService>,
	venue: Arc<VenueService>,
	permit: Option<PermitSeal>,
	balances: BalanceSnapshot,
	route_outputs: HashMap<AssetKey, U256>,
}

impl ExecutionContext {
	/// Creates a fresh context for one planning and execution cycle.
	pub fn new(
		user: Address,
		config: Config,
		chains: Arc<ChainService>,
		registry: Arc<RegistryService>,
		routing: Arc<RoutingService>,
		venue: Arc<VenueService>,
	) -> Self {
		Self {
			user,
			config,
			chains,
			registry,
			routing,
			venue,
			permit: None,
			balances: BalanceSnapshot::new(),
			route_outputs: HashMap::new(),
		}
	}

	/// The user's wallet address.
	pub fn user(&self) -> Address {
		self.user
	}

	/// The session configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// The chain client service.
	pub fn chains(&self) -> &ChainService {
		&self.chains
	}

	/// The token registry service.
	pub fn registry(&self) -> &RegistryService {
		&self.registry
	}

	/// The routing oracle service.
	pub fn routing(&self) -> &RoutingService {
		&self.routing
	}

	/// The venue backend service.
	pub fn venue(&self) -> &VenueService {
		&self.venue
	}

	/// Writes the permit slot. The slot is write-once within a cycle;
	/// a second write is a caller bug and fails.
	pub fn set_permit(&mut self, permit: PermitSeal) -> Result<(), ContextError> {
		if self.permit.is_some() {
			return Err(ContextError::PermitAlreadySet);
		}
		self.permit = Some(permit);
		Ok(())
	}

	/// The pending permit signature, when one has been produced.
	pub fn permit(&self) -> Option<&PermitSeal> {
		self.permit.as_ref()
	}

	/// Captures the wallet balances for the given assets into the
	/// snapshot, replacing any previous entries. A zero token address
	/// reads the native balance.
	pub async fn capture_balances(&mut self, assets: &[AssetKey]) -> Result<(), ChainError> {
		for key in assets {
			let token = (key.token != Address::ZERO).then_some(key.token);
			let amount = self.chains.balance(key.chain_id, self.user, token).await?;
			self.balances.set(*key, amount);
		}
		Ok(())
	}

	/// The snapshotted wallet balance for an asset, zero when never
	/// captured.
	pub fn balance_for(&self, key: &AssetKey) -> U256 {
		self.balances.amount_for(key)
	}

	/// Records the actually-received output of a completed route leg,
	/// accumulating across legs that land on the same asset.
	pub fn record_route_output(&mut self, key: AssetKey, amount: U256) {
		let entry = self.route_outputs.entry(key).or_insert(U256::ZERO);
		*entry = entry.saturating_add(amount);
	}

	/// The accumulated route output for an asset, when any leg has
	/// recorded one.
	pub fn route_output_for(&self, key: &AssetKey) -> Option<U256> {
		self.route_outputs.get(key).copied()
	}

	/// Resolves the amount a downstream task should act on.
	///
	/// When a route leg has recorded output for the asset, the snapshot
	/// balance plus the accumulated output reflects what actually
	/// arrived; otherwise the originally planned amount stands.
	pub fn finalized_amount(&self, key: &AssetKey, planned: U256) -> U256 {
		match self.route_output_for(key) {
			Some(output) => self.balances.amount_for(key).saturating_add(output),
			None => planned,
		}
	}
}
