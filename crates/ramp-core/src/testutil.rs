//! Shared test doubles for the executor tests.
//!
//! Provides stub implementations of the collaborator traits with
//! scriptable behavior and recorded calls, plus a context builder that
//! wires them into an [`ExecutionContext`] over a minimal two-chain
//! configuration.

use crate::context::ExecutionContext;
use crate::tasks::{Task, TaskError};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use ramp_chains::{ChainClient, ChainClientFactory, ChainError, ChainService};
use ramp_config::{ChainConfig, Config, RoutingConfig, SessionConfig, VenueConfig};
use ramp_registry::{implementations::memory::MemoryRegistry, RegistryService, TokenRegistry};
use ramp_routing::{RoutingError, RoutingOracle, RoutingService};
use ramp_types::{
	BalanceSnapshot, ChainFamily, PermitSeal, PreparedTransaction, Route, RouteLeg, RouteRequest,
	RouteStatus, SubmitResponse, TaskDescriptor, TaskParams, TokenMetadata, TransactionHash,
	TransactionReceipt, VenueTaskId, VenueTaskState,
};
use ramp_venue::{VenueApi, VenueError, VenueService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Chain id of the stub venue-native chain.
pub const VENUE_CHAIN: u64 = 42161;
/// Chain id of the stub external chain.
pub const EXTERNAL_CHAIN: u64 = 1;

pub fn user() -> Address {
	Address::from([0x11; 20])
}

pub fn venue_spender() -> Address {
	Address::from([0xcc; 20])
}

pub fn token_a() -> Address {
	Address::from([0xaa; 20])
}

pub fn token_b() -> Address {
	Address::from([0xbb; 20])
}

pub fn permit_seal() -> PermitSeal {
	PermitSeal {
		nonce: U256::from(1u64),
		deadline: 1_900_000_000,
		signature: Bytes::from(vec![0xab; 65]),
	}
}

/// Scripted behavior for the stub collaborators.
pub struct Stubs {
	/// Wallet balance returned for every chain balance read.
	pub wallet_balance: U256,
	/// Allowance returned for every allowance read.
	pub allowance: U256,
	/// Venue fee balance.
	pub fee_balance: U256,
	/// Makes fee balance reads fail.
	pub fee_balance_fails: bool,
	/// Success flag on transaction receipts.
	pub receipt_success: bool,
	/// Makes transaction submissions fail.
	pub fail_submit: bool,
	/// Routes returned for every route request.
	pub routes: Vec<Route>,
	/// Leg statuses returned by successive oracle polls; once drained,
	/// `Done` with `received` 0 is returned.
	pub statuses: Vec<RouteStatus>,
	/// Makes leg transaction population fail with a slippage error.
	pub slippage_on_transaction: bool,
	/// Venue task states returned by successive venue polls; once
	/// drained, `Completed` is returned.
	pub venue_statuses: Vec<VenueTaskState>,
	/// Makes fee payments settle synchronously (no task id).
	pub synchronous_fee: bool,
	/// Registry contents as (chain id, metadata) pairs.
	pub tokens: Vec<(u64, TokenMetadata)>,
}

impl Default for Stubs {
	fn default() -> Self {
		Self {
			wallet_balance: U256::ZERO,
			allowance: U256::ZERO,
			fee_balance: U256::ZERO,
			fee_balance_fails: false,
			receipt_success: true,
			fail_submit: false,
			routes: Vec::new(),
			statuses: Vec::new(),
			slippage_on_transaction: false,
			venue_statuses: Vec::new(),
			synchronous_fee: false,
			tokens: Vec::new(),
		}
	}
}

/// Mutable state shared by every stub chain client the factory builds.
pub struct ChainState {
	pub allowance: Mutex<U256>,
	pub balance: U256,
	pub receipt_success: bool,
	pub fail_submit: bool,
	/// Submitted transactions, with the family they were submitted under.
	pub submissions: Mutex<Vec<(ChainFamily, PreparedTransaction)>>,
	counter: AtomicU64,
}

struct StubChainClient {
	family: ChainFamily,
	state: Arc<ChainState>,
}

impl StubChainClient {
	fn submit(&self, tx: &PreparedTransaction) -> Result<TransactionHash, ChainError> {
		if self.state.fail_submit {
			return Err(ChainError::Network("submission refused".to_string()));
		}
		self.state
			.submissions
			.lock()
			.unwrap()
			.push((self.family, tx.clone()));
		let n = self.state.counter.fetch_add(1, Ordering::SeqCst) + 1;
		let mut raw = [0u8; 32];
		raw[24..].copy_from_slice(&n.to_be_bytes());
		Ok(TransactionHash(B256::from(raw)))
	}
}

#[async_trait]
impl ChainClient for StubChainClient {
	fn family(&self) -> ChainFamily {
		self.family
	}

	async fn allowance(
		&self,
		_owner: Address,
		_spender: Address,
		_token: Address,
	) -> Result<U256, ChainError> {
		Ok(*self.state.allowance.lock().unwrap())
	}

	async fn balance(&self, _owner: Address, _token: Option<Address>) -> Result<U256, ChainError> {
		Ok(self.state.balance)
	}

	async fn sign_typed_data(&self, _payload: &serde_json::Value) -> Result<Bytes, ChainError> {
		Ok(Bytes::from(vec![0x5e; 65]))
	}

	async fn sign_and_submit(
		&self,
		tx: &PreparedTransaction,
	) -> Result<TransactionHash, ChainError> {
		self.submit(tx)
	}

	async fn request_wallet_submit(
		&self,
		tx: &PreparedTransaction,
	) -> Result<TransactionHash, ChainError> {
		self.submit(tx)
	}

	async fn wait_for_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, ChainError> {
		Ok(TransactionReceipt {
			hash: *hash,
			block_number: 1,
			success: self.state.receipt_success,
		})
	}

	fn explorer_link(&self, hash: &TransactionHash) -> Option<String> {
		Some(format!("https://scan.example/tx/{}", hash))
	}
}

/// Stub routing oracle recording requests and replaying scripted routes
/// and poll statuses.
pub struct StubOracle {
	pub routes: Vec<Route>,
	pub requests: Mutex<Vec<RouteRequest>>,
	pub slippage_on_transaction: bool,
	pub statuses: Mutex<Vec<RouteStatus>>,
}

#[async_trait]
impl RoutingOracle for StubOracle {
	async fn request_routes(&self, request: &RouteRequest) -> Result<Vec<Route>, RoutingError> {
		self.requests.lock().unwrap().push(request.clone());
		Ok(self.routes.clone())
	}

	async fn transaction_for(&self, leg: &RouteLeg) -> Result<PreparedTransaction, RoutingError> {
		if self.slippage_on_transaction {
			return Err(RoutingError::Slippage("rate moved beyond tolerance".to_string()));
		}
		Ok(PreparedTransaction {
			chain_id: leg.from_chain,
			to: Address::from([0xdd; 20]),
			data: Bytes::from(vec![0x01]),
			value: U256::ZERO,
		})
	}

	async fn poll_status(
		&self,
		_tx_hash: &TransactionHash,
		_from_chain: u64,
		_to_chain: u64,
	) -> Result<RouteStatus, RoutingError> {
		let mut statuses = self.statuses.lock().unwrap();
		if statuses.is_empty() {
			Ok(RouteStatus::Done {
				received: U256::ZERO,
			})
		} else {
			Ok(statuses.remove(0))
		}
	}
}

/// Stub venue recording submissions and replaying scripted task states.
pub struct StubVenue {
	pub fee_balance: U256,
	pub fee_balance_fails: bool,
	pub synchronous_fee: bool,
	pub deposits: Mutex<Vec<(u64, Address, U256)>>,
	pub withdrawals: Mutex<Vec<(u64, Address, U256)>>,
	pub fee_payments: Mutex<Vec<u64>>,
	pub statuses: Mutex<Vec<VenueTaskState>>,
}

#[async_trait]
impl VenueApi for StubVenue {
	async fn submit_deposit(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
		_permit: &PermitSeal,
	) -> Result<SubmitResponse, VenueError> {
		self.deposits.lock().unwrap().push((chain_id, token, amount));
		Ok(SubmitResponse {
			task_id: Some(VenueTaskId("deposit-task".to_string())),
		})
	}

	async fn submit_withdrawal(
		&self,
		chain_id: u64,
		token: Address,
		amount: U256,
	) -> Result<SubmitResponse, VenueError> {
		self.withdrawals
			.lock()
			.unwrap()
			.push((chain_id, token, amount));
		Ok(SubmitResponse {
			task_id: Some(VenueTaskId("withdraw-task".to_string())),
		})
	}

	async fn submit_fee_payment(&self, chain_id: u64) -> Result<SubmitResponse, VenueError> {
		self.fee_payments.lock().unwrap().push(chain_id);
		Ok(SubmitResponse {
			task_id: (!self.synchronous_fee).then(|| VenueTaskId("fee-task".to_string())),
		})
	}

	async fn task_status(&self, _task_id: &VenueTaskId) -> Result<VenueTaskState, VenueError> {
		let mut statuses = self.statuses.lock().unwrap();
		if statuses.is_empty() {
			Ok(VenueTaskState::Completed)
		} else {
			Ok(statuses.remove(0))
		}
	}

	async fn balance_snapshot(&self, _owner: Address) -> Result<BalanceSnapshot, VenueError> {
		Ok(BalanceSnapshot::new())
	}

	async fn fee_balance(&self, _owner: Address) -> Result<U256, VenueError> {
		if self.fee_balance_fails {
			return Err(VenueError::Network("fee balance unavailable".to_string()));
		}
		Ok(self.fee_balance)
	}
}

/// Handles into the stubs backing a test context, for assertions.
pub struct Handles {
	pub chain: Arc<ChainState>,
	pub oracle: Arc<StubOracle>,
	pub venue: Arc<StubVenue>,
}

fn test_config() -> Config {
	let mut chains = HashMap::new();
	chains.insert(
		VENUE_CHAIN,
		ChainConfig {
			family: ChainFamily::VenueNative,
			rpc_url: "http://localhost:8545".to_string(),
			venue_spender: Some(venue_spender()),
			explorer_url: None,
		},
	);
	chains.insert(
		EXTERNAL_CHAIN,
		ChainConfig {
			family: ChainFamily::External,
			rpc_url: "http://localhost:8546".to_string(),
			venue_spender: None,
			explorer_url: None,
		},
	);
	Config {
		session: SessionConfig { event_capacity: 64 },
		routing: RoutingConfig {
			base_url: "http://localhost:9000".to_string(),
			slippage_bps: 50,
			poll_interval_ms: 1,
			poll_attempts: Some(10),
		},
		venue: VenueConfig {
			base_url: "http://localhost:9001".to_string(),
			poll_interval_ms: 1,
			poll_attempts: Some(10),
			permit_ttl_secs: 3600,
		},
		chains,
	}
}

/// Builds a context over the scripted stubs.
pub fn context(stubs: Stubs) -> ExecutionContext {
	context_with_handles(stubs).0
}

/// Builds a context over the scripted stubs, returning handles for
/// post-run assertions.
pub fn context_with_handles(stubs: Stubs) -> (ExecutionContext, Handles) {
	let mut memory = MemoryRegistry::new();
	for (chain_id, metadata) in &stubs.tokens {
		memory = memory.with_token(*chain_id, metadata.clone());
	}
	context_with_registry(stubs, Arc::new(memory))
}

/// Builds a context with a caller-supplied registry implementation in
/// place of the in-memory one.
pub fn context_with_registry(
	stubs: Stubs,
	registry_impl: Arc<dyn TokenRegistry>,
) -> (ExecutionContext, Handles) {
	let config = test_config();

	let chain_state = Arc::new(ChainState {
		allowance: Mutex::new(stubs.allowance),
		balance: stubs.wallet_balance,
		receipt_success: stubs.receipt_success,
		fail_submit: stubs.fail_submit,
		submissions: Mutex::new(Vec::new()),
		counter: AtomicU64::new(0),
	});
	let factory_state = chain_state.clone();
	let factory: ChainClientFactory = Box::new(move |_, chain_config| {
		Ok(Arc::new(StubChainClient {
			family: chain_config.family,
			state: factory_state.clone(),
		}))
	});
	let chains = Arc::new(ChainService::new(config.chains.clone(), factory));

	let registry = Arc::new(RegistryService::new(registry_impl));

	let oracle = Arc::new(StubOracle {
		routes: stubs.routes,
		requests: Mutex::new(Vec::new()),
		slippage_on_transaction: stubs.slippage_on_transaction,
		statuses: Mutex::new(stubs.statuses),
	});
	let routing = Arc::new(RoutingService::new(
		oracle.clone(),
		config.routing.clone(),
	));

	let venue = Arc::new(StubVenue {
		fee_balance: stubs.fee_balance,
		fee_balance_fails: stubs.fee_balance_fails,
		synchronous_fee: stubs.synchronous_fee,
		deposits: Mutex::new(Vec::new()),
		withdrawals: Mutex::new(Vec::new()),
		fee_payments: Mutex::new(Vec::new()),
		statuses: Mutex::new(stubs.venue_statuses),
	});
	let venue_service = Arc::new(VenueService::new(venue.clone(), config.venue.clone()));

	let ctx = ExecutionContext::new(
		user(),
		config,
		chains,
		registry,
		routing,
		venue_service,
	);
	let handles = Handles {
		chain: chain_state,
		oracle,
		venue,
	};
	(ctx, handles)
}

/// Scripted task advancing a fixed number of steps, optionally failing
/// at one of them. Records its steps and finalization outcome through
/// shared handles so tests can assert on them after the queue owns the
/// task.
pub struct CountingTask {
	descriptor: TaskDescriptor,
	steps_total: u32,
	steps_done: u32,
	fail_at: Option<u32>,
	pub steps: Arc<Mutex<Vec<u32>>>,
	pub cleaned: Arc<Mutex<Option<bool>>>,
}

impl CountingTask {
	pub fn new(steps_total: u32, fail_at: Option<u32>) -> Self {
		Self {
			descriptor: TaskDescriptor::new(TaskParams::PayFees {
				chain_id: VENUE_CHAIN,
			}),
			steps_total,
			steps_done: 0,
			fail_at,
			steps: Arc::new(Mutex::new(Vec::new())),
			cleaned: Arc::new(Mutex::new(None)),
		}
	}
}

#[async_trait]
impl Task for CountingTask {
	fn descriptor(&self) -> &TaskDescriptor {
		&self.descriptor
	}

	fn name(&self) -> String {
		"Counting".to_string()
	}

	fn state_label(&self) -> &'static str {
		if self.completed() {
			"Completed"
		} else {
			"Pending"
		}
	}

	fn completed(&self) -> bool {
		self.steps_done >= self.steps_total
	}

	async fn step(&mut self, _ctx: &mut ExecutionContext) -> Result<(), TaskError> {
		if self.completed() {
			return Err(TaskError::AlreadyComplete);
		}
		if self.fail_at == Some(self.steps_done) {
			return Err(TaskError::Venue("scripted failure".to_string()));
		}
		self.steps_done += 1;
		self.steps.lock().unwrap().push(self.steps_done);
		Ok(())
	}

	async fn cleanup(
		&mut self,
		_ctx: &mut ExecutionContext,
		success: bool,
	) -> Result<(), TaskError> {
		*self.cleaned.lock().unwrap() = Some(success);
		Ok(())
	}
}

/// A route with one swap leg on the venue chain from token B to token A.
pub fn swap_route(amount: U256, estimate: U256) -> Route {
	Route {
		id: "route-1".to_string(),
		legs: vec![RouteLeg {
			id: "leg-1".to_string(),
			tool: "stubswap".to_string(),
			from_chain: VENUE_CHAIN,
			to_chain: VENUE_CHAIN,
			from_token: token_b(),
			to_token: token_a(),
			from_amount: amount,
			to_amount_estimate: estimate,
			approval_spender: Some(Address::from([0xee; 20])),
		}],
	}
}

/// A route with one bridge leg from the external chain to the venue
/// chain, carrying token A on both sides.
pub fn bridge_route(amount: U256) -> Route {
	Route {
		id: "route-1".to_string(),
		legs: vec![RouteLeg {
			id: "leg-1".to_string(),
			tool: "stubbridge".to_string(),
			from_chain: EXTERNAL_CHAIN,
			to_chain: VENUE_CHAIN,
			from_token: token_a(),
			to_token: token_a(),
			from_amount: amount,
			to_amount_estimate: amount,
			approval_spender: Some(Address::from([0xee; 20])),
		}],
	}
}
