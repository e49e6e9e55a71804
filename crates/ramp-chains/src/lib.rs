//! Chain client module for the ramp system.
//!
//! This module handles on-chain reads and transaction submission across
//! the supported chains. It provides an abstraction over chain-specific
//! signing paths: transactions on the venue's native chain are signed with
//! the session signer, while transactions on external chains go through
//! the connected wallet after a chain-switch request.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use ramp_config::ChainConfig;
use ramp_types::{ChainFamily, PreparedTransaction, TransactionHash, TransactionReceipt};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Re-export implementations
pub mod implementations {
	pub mod evm;
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs while signing a transaction or typed data.
	#[error("Signing error: {0}")]
	Signing(String),
	/// Error that occurs when a submitted transaction reverts.
	#[error("Transaction failed: {0}")]
	TransactionFailed(String),
	/// Error that occurs when no client is configured for a chain.
	#[error("No client configured for chain {0}")]
	NoClientForChain(u64),
}

/// Trait defining the interface for per-chain client implementations.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ChainClient: Send + Sync {
	/// The signing-path family of this chain.
	fn family(&self) -> ChainFamily;

	/// Reads the ERC-20 allowance granted by `owner` to `spender`.
	async fn allowance(
		&self,
		owner: Address,
		spender: Address,
		token: Address,
	) -> Result<U256, ChainError>;

	/// Reads the balance of `owner`. `None` reads the native balance,
	/// `Some(address)` reads the ERC-20 balance.
	async fn balance(&self, owner: Address, token: Option<Address>) -> Result<U256, ChainError>;

	/// Requests an EIP-712 signature over the given typed-data document.
	async fn sign_typed_data(&self, payload: &serde_json::Value) -> Result<Bytes, ChainError>;

	/// Signs and submits a transaction with the session signer. This is
	/// the venue-native chain family path.
	async fn sign_and_submit(&self, tx: &PreparedTransaction)
		-> Result<TransactionHash, ChainError>;

	/// Submits a transaction through the connected wallet, requesting a
	/// chain switch first. This is the external chain family path.
	async fn request_wallet_submit(
		&self,
		tx: &PreparedTransaction,
	) -> Result<TransactionHash, ChainError>;

	/// Waits for a submitted transaction to be included and returns its
	/// receipt.
	async fn wait_for_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, ChainError>;

	/// Block explorer link for a transaction, when an explorer is
	/// configured for this chain.
	fn explorer_link(&self, hash: &TransactionHash) -> Option<String>;
}

/// Factory producing a chain client for a chain id and its configuration.
pub type ChainClientFactory =
	Box<dyn Fn(u64, &ChainConfig) -> Result<Arc<dyn ChainClient>, ChainError> + Send + Sync>;

/// Service managing chain clients across the configured chains.
///
/// Clients are built lazily on first use and cached for the lifetime of
/// the service, which is scoped to one planning and execution session.
pub struct ChainService {
	chains: HashMap<u64, ChainConfig>,
	factory: ChainClientFactory,
	clients: RwLock<HashMap<u64, Arc<dyn ChainClient>>>,
}

impl ChainService {
	/// Creates a new ChainService over the configured chains.
	pub fn new(chains: HashMap<u64, ChainConfig>, factory: ChainClientFactory) -> Self {
		Self {
			chains,
			factory,
			clients: RwLock::new(HashMap::new()),
		}
	}

	/// The client for a chain, building and caching it on first use.
	pub async fn client(&self, chain_id: u64) -> Result<Arc<dyn ChainClient>, ChainError> {
		if let Some(client) = self.clients.read().await.get(&chain_id) {
			return Ok(client.clone());
		}

		let config = self
			.chains
			.get(&chain_id)
			.ok_or(ChainError::NoClientForChain(chain_id))?;
		let client = (self.factory)(chain_id, config)?;

		let mut clients = self.clients.write().await;
		// Another caller may have raced us here; keep whichever landed first.
		Ok(clients.entry(chain_id).or_insert(client).clone())
	}

	/// Reads an ERC-20 allowance on a specific chain.
	pub async fn allowance(
		&self,
		chain_id: u64,
		owner: Address,
		spender: Address,
		token: Address,
	) -> Result<U256, ChainError> {
		self.client(chain_id)
			.await?
			.allowance(owner, spender, token)
			.await
	}

	/// Reads a balance on a specific chain.
	pub async fn balance(
		&self,
		chain_id: u64,
		owner: Address,
		token: Option<Address>,
	) -> Result<U256, ChainError> {
		self.client(chain_id).await?.balance(owner, token).await
	}
}
