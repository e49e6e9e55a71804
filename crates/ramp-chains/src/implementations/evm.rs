//! Alloy-based EVM chain client implementation.
//!
//! Uses the Alloy library for on-chain reads, transaction submission and
//! typed-data signing on EVM-compatible chains. A single instance serves
//! one chain; the [`ChainService`](crate::ChainService) builds and caches
//! one per configured chain.
//!
//! In this implementation both signing paths use the session signer: a
//! library host with a real browser wallet is expected to provide its own
//! [`ChainClient`](crate::ChainClient) for external chains.

use crate::{ChainClient, ChainError};
use alloy_dyn_abi::TypedData;
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_provider::{DynProvider, PendingTransactionConfig, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use ramp_config::ChainConfig;
use ramp_types::{ChainFamily, PreparedTransaction, TransactionHash, TransactionReceipt};
use std::time::Duration;

/// ERC-20 allowance(address,address) selector.
const ALLOWANCE_SELECTOR: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];
/// ERC-20 balanceOf(address) selector.
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Alloy-based EVM chain client.
pub struct AlloyChainClient {
	chain_id: u64,
	family: ChainFamily,
	provider: DynProvider,
	signer: PrivateKeySigner,
	explorer_url: Option<String>,
}

impl AlloyChainClient {
	/// Creates a new client for one chain.
	///
	/// Configures an Alloy provider over the chain's RPC URL with the
	/// given signer attached for transaction submission.
	pub fn new(
		chain_id: u64,
		config: &ChainConfig,
		signer: PrivateKeySigner,
	) -> Result<Self, ChainError> {
		let url = config.rpc_url.parse().map_err(|e| {
			ChainError::Network(format!("Invalid RPC URL for chain {}: {}", chain_id, e))
		})?;

		let chain_signer = signer.clone().with_chain_id(Some(chain_id));
		let wallet = EthereumWallet::from(chain_signer);

		let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);
		let provider = provider.erased();

		Ok(Self {
			chain_id,
			family: config.family,
			provider,
			signer,
			explorer_url: config.explorer_url.clone(),
		})
	}

	/// Executes a read-only contract call and decodes a single uint256.
	async fn call_uint(&self, to: Address, call_data: Vec<u8>) -> Result<U256, ChainError> {
		let request = TransactionRequest::default().to(to).input(call_data.into());

		let result = self
			.provider
			.call(request)
			.await
			.map_err(|e| ChainError::Network(format!("eth_call failed: {}", e)))?;

		if result.len() < 32 {
			return Err(ChainError::Network("Invalid uint256 response".to_string()));
		}
		Ok(U256::from_be_slice(&result[..32]))
	}

	/// Converts a prepared transaction into an Alloy request.
	fn to_request(&self, tx: &PreparedTransaction) -> TransactionRequest {
		TransactionRequest::default()
			.to(tx.to)
			.value(tx.value)
			.input(tx.data.clone().into())
	}

	async fn submit(&self, tx: &PreparedTransaction) -> Result<TransactionHash, ChainError> {
		let request = self.to_request(tx);
		tracing::debug!(
			chain_id = self.chain_id,
			to = %tx.to,
			data_len = tx.data.len(),
			"Sending transaction"
		);

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| ChainError::Network(format!("Failed to send transaction: {}", e)))?;

		Ok(TransactionHash(*pending.tx_hash()))
	}
}

#[async_trait]
impl ChainClient for AlloyChainClient {
	fn family(&self) -> ChainFamily {
		self.family
	}

	async fn allowance(
		&self,
		owner: Address,
		spender: Address,
		token: Address,
	) -> Result<U256, ChainError> {
		let mut call_data = Vec::with_capacity(4 + 64);
		call_data.extend_from_slice(&ALLOWANCE_SELECTOR);
		call_data.extend_from_slice(&[0; 12]);
		call_data.extend_from_slice(owner.as_slice());
		call_data.extend_from_slice(&[0; 12]);
		call_data.extend_from_slice(spender.as_slice());

		self.call_uint(token, call_data).await
	}

	async fn balance(&self, owner: Address, token: Option<Address>) -> Result<U256, ChainError> {
		match token {
			None => self
				.provider
				.get_balance(owner)
				.await
				.map_err(|e| ChainError::Network(format!("Failed to get balance: {}", e))),
			Some(token) => {
				let mut call_data = Vec::with_capacity(4 + 32);
				call_data.extend_from_slice(&BALANCE_OF_SELECTOR);
				call_data.extend_from_slice(&[0; 12]);
				call_data.extend_from_slice(owner.as_slice());

				self.call_uint(token, call_data).await
			},
		}
	}

	async fn sign_typed_data(&self, payload: &serde_json::Value) -> Result<Bytes, ChainError> {
		let typed_data: TypedData = serde_json::from_value(payload.clone())
			.map_err(|e| ChainError::Signing(format!("Invalid typed data document: {}", e)))?;

		let signature = self
			.signer
			.sign_dynamic_typed_data(&typed_data)
			.await
			.map_err(|e| ChainError::Signing(format!("Typed data signing failed: {}", e)))?;

		Ok(Bytes::from(signature.as_bytes().to_vec()))
	}

	async fn sign_and_submit(
		&self,
		tx: &PreparedTransaction,
	) -> Result<TransactionHash, ChainError> {
		self.submit(tx).await
	}

	async fn request_wallet_submit(
		&self,
		tx: &PreparedTransaction,
	) -> Result<TransactionHash, ChainError> {
		// With a local signer there is no wallet to switch; the submission
		// itself is identical to the venue-native path.
		tracing::debug!(chain_id = self.chain_id, "Wallet chain switch requested");
		self.submit(tx).await
	}

	async fn wait_for_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, ChainError> {
		let config = PendingTransactionConfig::new(FixedBytes::<32>::from(hash.0))
			.with_required_confirmations(1)
			.with_timeout(Some(Duration::from_secs(600)));

		let pending = self
			.provider
			.watch_pending_transaction(config)
			.await
			.map_err(|e| ChainError::Network(format!("Transaction watch failed: {}", e)))?;

		let confirmed = pending
			.await
			.map_err(|e| ChainError::Network(format!("Failed to confirm transaction: {}", e)))?;

		match self.provider.get_transaction_receipt(confirmed).await {
			Ok(Some(receipt)) => Ok(TransactionReceipt {
				hash: TransactionHash(receipt.transaction_hash),
				block_number: receipt.block_number.unwrap_or(0),
				success: receipt.status(),
			}),
			Ok(None) => Err(ChainError::Network(format!(
				"Transaction not found on chain {}",
				self.chain_id
			))),
			Err(e) => Err(ChainError::Network(format!(
				"Failed to get receipt on chain {}: {}",
				self.chain_id, e
			))),
		}
	}

	fn explorer_link(&self, hash: &TransactionHash) -> Option<String> {
		self.explorer_url
			.as_ref()
			.map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), hash))
	}
}
