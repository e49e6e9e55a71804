//! Token registry module for the ramp system.
//!
//! The registry resolves a token identifier plus chain into metadata
//! (decimals, ticker, capability flags). It is consumed strictly
//! read-only: absence of a token is represented as `None`, never as an
//! error. Errors are reserved for transport failures in network-backed
//! registries.

use alloy_primitives::Address;
use async_trait::async_trait;
use ramp_types::TokenMetadata;
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
	/// Error that occurs during network communication with a remote
	/// registry backend.
	#[error("Network error: {0}")]
	Network(String),
}

/// Trait defining the interface for token registry implementations.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait TokenRegistry: Send + Sync {
	/// Resolves a token by contract address on a specific chain.
	async fn resolve_by_address(
		&self,
		address: Address,
		chain_id: u64,
	) -> Result<Option<TokenMetadata>, RegistryError>;

	/// Resolves a token by ticker on a specific chain.
	async fn resolve_by_ticker(
		&self,
		ticker: &str,
		chain_id: u64,
	) -> Result<Option<TokenMetadata>, RegistryError>;
}

/// Service wrapping a token registry implementation.
pub struct RegistryService {
	implementation: Arc<dyn TokenRegistry>,
}

impl RegistryService {
	/// Creates a new RegistryService with the specified implementation.
	pub fn new(implementation: Arc<dyn TokenRegistry>) -> Self {
		Self { implementation }
	}

	/// Resolves a token by contract address on a specific chain.
	pub async fn resolve_by_address(
		&self,
		address: Address,
		chain_id: u64,
	) -> Result<Option<TokenMetadata>, RegistryError> {
		self.implementation.resolve_by_address(address, chain_id).await
	}

	/// Resolves a token by ticker on a specific chain.
	pub async fn resolve_by_ticker(
		&self,
		ticker: &str,
		chain_id: u64,
	) -> Result<Option<TokenMetadata>, RegistryError> {
		self.implementation.resolve_by_ticker(ticker, chain_id).await
	}
}
