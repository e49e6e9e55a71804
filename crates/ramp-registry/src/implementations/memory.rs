//! In-memory token registry implementation.
//!
//! Holds a static token list loaded at construction time. Suitable for
//! sessions where the token universe is known up front, and as the
//! backing registry in tests.

use crate::{RegistryError, TokenRegistry};
use alloy_primitives::Address;
use async_trait::async_trait;
use ramp_types::{AssetKey, TokenMetadata};
use std::collections::HashMap;

/// Token registry backed by an in-memory map.
#[derive(Default)]
pub struct MemoryRegistry {
	by_address: HashMap<AssetKey, TokenMetadata>,
}

impl MemoryRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a token to the registry, keyed by its chain and address.
	pub fn with_token(mut self, chain_id: u64, metadata: TokenMetadata) -> Self {
		self.by_address
			.insert(AssetKey::new(chain_id, metadata.address), metadata);
		self
	}
}

#[async_trait]
impl TokenRegistry for MemoryRegistry {
	async fn resolve_by_address(
		&self,
		address: Address,
		chain_id: u64,
	) -> Result<Option<TokenMetadata>, RegistryError> {
		Ok(self.by_address.get(&AssetKey::new(chain_id, address)).cloned())
	}

	async fn resolve_by_ticker(
		&self,
		ticker: &str,
		chain_id: u64,
	) -> Result<Option<TokenMetadata>, RegistryError> {
		Ok(self
			.by_address
			.iter()
			.find(|(key, metadata)| {
				key.chain_id == chain_id && metadata.ticker.eq_ignore_ascii_case(ticker)
			})
			.map(|(_, metadata)| metadata.clone()))
	}
}
