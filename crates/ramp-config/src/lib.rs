//! Configuration module for the ramp system.
//!
//! This module provides structures and utilities for managing ramp
//! configuration. It supports loading configuration from TOML files and
//! validates that all required values are properly set before any task
//! planning or execution begins.

use alloy_primitives::Address;
use ramp_types::ChainFamily;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the ramp system.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Session-level settings.
	#[serde(default)]
	pub session: SessionConfig,
	/// Routing-oracle settings.
	pub routing: RoutingConfig,
	/// Venue backend settings.
	pub venue: VenueConfig,
	/// Per-chain settings keyed by chain id.
	#[serde(deserialize_with = "deserialize_chains")]
	pub chains: HashMap<u64, ChainConfig>,
}

/// Session-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Capacity of the event broadcast channel.
	#[serde(default = "default_event_capacity")]
	pub event_capacity: usize,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			event_capacity: default_event_capacity(),
		}
	}
}

/// Routing-oracle settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoutingConfig {
	/// Base URL of the routing oracle API.
	pub base_url: String,
	/// Slippage tolerance in basis points applied to route requests.
	#[serde(default = "default_slippage_bps")]
	pub slippage_bps: u32,
	/// Interval between cross-chain status polls, in milliseconds.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Maximum number of status polls before giving up. `None` polls
	/// indefinitely.
	#[serde(default)]
	pub poll_attempts: Option<u32>,
}

/// Venue backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VenueConfig {
	/// Base URL of the venue backend API.
	pub base_url: String,
	/// Interval between venue task status polls, in milliseconds.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Maximum number of status polls before giving up. `None` polls
	/// indefinitely.
	#[serde(default)]
	pub poll_attempts: Option<u32>,
	/// Lifetime of permit signatures, in seconds.
	#[serde(default = "default_permit_ttl_secs")]
	pub permit_ttl_secs: u64,
}

/// Per-chain settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// Which signing path transactions on this chain take.
	pub family: ChainFamily,
	/// HTTP RPC URL for this chain.
	pub rpc_url: String,
	/// Contract the venue pulls deposited funds from, used as the approval
	/// and permit spender for deposits on this chain.
	#[serde(default)]
	pub venue_spender: Option<Address>,
	/// Base URL of the chain's block explorer, used for transaction links.
	#[serde(default)]
	pub explorer_url: Option<String>,
}

/// Returns the default event channel capacity.
fn default_event_capacity() -> usize {
	100
}

/// Returns the default slippage tolerance in basis points.
fn default_slippage_bps() -> u32 {
	50
}

/// Returns the default poll interval in milliseconds.
fn default_poll_interval_ms() -> u64 {
	3000
}

/// Returns the default permit lifetime in seconds.
fn default_permit_ttl_secs() -> u64 {
	3600
}

/// Deserializes the chains table, converting string keys to chain ids.
///
/// TOML table keys are always strings; this accepts `[chains.42161]`
/// sections and produces a numerically keyed map.
fn deserialize_chains<'de, D>(deserializer: D) -> Result<HashMap<u64, ChainConfig>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: HashMap<String, ChainConfig> = HashMap::deserialize(deserializer)?;
	raw.into_iter()
		.map(|(key, value)| {
			key.parse::<u64>()
				.map(|chain_id| (chain_id, value))
				.map_err(|_| serde::de::Error::custom(format!("invalid chain id key: {}", key)))
		})
		.collect()
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		contents.parse()
	}

	/// Validates cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.chains.is_empty() {
			return Err(ConfigError::Validation(
				"at least one chain must be configured".to_string(),
			));
		}
		if self.routing.base_url.is_empty() {
			return Err(ConfigError::Validation(
				"routing.base_url must not be empty".to_string(),
			));
		}
		if self.venue.base_url.is_empty() {
			return Err(ConfigError::Validation(
				"venue.base_url must not be empty".to_string(),
			));
		}
		Ok(())
	}

	/// The configuration for a chain, when present.
	pub fn chain(&self, chain_id: u64) -> Option<&ChainConfig> {
		self.chains.get(&chain_id)
	}

	/// The venue spender address for a chain, when configured.
	pub fn venue_spender(&self, chain_id: u64) -> Option<Address> {
		self.chains.get(&chain_id).and_then(|c| c.venue_spender)
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}
