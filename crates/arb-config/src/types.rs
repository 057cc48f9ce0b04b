//! Configuration types for the arbitrage bot.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Complete bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArbConfig {
	/// Loop identity and trading parameters
	#[serde(default)]
	pub arbitrage: ArbitrageConfig,
	/// Signing credential
	pub account: AccountConfig,
	/// RPC endpoint and matching contract
	pub chain: ChainConfig,
	/// Listing feed
	pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArbitrageConfig {
	/// Name used in logs
	#[serde(default = "default_name")]
	pub name: String,
	/// Sleep between poll cycles
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Third argument of the matching call, as a decimal integer string.
	/// Zero lets the contract pick the execution price.
	#[serde(default = "default_price_override")]
	pub price_override: String,
}

impl Default for ArbitrageConfig {
	fn default() -> Self {
		Self {
			name: default_name(),
			poll_interval_ms: default_poll_interval_ms(),
			price_override: default_price_override(),
		}
	}
}

impl ArbitrageConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

#[derive(Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex-encoded private key, usually `${ARB_PRIVATE_KEY}`
	pub private_key: String,
}

impl fmt::Debug for AccountConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AccountConfig")
			.field("private_key", &"<redacted>")
			.finish()
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// HTTP(S) JSON-RPC endpoint
	pub rpc_url: String,
	/// Deployed order-matching contract
	pub contract_address: Address,
	/// Expected chain id; checked against the endpoint at startup when set
	pub chain_id: Option<u64>,
	#[serde(default = "default_confirmation_timeout_secs")]
	pub confirmation_timeout_secs: u64,
	#[serde(default = "default_receipt_poll_interval_ms")]
	pub receipt_poll_interval_ms: u64,
}

impl ChainConfig {
	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_secs(self.confirmation_timeout_secs)
	}

	pub fn receipt_poll_interval(&self) -> Duration {
		Duration::from_millis(self.receipt_poll_interval_ms)
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
	/// Items endpoint of the marketplace API
	pub url: String,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	#[serde(default = "default_page_num")]
	pub page_num: u32,
	#[serde(default = "default_order_by")]
	pub order_by: String,
	#[serde(default = "default_filters")]
	pub filters: String,
	#[serde(default = "default_feed_chain")]
	pub chain: String,
	/// Per-request HTTP timeout
	#[serde(default = "default_feed_timeout_ms")]
	pub timeout_ms: u64,
}

impl FeedConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

fn default_name() -> String {
	"nft-arb".to_string()
}

fn default_poll_interval_ms() -> u64 {
	1000
}

fn default_price_override() -> String {
	"0".to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
	10
}

fn default_receipt_poll_interval_ms() -> u64 {
	500
}

fn default_page_size() -> u32 {
	20
}

fn default_page_num() -> u32 {
	1
}

fn default_order_by() -> String {
	"recent_listing".to_string()
}

fn default_filters() -> String {
	"has_offers".to_string()
}

fn default_feed_chain() -> String {
	"avalanche".to_string()
}

fn default_feed_timeout_ms() -> u64 {
	10_000
}

impl ArbitrageConfig {
	/// Parses the configured price override.
	pub fn price_override(&self) -> Result<alloy_primitives::U256, crate::ConfigError> {
		let value = self.price_override.trim();
		if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
			return Err(crate::ConfigError::ValidationError(format!(
				"arbitrage.price_override must be a decimal integer, got '{}'",
				self.price_override
			)));
		}
		alloy_primitives::U256::from_str_radix(value, 10).map_err(|e| {
			crate::ConfigError::ValidationError(format!("arbitrage.price_override: {}", e))
		})
	}
}
