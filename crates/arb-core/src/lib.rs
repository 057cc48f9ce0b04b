//! Core orchestration for the arbitrage bot.
//!
//! [`ArbBuilder`] turns configuration and implementation factories into an
//! [`ArbEngine`], the explicit context object that owns the feed client, the
//! signing account, the RPC connection and the contract binding for the life
//! of the process.

use arb_account::{AccountError, AccountInterface, AccountService};
use arb_config::ArbConfig;
use arb_delivery::{DeliveryError, DeliveryInterface, DeliveryService};
use arb_discovery::{DiscoveryInterface, DiscoveryService, FeedQuery, FetchError};
use arb_order::{MatchingContract, OrderError};
use arb_types::EventBus;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub mod engine;
pub mod submitter;

#[cfg(test)]
mod mocks;

pub use engine::{ArbEngine, CycleReport};
pub use submitter::ExecutionSubmitter;

#[derive(Debug, Error)]
pub enum CoreError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Chain id mismatch: configured {configured}, endpoint reports {reported}")]
	ChainMismatch { configured: u64, reported: u64 },
	#[error(transparent)]
	Order(#[from] OrderError),
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error(transparent)]
	Delivery(#[from] DeliveryError),
	#[error(transparent)]
	Discovery(#[from] FetchError),
}

/// Re-encodes a typed configuration section for an implementation factory.
fn section<T: Serialize>(name: &str, value: &T) -> Result<toml::Value, CoreError> {
	toml::Value::try_from(value)
		.map_err(|e| CoreError::Config(format!("Invalid [{}] section: {}", name, e)))
}

type AccountFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send>;
type DeliveryFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> + Send>;
type DiscoveryFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn DiscoveryInterface>, FetchError> + Send>;

/// Event bus capacity; slow observers lose the oldest events.
const EVENT_BUS_CAPACITY: usize = 1000;

// Factory pattern for creating services from config
pub struct ArbBuilder {
	config: ArbConfig,
	account_factory: Option<AccountFactory>,
	delivery_factory: Option<DeliveryFactory>,
	discovery_factory: Option<DiscoveryFactory>,
}

impl ArbBuilder {
	pub fn new(config: ArbConfig) -> Self {
		Self {
			config,
			account_factory: None,
			delivery_factory: None,
			discovery_factory: None,
		}
	}

	pub fn with_account_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send + 'static,
	{
		self.account_factory = Some(Box::new(factory));
		self
	}

	pub fn with_delivery_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> + Send + 'static,
	{
		self.delivery_factory = Some(Box::new(factory));
		self
	}

	pub fn with_discovery_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn DiscoveryInterface>, FetchError> + Send + 'static,
	{
		self.discovery_factory = Some(Box::new(factory));
		self
	}

	/// Creates every service and looks up the chain id.
	///
	/// This is the only place the RPC endpoint is contacted before the loop
	/// starts; any error here is fatal.
	pub async fn build(self) -> Result<ArbEngine, CoreError> {
		let config = self.config;

		let account_factory = self
			.account_factory
			.ok_or_else(|| CoreError::Config("Account factory not provided".into()))?;
		let account = AccountService::new(account_factory(&section("account", &config.account)?)?);

		let delivery_factory = self
			.delivery_factory
			.ok_or_else(|| CoreError::Config("Delivery factory not provided".into()))?;
		let delivery = DeliveryService::new(
			delivery_factory(&section("chain", &config.chain)?)?,
			config.chain.receipt_poll_interval(),
		);

		let discovery_factory = self
			.discovery_factory
			.ok_or_else(|| CoreError::Config("Discovery factory not provided".into()))?;
		let discovery = DiscoveryService::new(
			discovery_factory(&section("feed", &config.feed)?)?,
			FeedQuery {
				page_size: config.feed.page_size,
				page_num: config.feed.page_num,
				order_by: config.feed.order_by.clone(),
				filters: config.feed.filters.clone(),
				chain: config.feed.chain.clone(),
			},
		);

		let chain_id = delivery.chain_id().await?;
		if let Some(configured) = config.chain.chain_id {
			if configured != chain_id {
				return Err(CoreError::ChainMismatch {
					configured,
					reported: chain_id,
				});
			}
		}

		let price_override = config
			.arbitrage
			.price_override()
			.map_err(|e| CoreError::Config(e.to_string()))?;
		let contract = MatchingContract::new(config.chain.contract_address, price_override);

		info!(
			name = %config.arbitrage.name,
			chain_id,
			signer = %account.address(),
			contract = %contract.address(),
			price_override = %price_override,
			"Arbitrage engine initialised"
		);

		let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
		let submitter = ExecutionSubmitter::new(
			contract,
			account,
			delivery,
			chain_id,
			config.chain.confirmation_timeout(),
			event_bus.clone(),
		);

		Ok(ArbEngine::new(
			discovery,
			submitter,
			event_bus,
			config.arbitrage.poll_interval(),
		))
	}
}
