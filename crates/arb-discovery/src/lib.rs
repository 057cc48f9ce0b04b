//! Listing discovery for the arbitrage pipeline.
//!
//! This crate fetches the current page of listings-with-bids from the
//! marketplace feed. It is stateless between calls: nothing is cached and
//! nothing is deduplicated across poll cycles.

use arb_types::Listing;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Re-export implementations
pub mod implementations {
	pub mod marketplace;
}

/// Errors that can occur while fetching a page of listings.
///
/// In every case the caller gets no listings for this cycle.
#[derive(Debug, Error)]
pub enum FetchError {
	/// The feed answered with a non-success status code.
	#[error("Feed returned status {status}")]
	Status { status: u16 },
	/// Connection, DNS or timeout failure.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The response body did not match the expected schema.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The `[feed]` table is missing a required value.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Query parameters for one page of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedQuery {
	pub page_size: u32,
	pub page_num: u32,
	pub order_by: String,
	pub filters: String,
	pub chain: String,
}

impl Default for FeedQuery {
	fn default() -> Self {
		Self {
			page_size: 20,
			page_num: 1,
			order_by: "recent_listing".to_string(),
			filters: "has_offers".to_string(),
			chain: "avalanche".to_string(),
		}
	}
}

impl FeedQuery {
	/// Query pairs in the order the feed documents them.
	pub fn to_pairs(&self) -> [(&'static str, String); 5] {
		[
			("pageSize", self.page_size.to_string()),
			("pageNum", self.page_num.to_string()),
			("orderBy", self.order_by.clone()),
			("filters", self.filters.clone()),
			("chain", self.chain.clone()),
		]
	}
}

/// Trait defining the interface for listing sources.
#[async_trait]
pub trait DiscoveryInterface: Send + Sync {
	/// Short name used in logs.
	fn name(&self) -> &str;

	/// Fetches one page of listings, preserving feed order.
	async fn fetch_listings(&self, query: &FeedQuery) -> Result<Vec<Listing>, FetchError>;
}

/// Service that fetches listings from a configured source with a fixed query.
pub struct DiscoveryService {
	source: Box<dyn DiscoveryInterface>,
	query: FeedQuery,
}

impl DiscoveryService {
	pub fn new(source: Box<dyn DiscoveryInterface>, query: FeedQuery) -> Self {
		Self { source, query }
	}

	pub fn query(&self) -> &FeedQuery {
		&self.query
	}

	/// Fetches the configured page from the source.
	pub async fn fetch(&self) -> Result<Vec<Listing>, FetchError> {
		let listings = self.source.fetch_listings(&self.query).await?;
		debug!(
			source = self.source.name(),
			count = listings.len(),
			"Fetched listings"
		);
		Ok(listings)
	}
}
