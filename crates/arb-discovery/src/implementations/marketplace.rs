//! HTTP implementation of the marketplace listings feed.
//!
//! Issues one GET per call against the items endpoint and decodes the JSON
//! array of listing records. Fields the pipeline does not use are ignored.

use crate::{DiscoveryInterface, FeedQuery, FetchError};
use arb_types::Listing;
use async_trait::async_trait;
use std::time::Duration;

/// Marketplace feed reached over HTTP.
pub struct MarketplaceFeed {
	client: reqwest::Client,
	/// Items endpoint, e.g. `https://barn.joepegs.com/v3/items/`.
	url: String,
}

impl MarketplaceFeed {
	/// Creates a feed client whose requests are bounded by `timeout`.
	pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			url: url.into(),
		})
	}
}

#[async_trait]
impl DiscoveryInterface for MarketplaceFeed {
	fn name(&self) -> &str {
		"marketplace"
	}

	async fn fetch_listings(&self, query: &FeedQuery) -> Result<Vec<Listing>, FetchError> {
		let response = self
			.client
			.get(&self.url)
			.query(&query.to_pairs())
			.send()
			.await
			.map_err(|e| FetchError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(FetchError::Status {
				status: status.as_u16(),
			});
		}

		let body = response
			.bytes()
			.await
			.map_err(|e| FetchError::Transport(format!("Failed to read body: {}", e)))?;

		serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
	}
}

/// Factory function to create a marketplace feed from the `[feed]` table.
///
/// Required configuration parameters:
/// - `url`: items endpoint
///
/// Optional:
/// - `timeout_ms`: per-request timeout, 10000 when absent
pub fn create_discovery(config: &toml::Value) -> Result<Box<dyn DiscoveryInterface>, FetchError> {
	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| FetchError::InvalidConfig("feed url is required".to_string()))?;

	let timeout_ms = config
		.get("timeout_ms")
		.and_then(|v| v.as_integer())
		.and_then(|v| u64::try_from(v).ok())
		.unwrap_or(10_000);

	Ok(Box::new(MarketplaceFeed::new(
		url,
		Duration::from_millis(timeout_ms),
	)?))
}
