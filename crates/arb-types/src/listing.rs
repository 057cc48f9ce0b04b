//! Marketplace feed records.
//!
//! These types mirror only the parts of the feed response that the arbitrage
//! pipeline consumes. Every other field in the upstream payload (collection
//! metadata, rarity, ownership) is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// One item currently offered for sale together with its best competing bid.
///
/// Created fresh on every poll cycle and discarded at the end of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
	/// Opaque item identifier assigned by the marketplace.
	#[serde(rename = "id")]
	pub item_id: String,
	/// NFT collection contract, as reported by the feed.
	#[serde(default)]
	pub collection: String,
	/// Token id within the collection, as a decimal string.
	#[serde(default, rename = "tokenId")]
	pub chain_token_id: String,
	/// The sell order currently listed for this item.
	#[serde(default)]
	pub current_ask: Option<RawOrder>,
	/// The highest outstanding buy order for this item.
	#[serde(default)]
	pub best_bid: Option<RawOrder>,
}

/// Unvalidated maker order exactly as the feed encodes it.
///
/// All numeric values are decimal strings and all binary values are hex
/// strings. Missing fields deserialize as `None` so that validation can
/// report which field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
	#[serde(default)]
	pub is_order_ask: bool,
	#[serde(default)]
	pub signer: Option<String>,
	#[serde(default)]
	pub collection: Option<String>,
	#[serde(default)]
	pub strategy: Option<String>,
	#[serde(default)]
	pub currency: Option<String>,
	#[serde(default)]
	pub params: Option<String>,
	#[serde(default)]
	pub price: Option<String>,
	#[serde(default)]
	pub token_id: Option<String>,
	#[serde(default)]
	pub amount: Option<String>,
	#[serde(default)]
	pub nonce: Option<String>,
	#[serde(default)]
	pub start_time: Option<String>,
	#[serde(default)]
	pub end_time: Option<String>,
	#[serde(default)]
	pub min_percentage_to_ask: Option<String>,
	#[serde(default)]
	pub v: Option<u64>,
	#[serde(default)]
	pub r: Option<String>,
	#[serde(default)]
	pub s: Option<String>,
}
