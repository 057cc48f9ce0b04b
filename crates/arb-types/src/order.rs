//! Signed maker order types.
//!
//! A maker order is an off-chain authorised intent to buy or sell one item.
//! Orders arrive already signed from the marketplace feed; this crate only
//! carries them, it never recomputes the order hash or the signature.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// ECDSA signature over the contract-defined order hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSignature {
	/// Recovery id, conventionally 27 or 28.
	pub v: u8,
	pub r: B256,
	pub s: B256,
}

/// One side of a two-sided trade, as signed by its owner.
///
/// Constructed once from feed data and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOrder {
	/// `true` for the sell side (ask), `false` for the buy side (bid).
	pub is_ask: bool,
	/// Owner of the order.
	pub signer: Address,
	/// NFT collection contract.
	pub collection: Address,
	/// Execution strategy contract.
	pub strategy: Address,
	/// Payment currency contract.
	pub currency: Address,
	/// Price in the smallest currency unit.
	pub price: U256,
	pub token_id: U256,
	/// Quantity, typically 1.
	pub amount: U256,
	pub nonce: U256,
	pub start_time: U256,
	pub end_time: U256,
	/// Minimum share of the price the seller must receive, in basis points.
	pub min_percentage_to_ask_bps: u16,
	/// Opaque strategy parameters, usually empty.
	pub extra_params: Bytes,
	pub signature: OrderSignature,
}

impl SignedOrder {
	/// Returns a short human readable side label for logs.
	pub fn side(&self) -> &'static str {
		if self.is_ask {
			"ask"
		} else {
			"bid"
		}
	}
}
