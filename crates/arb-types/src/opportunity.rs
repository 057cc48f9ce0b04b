//! Actionable ask/bid pairs.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::SignedOrder;

/// A listing whose ask price is strictly below its best bid price.
///
/// Exists only for the duration of one detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
	/// Marketplace identifier of the item.
	pub item_id: String,
	/// Sell side, `is_ask == true`.
	pub ask: SignedOrder,
	/// Buy side, `is_ask == false`.
	pub bid: SignedOrder,
}

impl Opportunity {
	/// Price at which the matched trade executes: the lower of the two sides.
	pub fn execution_price(&self) -> U256 {
		self.ask.price
	}

	/// Gross spread before marketplace fees and gas.
	pub fn spread(&self) -> U256 {
		self.bid.price.saturating_sub(self.ask.price)
	}
}
