//! Binding for the order-matching contract.
//!
//! The contract takes a signed ask, a signed bid and a price override, buys
//! the item from the ask side and sells it into the bid side in one
//! transaction, or reverts. Fee and royalty handling live entirely on-chain.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use arb_types::{Opportunity, SignedOrder, Transaction};

use crate::OrderError;

sol! {
	#![sol(all_derives)]

	/// Maker order as laid out by the marketplace exchange.
	struct MakerOrder {
		bool isOrderAsk;
		address signer;
		address collection;
		uint256 price;
		uint256 tokenId;
		uint256 amount;
		address strategy;
		address currency;
		uint256 nonce;
		uint256 startTime;
		uint256 endTime;
		uint256 minPercentageToAsk;
		bytes params;
		uint8 v;
		bytes32 r;
		bytes32 s;
	}

	/// Arbitrage entry point matching one ask against one bid.
	interface IOrderMatcher {
		function go(MakerOrder makerAsk, MakerOrder makerBid, uint256 overridePrice) external;
	}
}

impl From<&SignedOrder> for MakerOrder {
	fn from(order: &SignedOrder) -> Self {
		MakerOrder {
			isOrderAsk: order.is_ask,
			signer: order.signer,
			collection: order.collection,
			price: order.price,
			tokenId: order.token_id,
			amount: order.amount,
			strategy: order.strategy,
			currency: order.currency,
			nonce: order.nonce,
			startTime: order.start_time,
			endTime: order.end_time,
			minPercentageToAsk: U256::from(order.min_percentage_to_ask_bps),
			params: order.extra_params.clone(),
			v: order.signature.v,
			r: order.signature.r,
			s: order.signature.s,
		}
	}
}

/// Deployed order-matching contract.
#[derive(Debug, Clone)]
pub struct MatchingContract {
	address: Address,
	/// Third call argument. Zero delegates to the contract's own default.
	price_override: U256,
}

impl MatchingContract {
	pub fn new(address: Address, price_override: U256) -> Self {
		Self {
			address,
			price_override,
		}
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn price_override(&self) -> U256 {
		self.price_override
	}

	/// Builds the unfilled transaction that executes both sides of an opportunity.
	pub fn match_transaction(
		&self,
		opportunity: &Opportunity,
		chain_id: u64,
	) -> Result<Transaction, OrderError> {
		if !opportunity.ask.is_ask || opportunity.bid.is_ask {
			return Err(OrderError::InvalidOpportunity(format!(
				"item {} needs an ask and a bid, got {} and {}",
				opportunity.item_id,
				opportunity.ask.side(),
				opportunity.bid.side()
			)));
		}

		let data = IOrderMatcher::goCall {
			makerAsk: (&opportunity.ask).into(),
			makerBid: (&opportunity.bid).into(),
			overridePrice: self.price_override,
		}
		.abi_encode();

		Ok(Transaction::call(self.address, data.into(), chain_id))
	}
}
