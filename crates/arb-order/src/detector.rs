//! Opportunity detection over one page of listings.

use arb_types::{Listing, Opportunity, RawOrder, SignedOrder};
use tracing::{debug, warn};

use crate::{parse_order, parse_price};

/// Scans listings in order and yields every one whose ask crosses its bid.
///
/// The returned iterator is lazy and borrows the page; calling `detect`
/// again restarts the scan. No ranking is applied.
pub fn detect(listings: &[Listing]) -> impl Iterator<Item = Opportunity> + '_ {
	listings.iter().filter_map(evaluate)
}

/// Evaluates a single listing.
///
/// Listings with a missing side or an unparseable price are skipped quietly.
/// Listings that cross but carry a malformed order are skipped with a warning.
pub fn evaluate(listing: &Listing) -> Option<Opportunity> {
	let (Some(raw_ask), Some(raw_bid)) = (&listing.current_ask, &listing.best_bid) else {
		debug!(item_id = %listing.item_id, "Skipping listing without both sides");
		return None;
	};

	let ask_price = parse_price(raw_ask.price.as_deref())?;
	let bid_price = parse_price(raw_bid.price.as_deref())?;
	// Equal prices leave nothing to cover fees.
	if ask_price >= bid_price {
		return None;
	}

	let ask = validated(listing, raw_ask, true)?;
	let bid = validated(listing, raw_bid, false)?;

	Some(Opportunity {
		item_id: listing.item_id.clone(),
		ask,
		bid,
	})
}

fn validated(listing: &Listing, raw: &RawOrder, expect_ask: bool) -> Option<SignedOrder> {
	let order = match parse_order(raw) {
		Ok(order) => order,
		Err(e) => {
			warn!(item_id = %listing.item_id, error = %e, "Rejecting listing with malformed order");
			return None;
		}
	};

	if order.is_ask != expect_ask {
		warn!(
			item_id = %listing.item_id,
			side = order.side(),
			"Rejecting listing with order on the wrong side"
		);
		return None;
	}

	Some(order)
}
