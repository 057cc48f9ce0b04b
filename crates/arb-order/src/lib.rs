//! Order handling for the arbitrage pipeline.
//!
//! This crate turns raw feed orders into validated [`SignedOrder`] values,
//! scans listings for ask/bid pairs that cross, and encodes the call to the
//! order-matching contract that executes both sides atomically.
//!
//! [`SignedOrder`]: arb_types::SignedOrder

use thiserror::Error;

pub mod contract;
pub mod detector;
pub mod parse;

pub use contract::MatchingContract;
pub use detector::{detect, evaluate};
pub use parse::{parse_order, parse_price};

/// Error raised while validating a single feed order.
///
/// The whole order is rejected; no partially parsed value is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order field '{field}': {reason}")]
pub struct ParseError {
	/// Feed name of the offending field.
	pub field: &'static str,
	pub reason: String,
}

impl ParseError {
	pub fn missing(field: &'static str) -> Self {
		Self {
			field,
			reason: "missing".to_string(),
		}
	}

	pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		Self {
			field,
			reason: reason.into(),
		}
	}
}

/// Errors that can occur while building a match transaction.
#[derive(Debug, Error)]
pub enum OrderError {
	/// The opportunity cannot be sent to the contract as given.
	#[error("Invalid opportunity: {0}")]
	InvalidOpportunity(String),
}
