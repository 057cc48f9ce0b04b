//! Conversion of raw feed orders into [`SignedOrder`] values.

use alloy_primitives::{Address, Bytes, B256, U256};
use arb_types::{OrderSignature, RawOrder, SignedOrder};
use std::str::FromStr;

use crate::ParseError;

/// Upper bound for `minPercentageToAsk`, i.e. 100% in basis points.
const MAX_BPS: u16 = 10_000;

/// Validates a raw feed order and converts it into a [`SignedOrder`].
///
/// Pure function: parsing the same record twice yields equal values.
pub fn parse_order(raw: &RawOrder) -> Result<SignedOrder, ParseError> {
	let price = parse_uint("price", raw.price.as_deref())?;
	let token_id = parse_uint("tokenId", raw.token_id.as_deref())?;
	let amount = parse_uint("amount", raw.amount.as_deref())?;
	let nonce = parse_uint("nonce", raw.nonce.as_deref())?;
	let start_time = parse_uint("startTime", raw.start_time.as_deref())?;
	let end_time = parse_uint("endTime", raw.end_time.as_deref())?;
	if start_time > end_time {
		return Err(ParseError::invalid(
			"endTime",
			format!("ends at {} before it starts at {}", end_time, start_time),
		));
	}

	let min_percentage = parse_uint("minPercentageToAsk", raw.min_percentage_to_ask.as_deref())?;
	if min_percentage > U256::from(MAX_BPS) {
		return Err(ParseError::invalid(
			"minPercentageToAsk",
			format!("{} exceeds {} basis points", min_percentage, MAX_BPS),
		));
	}
	let min_percentage_to_ask_bps = min_percentage.to::<u16>();

	let v = raw.v.ok_or_else(|| ParseError::missing("v"))?;
	let v = u8::try_from(v).map_err(|_| ParseError::invalid("v", format!("{} out of range", v)))?;

	Ok(SignedOrder {
		is_ask: raw.is_order_ask,
		signer: parse_address("signer", raw.signer.as_deref())?,
		collection: parse_address("collection", raw.collection.as_deref())?,
		strategy: parse_address("strategy", raw.strategy.as_deref())?,
		currency: parse_address("currency", raw.currency.as_deref())?,
		price,
		token_id,
		amount,
		nonce,
		start_time,
		end_time,
		min_percentage_to_ask_bps,
		extra_params: parse_params(raw.params.as_deref())?,
		signature: OrderSignature {
			v,
			r: parse_scalar("r", raw.r.as_deref())?,
			s: parse_scalar("s", raw.s.as_deref())?,
		},
	})
}

/// Parses a feed price, returning `None` when it is missing or malformed.
pub fn parse_price(price: Option<&str>) -> Option<U256> {
	parse_uint("price", price).ok()
}

fn parse_uint(field: &'static str, value: Option<&str>) -> Result<U256, ParseError> {
	let value = value
		.filter(|v| !v.is_empty())
		.ok_or_else(|| ParseError::missing(field))?;
	if !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(ParseError::invalid(
			field,
			format!("'{}' is not a base-10 non-negative integer", value),
		));
	}
	U256::from_str_radix(value, 10).map_err(|e| ParseError::invalid(field, e.to_string()))
}

fn parse_address(field: &'static str, value: Option<&str>) -> Result<Address, ParseError> {
	let value = value
		.filter(|v| !v.is_empty())
		.ok_or_else(|| ParseError::missing(field))?;
	Address::from_str(value).map_err(|e| ParseError::invalid(field, e.to_string()))
}

/// Decodes a signature scalar into a 32-byte buffer.
///
/// The feed drops leading zeros, so shorter values are left-padded. Values
/// wider than 32 bytes are rejected.
fn parse_scalar(field: &'static str, value: Option<&str>) -> Result<B256, ParseError> {
	let digits = value.map(strip_hex_prefix).unwrap_or_default();
	if digits.is_empty() {
		return Err(ParseError::missing(field));
	}
	if digits.len() > 64 {
		return Err(ParseError::invalid(
			field,
			format!("{} hex digits exceed 32 bytes", digits.len()),
		));
	}

	let padded = format!("{:0>64}", digits);
	let bytes = hex::decode(&padded).map_err(|e| ParseError::invalid(field, e.to_string()))?;
	Ok(B256::from_slice(&bytes))
}

fn parse_params(value: Option<&str>) -> Result<Bytes, ParseError> {
	let digits = value.map(strip_hex_prefix).unwrap_or_default();
	if digits.is_empty() {
		return Ok(Bytes::new());
	}
	hex::decode(digits)
		.map(Bytes::from)
		.map_err(|e| ParseError::invalid("params", e.to_string()))
}

fn strip_hex_prefix(value: &str) -> &str {
	value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.unwrap_or(value)
}
