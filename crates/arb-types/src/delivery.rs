//! Transaction delivery types.
//!
//! This module defines the transaction as built by the order layer, its signed
//! form as produced by the account layer, and the outcome of one execution
//! attempt as reported by the submitter.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl From<B256> for TransactionHash {
	fn from(hash: B256) -> Self {
		Self(hash)
	}
}

/// Contract call to be signed and broadcast.
///
/// Fields left as `None` are filled from the chain before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
	/// Called contract.
	pub to: Address,
	/// ABI encoded calldata.
	pub data: Bytes,
	/// Value to transfer in native currency.
	pub value: U256,
	/// Chain ID for replay protection.
	pub chain_id: u64,
	pub nonce: Option<u64>,
	pub gas_limit: Option<u64>,
	/// Legacy gas price, used when the chain has no EIP-1559 fee market.
	pub gas_price: Option<u128>,
	pub max_fee_per_gas: Option<u128>,
	pub max_priority_fee_per_gas: Option<u128>,
}

impl Transaction {
	/// Creates an unfilled call transaction.
	pub fn call(to: Address, data: Bytes, chain_id: u64) -> Self {
		Self {
			to,
			data,
			value: U256::ZERO,
			chain_id,
			nonce: None,
			gas_limit: None,
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
		}
	}

	/// Whether nonce, gas limit and a fee model have all been set.
	pub fn is_filled(&self) -> bool {
		let has_fees = self.gas_price.is_some()
			|| (self.max_fee_per_gas.is_some() && self.max_priority_fee_per_gas.is_some());
		self.nonce.is_some() && self.gas_limit.is_some() && has_fees
	}
}

/// EIP-2718 encoded, signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
	pub hash: TransactionHash,
	pub raw: Bytes,
}

/// Receipt of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	pub hash: TransactionHash,
	pub block_number: u64,
	/// Whether the transaction executed without reverting.
	pub success: bool,
}

/// Stage at which an execution attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
	/// Calldata encoding, gas estimation, fee lookup or signing failed.
	Build,
	/// The RPC endpoint rejected the signed transaction.
	Broadcast,
	/// Inclusion was not observed within the confirmation timeout.
	AwaitTimeout,
}

impl fmt::Display for FailureReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			FailureReason::Build => "build",
			FailureReason::Broadcast => "broadcast",
			FailureReason::AwaitTimeout => "await-timeout",
		};
		f.write_str(label)
	}
}

/// Final result of one execution attempt.
///
/// The intermediate pending state (broadcast accepted, inclusion not yet
/// observed) is reported as [`DeliveryEvent::TransactionPending`] while the
/// attempt is still running. Never persisted; a restart loses in-flight
/// visibility.
///
/// [`DeliveryEvent::TransactionPending`]: crate::DeliveryEvent::TransactionPending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionOutcome {
	/// Included in a block.
	Confirmed {
		tx_hash: TransactionHash,
		receipt: TransactionReceipt,
	},
	/// The attempt failed. A broadcast transaction that timed out may still
	/// be included later, in which case `tx_hash` is set.
	Failed {
		reason: FailureReason,
		tx_hash: Option<TransactionHash>,
		cause: String,
	},
}

impl SubmissionOutcome {
	pub fn failed(reason: FailureReason, cause: impl Into<String>) -> Self {
		SubmissionOutcome::Failed {
			reason,
			tx_hash: None,
			cause: cause.into(),
		}
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, SubmissionOutcome::Failed { .. })
	}

	/// Hash of the transaction, once one was broadcast.
	pub fn tx_hash(&self) -> Option<&TransactionHash> {
		match self {
			SubmissionOutcome::Confirmed { tx_hash, .. } => Some(tx_hash),
			SubmissionOutcome::Failed { tx_hash, .. } => tx_hash.as_ref(),
		}
	}
}
