//! Chain RPC access for the arbitrage bot.
//!
//! Provides chain id lookup, transaction filling, raw broadcast and receipt
//! lookup behind [`DeliveryInterface`], and the bounded inclusion wait in
//! [`DeliveryService`].

use alloy_primitives::Address;
use arb_types::{SignedTransaction, Transaction, TransactionHash, TransactionReceipt};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Network error: {0}")]
	Network(String),
	/// Nonce, gas or fee lookup failed, including a revert during estimation.
	#[error("Failed to build transaction: {0}")]
	Build(String),
	#[error("Broadcast rejected: {0}")]
	Broadcast(String),
	#[error("Receipt lookup failed: {0}")]
	Receipt(String),
	#[error("Transaction not included within {seconds}s")]
	Timeout { seconds: u64 },
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Chain id reported by the endpoint.
	async fn chain_id(&self) -> Result<u64, DeliveryError>;

	/// Fills nonce, gas limit and fees for a transaction sent by `from`.
	async fn prepare(&self, tx: Transaction, from: Address) -> Result<Transaction, DeliveryError>;

	/// Broadcasts a signed transaction and returns its hash.
	async fn broadcast(&self, tx: &SignedTransaction) -> Result<TransactionHash, DeliveryError>;

	/// Looks up the receipt, returning `None` while the transaction is not included.
	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError>;
}

pub struct DeliveryService {
	provider: Box<dyn DeliveryInterface>,
	poll_interval: Duration,
}

impl DeliveryService {
	pub fn new(provider: Box<dyn DeliveryInterface>, poll_interval: Duration) -> Self {
		Self {
			provider,
			poll_interval,
		}
	}

	pub async fn chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider.chain_id().await
	}

	pub async fn prepare(&self, tx: Transaction, from: Address) -> Result<Transaction, DeliveryError> {
		self.provider.prepare(tx, from).await
	}

	pub async fn broadcast(&self, tx: &SignedTransaction) -> Result<TransactionHash, DeliveryError> {
		let hash = self.provider.broadcast(tx).await?;
		info!(tx_hash = %hash, "Submitted transaction");
		Ok(hash)
	}

	/// Polls for the receipt until it appears or `timeout` elapses.
	///
	/// Lookup errors are treated as transient and retried until the deadline.
	/// Returns [`DeliveryError::Timeout`] when no receipt was observed in time;
	/// the transaction may still be included afterwards.
	pub async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		timeout: Duration,
	) -> Result<TransactionReceipt, DeliveryError> {
		debug!(
			tx_hash = %hash,
			timeout_secs = timeout.as_secs(),
			"Waiting for inclusion"
		);

		let wait = async {
			loop {
				match self.provider.get_receipt(hash).await {
					Ok(Some(receipt)) => return receipt,
					Ok(None) => {}
					Err(e) => warn!(tx_hash = %hash, error = %e, "Receipt lookup failed, retrying"),
				}
				tokio::time::sleep(self.poll_interval).await;
			}
		};

		tokio::time::timeout(timeout, wait)
			.await
			.map_err(|_| DeliveryError::Timeout {
				seconds: timeout.as_secs(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, B256};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	/// Chain whose receipt appears after a fixed number of lookups.
	struct SlowChain {
		lookups: Arc<AtomicUsize>,
		included_after: Option<usize>,
		failing_lookups: usize,
	}

	#[async_trait]
	impl DeliveryInterface for SlowChain {
		async fn chain_id(&self) -> Result<u64, DeliveryError> {
			Ok(43114)
		}

		async fn prepare(
			&self,
			tx: Transaction,
			_from: Address,
		) -> Result<Transaction, DeliveryError> {
			Ok(tx)
		}

		async fn broadcast(&self, tx: &SignedTransaction) -> Result<TransactionHash, DeliveryError> {
			Ok(tx.hash)
		}

		async fn get_receipt(
			&self,
			hash: &TransactionHash,
		) -> Result<Option<TransactionReceipt>, DeliveryError> {
			let seen = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
			if seen <= self.failing_lookups {
				return Err(DeliveryError::Receipt("connection reset".to_string()));
			}
			match self.included_after {
				Some(n) if seen >= n => Ok(Some(TransactionReceipt {
					hash: *hash,
					block_number: 1234,
					success: true,
				})),
				_ => Ok(None),
			}
		}
	}

	fn service(
		included_after: Option<usize>,
		failing_lookups: usize,
	) -> (DeliveryService, Arc<AtomicUsize>) {
		let lookups = Arc::new(AtomicUsize::new(0));
		let chain = SlowChain {
			lookups: lookups.clone(),
			included_after,
			failing_lookups,
		};
		(
			DeliveryService::new(Box::new(chain), Duration::from_millis(500)),
			lookups,
		)
	}

	fn hash() -> TransactionHash {
		TransactionHash(B256::repeat_byte(0x42))
	}

	#[tokio::test(start_paused = true)]
	async fn test_returns_receipt_once_included() {
		let (service, lookups) = service(Some(3), 0);

		let receipt = service
			.wait_for_confirmation(&hash(), Duration::from_secs(10))
			.await
			.unwrap();
		assert_eq!(receipt.block_number, 1234);
		assert!(receipt.success);
		assert_eq!(lookups.load(Ordering::SeqCst), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_times_out_when_never_included() {
		let (service, lookups) = service(None, 0);
		let started = tokio::time::Instant::now();

		let err = service
			.wait_for_confirmation(&hash(), Duration::from_secs(10))
			.await
			.unwrap_err();
		assert!(matches!(err, DeliveryError::Timeout { seconds: 10 }));
		assert!(started.elapsed() >= Duration::from_secs(10));
		assert!(lookups.load(Ordering::SeqCst) >= 20);
	}

	#[tokio::test(start_paused = true)]
	async fn test_lookup_errors_are_retried() {
		let (service, _) = service(Some(1), 2);

		let receipt = service
			.wait_for_confirmation(&hash(), Duration::from_secs(10))
			.await
			.unwrap();
		assert_eq!(receipt.hash, hash());
	}

	#[tokio::test]
	async fn test_broadcast_returns_hash() {
		let (service, _) = service(Some(1), 0);
		let signed = SignedTransaction {
			hash: hash(),
			raw: Bytes::from(vec![0x02]),
		};
		assert_eq!(service.broadcast(&signed).await.unwrap(), hash());
		assert_eq!(service.chain_id().await.unwrap(), 43114);
	}
}
