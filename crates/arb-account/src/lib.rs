//! Signing account for the arbitrage bot.
//!
//! The account owns the private key and turns filled transactions into
//! EIP-2718 encoded bytes ready for broadcast. It never talks to the chain.

use alloy_primitives::Address;
use arb_types::{SignedTransaction, Transaction};
use async_trait::async_trait;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address derived from the signing key.
	fn address(&self) -> Address;

	/// Signs a filled transaction and returns its encoded form and hash.
	async fn sign_transaction(&self, tx: &Transaction) -> Result<SignedTransaction, AccountError>;
}

pub struct AccountService {
	provider: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(provider: Box<dyn AccountInterface>) -> Self {
		Self { provider }
	}

	pub fn address(&self) -> Address {
		self.provider.address()
	}

	pub async fn sign(&self, tx: &Transaction) -> Result<SignedTransaction, AccountError> {
		self.provider.sign_transaction(tx).await
	}
}
