//! Local private key account.
//!
//! Signs EIP-1559 transactions when both fee caps are set and falls back to
//! legacy (EIP-155) transactions when only a gas price is available.

use crate::{AccountError, AccountInterface};
use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::TxSigner;
use alloy_primitives::{Address, Bytes, TxKind};
use alloy_signer_local::PrivateKeySigner;
use arb_types::{SignedTransaction, Transaction, TransactionHash};
use async_trait::async_trait;
use tracing::debug;

/// Account backed by a private key held in memory.
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a hex-encoded private key, with or without `0x`.
	///
	/// A key of the wrong length or with non-hex characters is rejected as
	/// [`AccountError::InvalidKey`].
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;

		Ok(Self { signer })
	}

	async fn sign_envelope(&self, tx: &Transaction) -> Result<TxEnvelope, AccountError> {
		let nonce = tx
			.nonce
			.ok_or_else(|| AccountError::SigningFailed("nonce is not set".to_string()))?;
		let gas_limit = tx
			.gas_limit
			.ok_or_else(|| AccountError::SigningFailed("gas limit is not set".to_string()))?;

		match (tx.max_fee_per_gas, tx.max_priority_fee_per_gas, tx.gas_price) {
			(Some(max_fee_per_gas), Some(max_priority_fee_per_gas), _) => {
				let mut unsigned = TxEip1559 {
					chain_id: tx.chain_id,
					nonce,
					gas_limit,
					max_fee_per_gas,
					max_priority_fee_per_gas,
					to: TxKind::Call(tx.to),
					value: tx.value,
					input: tx.data.clone(),
					..Default::default()
				};
				let signature = self
					.signer
					.sign_transaction(&mut unsigned)
					.await
					.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
				Ok(TxEnvelope::from(unsigned.into_signed(signature)))
			}
			(_, _, Some(gas_price)) => {
				let mut unsigned = TxLegacy {
					chain_id: Some(tx.chain_id),
					nonce,
					gas_price,
					gas_limit,
					to: TxKind::Call(tx.to),
					value: tx.value,
					input: tx.data.clone(),
				};
				let signature = self
					.signer
					.sign_transaction(&mut unsigned)
					.await
					.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
				Ok(TxEnvelope::from(unsigned.into_signed(signature)))
			}
			_ => Err(AccountError::SigningFailed(
				"no fee parameters set".to_string(),
			)),
		}
	}
}

#[async_trait]
impl AccountInterface for LocalWallet {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_transaction(&self, tx: &Transaction) -> Result<SignedTransaction, AccountError> {
		let envelope = self.sign_envelope(tx).await?;
		let hash = TransactionHash(*envelope.tx_hash());
		debug!(tx_hash = %hash, nonce = ?tx.nonce, "Signed transaction");

		Ok(SignedTransaction {
			hash,
			raw: Bytes::from(envelope.encoded_2718()),
		})
	}
}

/// Factory function to create an account from the `[account]` table.
///
/// Required configuration parameters:
/// - `private_key`: hex-encoded signing key
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::InvalidConfig("private_key is required".to_string()))?;

	Ok(Box::new(LocalWallet::new(private_key)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_consensus::transaction::SignerRecoverable;
	use alloy_eips::eip2718::Decodable2718;
	use alloy_primitives::{keccak256, U256};
	use std::str::FromStr;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	fn filled() -> Transaction {
		let mut tx = Transaction::call(
			Address::repeat_byte(0x99),
			Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
			43114,
		);
		tx.nonce = Some(5);
		tx.gas_limit = Some(400_000);
		tx
	}

	#[test]
	fn test_address_derived_from_key() {
		let wallet = LocalWallet::new(KEY).unwrap();
		assert_eq!(wallet.address(), Address::from_str(ADDRESS).unwrap());

		let unprefixed = LocalWallet::new(KEY.trim_start_matches("0x")).unwrap();
		assert_eq!(unprefixed.address(), wallet.address());
	}

	#[test]
	fn test_rejects_malformed_keys() {
		assert!(matches!(
			LocalWallet::new("0x1234"),
			Err(AccountError::InvalidKey(_))
		));
		assert!(matches!(
			LocalWallet::new(&format!("0x{}", "zz".repeat(32))),
			Err(AccountError::InvalidKey(_))
		));
		assert!(matches!(
			LocalWallet::new(&KEY[..KEY.len() - 2]),
			Err(AccountError::InvalidKey(_))
		));
	}

	#[tokio::test]
	async fn test_signs_eip1559_when_fee_caps_set() {
		let wallet = LocalWallet::new(KEY).unwrap();
		let mut tx = filled();
		tx.max_fee_per_gas = Some(30_000_000_000);
		tx.max_priority_fee_per_gas = Some(1_000_000_000);

		let signed = wallet.sign_transaction(&tx).await.unwrap();
		assert_eq!(signed.raw[0], 0x02);
		assert_eq!(signed.hash.0, keccak256(&signed.raw));

		let mut buf: &[u8] = &signed.raw;
		let decoded = TxEnvelope::decode_2718(&mut buf).unwrap();
		assert_eq!(decoded.recover_signer().unwrap(), wallet.address());
		let TxEnvelope::Eip1559(inner) = decoded else {
			panic!("expected an EIP-1559 envelope");
		};
		assert_eq!(inner.tx().nonce, 5);
		assert_eq!(inner.tx().chain_id, 43114);
		assert_eq!(inner.tx().value, U256::ZERO);
	}

	#[tokio::test]
	async fn test_signs_legacy_with_gas_price_only() {
		let wallet = LocalWallet::new(KEY).unwrap();
		let mut tx = filled();
		tx.gas_price = Some(25_000_000_000);

		let signed = wallet.sign_transaction(&tx).await.unwrap();
		assert!(signed.raw[0] >= 0xc0);

		let mut buf: &[u8] = &signed.raw;
		let decoded = TxEnvelope::decode_2718(&mut buf).unwrap();
		assert!(matches!(decoded, TxEnvelope::Legacy(_)));
		assert_eq!(decoded.recover_signer().unwrap(), wallet.address());
	}

	#[tokio::test]
	async fn test_refuses_unfilled_transaction() {
		let wallet = LocalWallet::new(KEY).unwrap();

		let no_fees = filled();
		assert!(matches!(
			wallet.sign_transaction(&no_fees).await,
			Err(AccountError::SigningFailed(_))
		));

		let mut no_nonce = filled();
		no_nonce.nonce = None;
		no_nonce.gas_price = Some(1);
		assert!(matches!(
			wallet.sign_transaction(&no_nonce).await,
			Err(AccountError::SigningFailed(_))
		));
	}

	#[test]
	fn test_factory_requires_private_key() {
		let config: toml::Value = toml::from_str("name = \"x\"").unwrap();
		assert!(matches!(
			create_account(&config),
			Err(AccountError::InvalidConfig(_))
		));

		let config: toml::Value = toml::from_str(&format!("private_key = \"{}\"", KEY)).unwrap();
		let account = create_account(&config).unwrap();
		assert_eq!(account.address(), Address::from_str(ADDRESS).unwrap());
	}
}
