//! Alloy-based EVM delivery implementation.
//!
//! Talks to a single JSON-RPC endpoint over HTTP. Transactions are filled
//! here and signed elsewhere, so the provider only ever sees raw envelopes.

use crate::{DeliveryError, DeliveryInterface};
use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, TxKind};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use arb_types::{SignedTransaction, Transaction, TransactionHash, TransactionReceipt};
use async_trait::async_trait;
use tracing::debug;

pub struct AlloyDelivery {
	provider: DynProvider,
}

impl AlloyDelivery {
	/// Creates a delivery client for the given HTTP(S) RPC endpoint.
	///
	/// No request is made until the first call.
	pub fn new(rpc_url: &str) -> Result<Self, DeliveryError> {
		let url: url::Url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::InvalidConfig(format!("Invalid RPC URL: {}", e)))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(DeliveryError::InvalidConfig(format!(
				"RPC URL must use http or https, got {}",
				url.scheme()
			)));
		}

		let provider = ProviderBuilder::new().connect_http(url).erased();
		Ok(Self { provider })
	}

	async fn fill_fees(&self, tx: &mut Transaction) -> Result<(), DeliveryError> {
		match self.provider.estimate_eip1559_fees().await {
			Ok(fees) => {
				tx.max_fee_per_gas = Some(fees.max_fee_per_gas);
				tx.max_priority_fee_per_gas = Some(fees.max_priority_fee_per_gas);
			}
			Err(e) => {
				debug!(error = %e, "EIP-1559 fee estimate unavailable, using legacy gas price");
				let gas_price = self
					.provider
					.get_gas_price()
					.await
					.map_err(|e| DeliveryError::Build(format!("Failed to get gas price: {}", e)))?;
				tx.gas_price = Some(gas_price);
			}
		}
		Ok(())
	}
}

fn to_request(tx: &Transaction, from: Address) -> TransactionRequest {
	TransactionRequest {
		from: Some(from),
		to: Some(TxKind::Call(tx.to)),
		value: Some(tx.value),
		input: TransactionInput::new(tx.data.clone()),
		chain_id: Some(tx.chain_id),
		..Default::default()
	}
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get chain id: {}", e)))
	}

	async fn prepare(&self, mut tx: Transaction, from: Address) -> Result<Transaction, DeliveryError> {
		let nonce = self
			.provider
			.get_transaction_count(from)
			.pending()
			.await
			.map_err(|e| DeliveryError::Build(format!("Failed to get nonce: {}", e)))?;

		// Surfaces contract reverts before anything is broadcast.
		let gas_limit = self
			.provider
			.estimate_gas(to_request(&tx, from))
			.await
			.map_err(|e| DeliveryError::Build(format!("Gas estimation failed: {}", e)))?;

		tx.nonce = Some(nonce);
		tx.gas_limit = Some(gas_limit);
		self.fill_fees(&mut tx).await?;

		debug!(nonce, gas_limit, "Filled transaction");
		Ok(tx)
	}

	async fn broadcast(&self, tx: &SignedTransaction) -> Result<TransactionHash, DeliveryError> {
		let pending = self
			.provider
			.send_raw_transaction(&tx.raw)
			.await
			.map_err(|e| DeliveryError::Broadcast(e.to_string()))?;

		Ok(TransactionHash(*pending.tx_hash()))
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let receipt = self
			.provider
			.get_transaction_receipt(hash.0)
			.await
			.map_err(|e| DeliveryError::Receipt(e.to_string()))?;

		Ok(receipt.map(|receipt| TransactionReceipt {
			hash: TransactionHash(receipt.transaction_hash),
			block_number: receipt.block_number.unwrap_or(0),
			success: receipt.status(),
		}))
	}
}

/// Factory function to create a delivery provider from the `[chain]` table.
///
/// Required configuration parameters:
/// - `rpc_url`: HTTP(S) JSON-RPC endpoint
pub fn create_http_delivery(config: &toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| DeliveryError::InvalidConfig("rpc_url is required".to_string()))?;

	Ok(Box::new(AlloyDelivery::new(rpc_url)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, U256};

	#[test]
	fn test_rejects_non_http_endpoints() {
		assert!(matches!(
			AlloyDelivery::new("not a url"),
			Err(DeliveryError::InvalidConfig(_))
		));
		assert!(matches!(
			AlloyDelivery::new("ws://localhost:8546"),
			Err(DeliveryError::InvalidConfig(_))
		));
		assert!(AlloyDelivery::new("https://api.avax.network/ext/bc/C/rpc").is_ok());
	}

	#[test]
	fn test_factory_reads_rpc_url() {
		let config: toml::Value = toml::from_str("rpc_url = \"http://localhost:8545\"").unwrap();
		assert!(create_http_delivery(&config).is_ok());

		let empty: toml::Value = toml::from_str("chain_id = 1").unwrap();
		assert!(matches!(
			create_http_delivery(&empty),
			Err(DeliveryError::InvalidConfig(_))
		));
	}

	#[test]
	fn test_request_carries_call_fields() {
		let tx = Transaction::call(
			Address::repeat_byte(0x99),
			Bytes::from(vec![1, 2, 3]),
			43114,
		);
		let from = Address::repeat_byte(0x01);
		let request = to_request(&tx, from);

		assert_eq!(request.from, Some(from));
		assert_eq!(request.to, Some(TxKind::Call(Address::repeat_byte(0x99))));
		assert_eq!(request.value, Some(U256::ZERO));
		assert_eq!(request.chain_id, Some(43114));
		assert_eq!(request.input.input().cloned(), Some(Bytes::from(vec![1, 2, 3])));
	}
}
