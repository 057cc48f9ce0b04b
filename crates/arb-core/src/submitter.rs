//! Execution of a single opportunity.

use arb_account::AccountService;
use arb_delivery::DeliveryService;
use arb_order::MatchingContract;
use arb_types::{
	ArbEvent, DeliveryEvent, EventBus, FailureReason, Opportunity, SignedTransaction,
	SubmissionOutcome, TransactionHash,
};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::CoreError;

/// Builds, signs, broadcasts and awaits the matching transaction for one
/// opportunity.
///
/// Every failure is contained in the returned [`SubmissionOutcome`]; nothing
/// is retried.
pub struct ExecutionSubmitter {
	contract: MatchingContract,
	account: AccountService,
	delivery: DeliveryService,
	chain_id: u64,
	confirmation_timeout: Duration,
	event_bus: EventBus,
}

impl ExecutionSubmitter {
	pub fn new(
		contract: MatchingContract,
		account: AccountService,
		delivery: DeliveryService,
		chain_id: u64,
		confirmation_timeout: Duration,
		event_bus: EventBus,
	) -> Self {
		Self {
			contract,
			account,
			delivery,
			chain_id,
			confirmation_timeout,
			event_bus,
		}
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub async fn submit(&self, opportunity: &Opportunity) -> SubmissionOutcome {
		let item_id = opportunity.item_id.as_str();

		let signed = match self.build(opportunity).await {
			Ok(signed) => signed,
			Err(e) => return self.fail(item_id, FailureReason::Build, None, e.to_string()),
		};

		let tx_hash = match self.delivery.broadcast(&signed).await {
			Ok(tx_hash) => tx_hash,
			Err(e) => return self.fail(item_id, FailureReason::Broadcast, None, e.to_string()),
		};

		info!(item_id, tx_hash = %tx_hash, "Transaction pending");
		self.event_bus
			.publish(ArbEvent::Delivery(DeliveryEvent::TransactionPending {
				item_id: item_id.to_string(),
				tx_hash,
			}));

		match self
			.delivery
			.wait_for_confirmation(&tx_hash, self.confirmation_timeout)
			.await
		{
			Ok(receipt) => {
				if receipt.success {
					info!(
						item_id,
						tx_hash = %tx_hash,
						block = receipt.block_number,
						"Transaction confirmed"
					);
				} else {
					error!(
						item_id,
						tx_hash = %tx_hash,
						block = receipt.block_number,
						"Transaction reverted"
					);
				}
				self.event_bus
					.publish(ArbEvent::Delivery(DeliveryEvent::TransactionConfirmed {
						item_id: item_id.to_string(),
						receipt: receipt.clone(),
					}));
				SubmissionOutcome::Confirmed { tx_hash, receipt }
			}
			Err(e) => self.fail(
				item_id,
				FailureReason::AwaitTimeout,
				Some(tx_hash),
				e.to_string(),
			),
		}
	}

	async fn build(&self, opportunity: &Opportunity) -> Result<SignedTransaction, CoreError> {
		let tx = self.contract.match_transaction(opportunity, self.chain_id)?;
		let tx = self.delivery.prepare(tx, self.account.address()).await?;
		Ok(self.account.sign(&tx).await?)
	}

	fn fail(
		&self,
		item_id: &str,
		reason: FailureReason,
		tx_hash: Option<TransactionHash>,
		cause: String,
	) -> SubmissionOutcome {
		match &tx_hash {
			Some(hash) => warn!(item_id, %reason, tx_hash = %hash, error = %cause, "Submission failed"),
			None => warn!(item_id, %reason, error = %cause, "Submission failed"),
		}

		self.event_bus
			.publish(ArbEvent::Delivery(DeliveryEvent::TransactionFailed {
				item_id: item_id.to_string(),
				reason,
				tx_hash,
				error: cause.clone(),
			}));

		SubmissionOutcome::Failed {
			reason,
			tx_hash,
			cause,
		}
	}
}
