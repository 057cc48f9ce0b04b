use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{FailureReason, Opportunity, TransactionHash, TransactionReceipt};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArbEvent {
	Discovery(DiscoveryEvent),
	Opportunity(OpportunityEvent),
	Delivery(DeliveryEvent),
	Cycle(CycleEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiscoveryEvent {
	ListingsFetched { count: usize },
	FetchFailed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OpportunityEvent {
	Detected { opportunity: Opportunity },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeliveryEvent {
	TransactionPending {
		item_id: String,
		tx_hash: TransactionHash,
	},
	TransactionConfirmed {
		item_id: String,
		receipt: TransactionReceipt,
	},
	TransactionFailed {
		item_id: String,
		reason: FailureReason,
		tx_hash: Option<TransactionHash>,
		error: String,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CycleEvent {
	Completed {
		cycle: u64,
		listings: usize,
		opportunities: usize,
		failures: usize,
	},
}

pub struct EventBus {
	sender: broadcast::Sender<ArbEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ArbEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event. Having no subscribers is not an error.
	pub fn publish(&self, event: ArbEvent) {
		let _ = self.sender.send(event);
	}
}

impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}
