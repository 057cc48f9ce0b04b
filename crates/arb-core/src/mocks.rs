//! Scripted collaborators for engine and submitter tests.

use crate::{ArbEngine, ExecutionSubmitter};
use alloy_primitives::{keccak256, Address, U256};
use arb_account::{AccountError, AccountInterface, AccountService};
use arb_delivery::{DeliveryError, DeliveryInterface, DeliveryService};
use arb_discovery::{DiscoveryInterface, DiscoveryService, FeedQuery, FetchError};
use arb_order::MatchingContract;
use arb_types::{
	ArbEvent, EventBus, Listing, RawOrder, SignedTransaction, Transaction, TransactionHash,
	TransactionReceipt,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CHAIN_ID: u64 = 43114;

pub fn contract_address() -> Address {
	Address::repeat_byte(0x99)
}

pub fn raw_order(is_ask: bool, price: &str) -> RawOrder {
	RawOrder {
		is_order_ask: is_ask,
		signer: Some(format!("0x{}", (if is_ask { "22" } else { "44" }).repeat(20))),
		collection: Some(format!("0x{}", "11".repeat(20))),
		strategy: Some(format!("0x{}", "33".repeat(20))),
		currency: Some(format!("0x{}", "55".repeat(20))),
		params: None,
		price: Some(price.to_string()),
		token_id: Some("7".to_string()),
		amount: Some("1".to_string()),
		nonce: Some("1".to_string()),
		start_time: Some("1650000000".to_string()),
		end_time: Some("1660000000".to_string()),
		min_percentage_to_ask: Some("9000".to_string()),
		v: Some(27),
		r: Some(format!("0x{}", "0a".repeat(32))),
		s: Some(format!("0x{}", "0b".repeat(32))),
	}
}

pub fn listing(id: &str, ask_price: &str, bid_price: &str) -> Listing {
	Listing {
		item_id: id.to_string(),
		collection: format!("0x{}", "11".repeat(20)),
		chain_token_id: "7".to_string(),
		current_ask: Some(raw_order(true, ask_price)),
		best_bid: Some(raw_order(false, bid_price)),
	}
}

pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<ArbEvent>) -> Vec<ArbEvent> {
	let mut events = Vec::new();
	while let Ok(event) = rx.try_recv() {
		events.push(event);
	}
	events
}

/// Feed that serves scripted pages, then empty pages.
pub struct MockFeed {
	pages: Mutex<VecDeque<Result<Vec<Listing>, FetchError>>>,
	calls: Arc<AtomicUsize>,
}

impl MockFeed {
	pub fn new(pages: Vec<Result<Vec<Listing>, FetchError>>) -> Self {
		Self {
			pages: Mutex::new(pages.into()),
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn calls(&self) -> Arc<AtomicUsize> {
		self.calls.clone()
	}
}

#[async_trait]
impl DiscoveryInterface for MockFeed {
	fn name(&self) -> &str {
		"mock"
	}

	async fn fetch_listings(&self, _query: &FeedQuery) -> Result<Vec<Listing>, FetchError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let next = self.pages.lock().unwrap().pop_front();
		next.unwrap_or_else(|| Ok(Vec::new()))
	}
}

pub enum Inclusion {
	Immediate { success: bool },
	Never,
}

/// Shared record of what the chain mock was asked to do.
#[derive(Clone, Default)]
pub struct ChainLog {
	prepared: Arc<Mutex<Vec<Transaction>>>,
	broadcasts: Arc<Mutex<Vec<SignedTransaction>>>,
}

impl ChainLog {
	pub fn prepared(&self) -> Vec<Transaction> {
		self.prepared.lock().unwrap().clone()
	}

	pub fn broadcasts(&self) -> Vec<SignedTransaction> {
		self.broadcasts.lock().unwrap().clone()
	}
}

pub struct MockChain {
	chain_id: u64,
	log: ChainLog,
	prepare_failures: AtomicUsize,
	reject_broadcasts: bool,
	inclusion: Inclusion,
}

impl MockChain {
	pub fn new(inclusion: Inclusion) -> Self {
		Self {
			chain_id: CHAIN_ID,
			log: ChainLog::default(),
			prepare_failures: AtomicUsize::new(0),
			reject_broadcasts: false,
			inclusion,
		}
	}

	pub fn with_chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	/// Makes the next `count` prepare calls fail as a reverting estimate would.
	pub fn failing_prepares(self, count: usize) -> Self {
		self.prepare_failures.store(count, Ordering::SeqCst);
		self
	}

	pub fn rejecting_broadcasts(mut self) -> Self {
		self.reject_broadcasts = true;
		self
	}

	pub fn log(&self) -> ChainLog {
		self.log.clone()
	}
}

#[async_trait]
impl DeliveryInterface for MockChain {
	async fn chain_id(&self) -> Result<u64, DeliveryError> {
		Ok(self.chain_id)
	}

	async fn prepare(&self, mut tx: Transaction, _from: Address) -> Result<Transaction, DeliveryError> {
		let mut prepared = self.log.prepared.lock().unwrap();
		tx.nonce = Some(prepared.len() as u64);
		prepared.push(tx.clone());

		let remaining = self.prepare_failures.load(Ordering::SeqCst);
		if remaining > 0 {
			self.prepare_failures.store(remaining - 1, Ordering::SeqCst);
			return Err(DeliveryError::Build(
				"Gas estimation failed: execution reverted".to_string(),
			));
		}

		tx.gas_limit = Some(350_000);
		tx.max_fee_per_gas = Some(30_000_000_000);
		tx.max_priority_fee_per_gas = Some(1_500_000_000);
		Ok(tx)
	}

	async fn broadcast(&self, tx: &SignedTransaction) -> Result<TransactionHash, DeliveryError> {
		if self.reject_broadcasts {
			return Err(DeliveryError::Broadcast("nonce too low".to_string()));
		}
		self.log.broadcasts.lock().unwrap().push(tx.clone());
		Ok(tx.hash)
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		match self.inclusion {
			Inclusion::Immediate { success } => Ok(Some(TransactionReceipt {
				hash: *hash,
				block_number: 40_000_000,
				success,
			})),
			Inclusion::Never => Ok(None),
		}
	}
}

pub struct MockAccount {
	address: Address,
	fail: bool,
}

impl MockAccount {
	pub fn new() -> Self {
		Self {
			address: Address::repeat_byte(0xee),
			fail: false,
		}
	}

	pub fn failing() -> Self {
		Self {
			fail: true,
			..Self::new()
		}
	}
}

#[async_trait]
impl AccountInterface for MockAccount {
	fn address(&self) -> Address {
		self.address
	}

	async fn sign_transaction(&self, tx: &Transaction) -> Result<SignedTransaction, AccountError> {
		if self.fail {
			return Err(AccountError::SigningFailed("key unavailable".to_string()));
		}
		let mut preimage = tx.data.to_vec();
		preimage.extend_from_slice(&tx.nonce.unwrap_or_default().to_be_bytes());
		Ok(SignedTransaction {
			hash: TransactionHash(keccak256(&preimage)),
			raw: tx.data.clone(),
		})
	}
}

pub fn submitter(chain: MockChain, account: MockAccount, bus: &EventBus) -> ExecutionSubmitter {
	ExecutionSubmitter::new(
		MatchingContract::new(contract_address(), U256::ZERO),
		AccountService::new(Box::new(account)),
		DeliveryService::new(Box::new(chain), Duration::from_millis(500)),
		CHAIN_ID,
		Duration::from_secs(10),
		bus.clone(),
	)
}

pub fn engine(feed: MockFeed, chain: MockChain, account: MockAccount) -> ArbEngine {
	let bus = EventBus::new(256);
	let submitter = submitter(chain, account, &bus);
	ArbEngine::new(
		DiscoveryService::new(Box::new(feed), FeedQuery::default()),
		submitter,
		bus,
		Duration::from_secs(1),
	)
}
