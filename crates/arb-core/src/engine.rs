//! The poll loop.
//!
//! One cycle fetches a page of listings, detects crossing ask/bid pairs and
//! submits them one after another. Cycles never overlap; the loop sleeps for
//! the poll interval between them and only stops on the shutdown signal.

use arb_discovery::DiscoveryService;
use arb_types::{
	ArbEvent, CycleEvent, DiscoveryEvent, EventBus, OpportunityEvent, SubmissionOutcome,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{CoreError, ExecutionSubmitter};

/// Counters for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
	pub listings: usize,
	pub opportunities: usize,
	/// Submissions that failed or were included but reverted.
	pub failures: usize,
}

/// Long-lived context shared by every cycle.
pub struct ArbEngine {
	discovery: DiscoveryService,
	submitter: ExecutionSubmitter,
	event_bus: EventBus,
	poll_interval: Duration,
}

impl ArbEngine {
	pub fn new(
		discovery: DiscoveryService,
		submitter: ExecutionSubmitter,
		event_bus: EventBus,
		poll_interval: Duration,
	) -> Self {
		Self {
			discovery,
			submitter,
			event_bus,
			poll_interval,
		}
	}

	/// Runs cycles until `shutdown` resolves.
	///
	/// The shutdown signal is only observed between cycles, so an in-flight
	/// inclusion wait always runs to completion or timeout. A signal that
	/// resolved during a cycle stops the loop as soon as that cycle ends.
	pub async fn run<F>(&self, shutdown: F) -> Result<(), CoreError>
	where
		F: Future<Output = ()>,
	{
		tokio::pin!(shutdown);
		info!(
			chain_id = self.submitter.chain_id(),
			poll_interval = ?self.poll_interval,
			"Starting arbitrage loop"
		);

		let mut cycle: u64 = 0;
		loop {
			cycle += 1;
			self.run_cycle(cycle).await;

			tokio::select! {
				_ = &mut shutdown => {
					info!(cycles = cycle, "Shutting down arbitrage loop");
					break;
				}
				_ = tokio::time::sleep(self.poll_interval) => {}
			}
		}

		Ok(())
	}

	/// Runs a single fetch, detect and submit pass.
	pub async fn run_cycle(&self, cycle: u64) -> CycleReport {
		debug!(cycle, "Starting poll cycle");
		let mut report = CycleReport::default();

		let listings = match self.discovery.fetch().await {
			Ok(listings) => listings,
			Err(e) => {
				warn!(cycle, error = %e, "Failed to fetch listings, skipping cycle");
				self.event_bus
					.publish(ArbEvent::Discovery(DiscoveryEvent::FetchFailed {
						error: e.to_string(),
					}));
				self.complete(cycle, report);
				return report;
			}
		};

		report.listings = listings.len();
		self.event_bus
			.publish(ArbEvent::Discovery(DiscoveryEvent::ListingsFetched {
				count: listings.len(),
			}));

		for opportunity in arb_order::detect(&listings) {
			report.opportunities += 1;
			info!(
				cycle,
				item_id = %opportunity.item_id,
				ask = %opportunity.ask.price,
				bid = %opportunity.bid.price,
				spread = %opportunity.spread(),
				"Opportunity detected"
			);
			self.event_bus
				.publish(ArbEvent::Opportunity(OpportunityEvent::Detected {
					opportunity: opportunity.clone(),
				}));

			let outcome = self.submitter.submit(&opportunity).await;
			if !succeeded(&outcome) {
				report.failures += 1;
			}
		}

		self.complete(cycle, report);
		report
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	fn complete(&self, cycle: u64, report: CycleReport) {
		if report.opportunities > 0 {
			info!(
				cycle,
				listings = report.listings,
				opportunities = report.opportunities,
				failures = report.failures,
				"Cycle completed"
			);
		} else {
			debug!(cycle, listings = report.listings, "Cycle completed");
		}

		self.event_bus.publish(ArbEvent::Cycle(CycleEvent::Completed {
			cycle,
			listings: report.listings,
			opportunities: report.opportunities,
			failures: report.failures,
		}));
	}
}

fn succeeded(outcome: &SubmissionOutcome) -> bool {
	match outcome {
		SubmissionOutcome::Confirmed { receipt, .. } => receipt.success,
		SubmissionOutcome::Failed { .. } => false,
	}
}
