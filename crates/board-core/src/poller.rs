//! Polling loop driving periodic fetch-reconcile cycles.
//!
//! The poller owns every fetch: timer ticks, filter changes and window
//! growth all funnel into one task, so cycles are serialized by
//! construction and a tick that would land while a cycle is in flight is
//! skipped outright rather than queued.

use crate::pagination::PageWindow;
use crate::view::ViewPublisher;
use board_client::BackendService;
use board_store::OrderStore;
use board_types::StatusFilter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Commands accepted by a running poller.
#[derive(Debug)]
pub enum PollerCommand {
	/// Replace the active status filter and fetch immediately. The store
	/// is not cleared; the filter affects what is requested, not what is
	/// retained.
	SetFilter(StatusFilter),
	/// Grow the requested page size and fetch immediately.
	GrowLimit(usize),
	/// Run one fetch-reconcile cycle now.
	Refresh,
	/// Stop the loop. The timer is cancelled with the task.
	Stop,
}

/// Fixed-interval fetch-reconcile loop.
pub struct Poller {
	backend: Arc<BackendService>,
	store: Arc<OrderStore>,
	window: Arc<PageWindow>,
	publisher: Arc<ViewPublisher>,
	period: Duration,
	filter: StatusFilter,
}

impl Poller {
	pub fn new(
		backend: Arc<BackendService>,
		store: Arc<OrderStore>,
		window: Arc<PageWindow>,
		publisher: Arc<ViewPublisher>,
		period: Duration,
		filter: StatusFilter,
	) -> Self {
		Poller {
			backend,
			store,
			window,
			publisher,
			period,
			filter,
		}
	}

	/// Spawns the loop, returning its command channel and task handle.
	///
	/// The first cycle runs immediately; afterwards one cycle runs per
	/// elapsed period.
	pub fn spawn(self) -> (mpsc::UnboundedSender<PollerCommand>, JoinHandle<()>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let handle = tokio::spawn(self.run(rx));
		(tx, handle)
	}

	async fn run(mut self, mut commands: mpsc::UnboundedReceiver<PollerCommand>) {
		let mut interval = tokio::time::interval(self.period);
		// Ticks that elapse while a cycle is in flight are dropped, not
		// queued; the next tick tries again.
		interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

		loop {
			tokio::select! {
				_ = interval.tick() => self.cycle().await,
				command = commands.recv() => match command {
					Some(PollerCommand::SetFilter(filter)) => {
						tracing::debug!(statuses = %filter.query_value(), "Status filter changed");
						self.filter = filter;
						self.cycle().await;
					}
					Some(PollerCommand::GrowLimit(increment)) => {
						let limit = self.window.grow(increment);
						tracing::debug!(limit, "Page window grown");
						self.cycle().await;
					}
					Some(PollerCommand::Refresh) => self.cycle().await,
					Some(PollerCommand::Stop) | None => break,
				},
			}
		}

		tracing::debug!("Poller stopped");
	}

	/// One fetch-reconcile round trip.
	///
	/// A failed cycle logs and leaves the store untouched; the fixed
	/// interval is the retry policy, so stale data stays visible until a
	/// later cycle succeeds.
	async fn cycle(&self) {
		let limit = self.window.limit();
		match self.backend.fetch_orders(&self.filter, limit).await {
			Ok(page) => {
				self.window.record_total(page.total);
				self.store.reconcile(page.results).await;
				self.publisher.publish().await;
			}
			Err(e) => {
				tracing::warn!(error = %e, "Poll cycle failed; keeping last known orders");
			}
		}
	}
}
