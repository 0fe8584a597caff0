//! Board engine facade.
//!
//! Owns the store, the page window, the transition controller and the
//! poller task, and hands the display layer a watch channel carrying the
//! current view snapshot.

use crate::controller::{TransitionController, TransitionError, TransitionScope};
use crate::pagination::PageWindow;
use crate::poller::{Poller, PollerCommand};
use crate::view::ViewPublisher;
use board_client::BackendService;
use board_config::BoardConfig;
use board_store::OrderStore;
use board_types::{BoardView, Order, OrderId, OrderStatus, StatusFilter, StatusRollup, WorkerRef};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

struct PollerTask {
	commands: mpsc::UnboundedSender<PollerCommand>,
	handle: JoinHandle<()>,
}

/// One restaurant's order board engine.
///
/// All state is transient and rebuilt from the backend on start; the
/// engine holds no resources beyond the poller task, which
/// [`stop`](BoardEngine::stop) releases deterministically.
pub struct BoardEngine {
	config: BoardConfig,
	store: Arc<OrderStore>,
	backend: Arc<BackendService>,
	window: Arc<PageWindow>,
	publisher: Arc<ViewPublisher>,
	controller: TransitionController,
	view_rx: watch::Receiver<BoardView>,
	poller: Mutex<Option<PollerTask>>,
}

impl BoardEngine {
	/// Creates an engine over the given backend. Nothing is fetched
	/// until [`start`](BoardEngine::start).
	pub fn new(config: BoardConfig, backend: BackendService) -> Self {
		let backend = Arc::new(backend);
		let store = Arc::new(OrderStore::new());
		let window = Arc::new(PageWindow::new(config.initial_limit));
		let (publisher, view_rx) = ViewPublisher::new(store.clone(), window.clone());
		let controller =
			TransitionController::new(backend.clone(), store.clone(), publisher.clone());

		BoardEngine {
			config,
			store,
			backend,
			window,
			publisher,
			controller,
			view_rx,
			poller: Mutex::new(None),
		}
	}

	/// Starts the poll loop: one immediate fetch-reconcile cycle, then
	/// one per configured interval. A second call is a no-op.
	pub fn start(&self) {
		let mut poller = self.poller.lock().unwrap();
		if poller.is_some() {
			tracing::warn!("Engine already started");
			return;
		}

		let (commands, handle) = Poller::new(
			self.backend.clone(),
			self.store.clone(),
			self.window.clone(),
			self.publisher.clone(),
			Duration::from_secs(self.config.poll_interval_seconds),
			self.config.statuses.clone(),
		)
		.spawn();

		tracing::info!(
			interval_seconds = self.config.poll_interval_seconds,
			limit = self.config.initial_limit,
			"Board engine started"
		);
		*poller = Some(PollerTask { commands, handle });
	}

	/// Stops the poll loop and waits for it to finish. Safe to call
	/// multiple times.
	pub async fn stop(&self) {
		let task = self.poller.lock().unwrap().take();
		if let Some(task) = task {
			let _ = task.commands.send(PollerCommand::Stop);
			let _ = task.handle.await;
			tracing::info!("Board engine stopped");
		}
	}

	/// Subscribes to published view snapshots.
	pub fn subscribe(&self) -> watch::Receiver<BoardView> {
		self.view_rx.clone()
	}

	/// The most recently published view.
	pub fn current_view(&self) -> BoardView {
		self.view_rx.borrow().clone()
	}

	/// Replaces the status filter and refetches immediately. Previously
	/// seen orders stay in the store.
	pub fn set_filter(&self, filter: StatusFilter) {
		self.send(PollerCommand::SetFilter(filter));
	}

	/// Grows the page window by the configured increment and refetches.
	pub fn load_more(&self) {
		self.send(PollerCommand::GrowLimit(self.config.load_more_increment));
	}

	/// Runs one fetch-reconcile cycle outside the regular interval.
	pub fn refresh(&self) {
		self.send(PollerCommand::Refresh);
	}

	fn send(&self, command: PollerCommand) {
		let poller = self.poller.lock().unwrap();
		match poller.as_ref() {
			Some(task) => {
				let _ = task.commands.send(command);
			}
			None => tracing::warn!(?command, "Engine not started; command dropped"),
		}
	}

	/// Claims a pending order for a worker.
	pub async fn start_order(
		&self,
		order_id: &OrderId,
		worker: &WorkerRef,
	) -> Result<Order, TransitionError> {
		self.controller.start_order(order_id, worker).await
	}

	/// Requests a transition for the given scope. See
	/// [`TransitionController::transition`].
	pub async fn transition(
		&self,
		order_id: &OrderId,
		scope: TransitionScope,
		target: OrderStatus,
		worker: Option<&WorkerRef>,
	) -> Result<Order, TransitionError> {
		self.controller
			.transition(order_id, scope, target, worker)
			.await
	}

	/// Who derives the overall status from category completion.
	pub fn rollup(&self) -> StatusRollup {
		self.config.status_rollup
	}

	/// Direct access to the transition controller.
	pub fn controller(&self) -> &TransitionController {
		&self.controller
	}
}
