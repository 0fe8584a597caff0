//! View publication to the display layer.

use crate::pagination::PageWindow;
use board_store::OrderStore;
use board_types::BoardView;
use std::sync::Arc;
use tokio::sync::watch;

/// Publishes the reconciled, sorted, truncated view after every change.
///
/// Both the poller and the transition controller publish through this;
/// the display layer holds the matching [`watch::Receiver`] and always
/// observes a complete snapshot.
pub struct ViewPublisher {
	store: Arc<OrderStore>,
	window: Arc<PageWindow>,
	tx: watch::Sender<BoardView>,
}

impl ViewPublisher {
	/// Creates a publisher over the given store and window, along with
	/// the receiver handed to the display layer.
	pub fn new(
		store: Arc<OrderStore>,
		window: Arc<PageWindow>,
	) -> (Arc<Self>, watch::Receiver<BoardView>) {
		let (tx, rx) = watch::channel(BoardView::default());
		(Arc::new(ViewPublisher { store, window, tx }), rx)
	}

	/// Recomputes the view from current store contents and publishes it.
	pub async fn publish(&self) {
		let limit = self.window.limit();
		let orders = self.store.view(limit).await;
		let total = self.window.total();
		let has_more = self.window.has_more(orders.len());
		self.tx.send_replace(BoardView {
			orders,
			total,
			has_more,
		});
	}
}
