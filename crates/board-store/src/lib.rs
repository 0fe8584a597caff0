//! Order record store for the board engine.
//!
//! The store is the single source of local truth between polls: a keyed
//! map from order identifier to the last-known full record. It is a
//! superset cache, not a mirror of the last response. Records that fall
//! outside the current page or filter are retained, so repeated
//! "load more" calls never make previously seen rows disappear.

use board_types::{Order, OrderId, OrderPatch};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory superset cache of order records.
///
/// All mutation goes through [`reconcile`](OrderStore::reconcile) and
/// [`apply`](OrderStore::apply); readers observe either the pre- or the
/// post-merge state of a page, never a partially merged one.
#[derive(Debug, Default)]
pub struct OrderStore {
	entries: RwLock<HashMap<OrderId, Order>>,
}

impl OrderStore {
	pub fn new() -> Self {
		OrderStore {
			entries: RwLock::new(HashMap::new()),
		}
	}

	/// Merges a freshly fetched page into the store.
	///
	/// Every order in the page is inserted or replaces its entry; orders
	/// known from earlier pages but absent from this one are retained.
	/// The whole page is merged under one write lock so concurrent
	/// readers never see it half-applied.
	pub async fn reconcile(&self, page: Vec<Order>) {
		let mut entries = self.entries.write().await;
		for order in page {
			entries.insert(order.id.clone(), order);
		}
	}

	/// Shallow-merges a partial record, as returned by a transition call,
	/// into its entry.
	///
	/// When no entry exists the patch is promoted to a full record if it
	/// carries every required field; otherwise it is dropped, since a
	/// fragment alone cannot stand in for a record the backend has never
	/// shown us whole.
	pub async fn apply(&self, patch: OrderPatch) {
		let mut entries = self.entries.write().await;
		match entries.entry(patch.id.clone()) {
			Entry::Occupied(mut occupied) => patch.apply_to(occupied.get_mut()),
			Entry::Vacant(vacant) => match patch.into_order() {
				Some(order) => {
					vacant.insert(order);
				}
				None => {
					tracing::debug!(order_id = %vacant.key(), "Dropping patch for untracked order");
				}
			},
		}
	}

	/// Returns the current view: all entries sorted by creation timestamp
	/// descending, ties broken by identifier descending, truncated to
	/// `limit`.
	///
	/// The view is recomputed from store contents on every call; it is
	/// not a separately maintained structure.
	pub async fn view(&self, limit: usize) -> Vec<Order> {
		let entries = self.entries.read().await;
		let mut orders: Vec<Order> = entries.values().cloned().collect();
		orders.sort_by(|a, b| {
			b.start_time
				.cmp(&a.start_time)
				.then_with(|| b.id.cmp(&a.id))
		});
		orders.truncate(limit);
		orders
	}

	/// Returns a copy of one record, if tracked.
	pub async fn get(&self, id: &OrderId) -> Option<Order> {
		self.entries.read().await.get(id).cloned()
	}

	/// Number of tracked orders.
	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use board_types::OrderStatus;

	fn order(id: u64, status: OrderStatus, start_time: &str) -> Order {
		Order {
			id: OrderId::from(id),
			customer_name: format!("customer-{id}"),
			start_time: start_time.parse().unwrap(),
			status,
			food_status: None,
			beverage_status: None,
			total_price: "10.00".parse().unwrap(),
			worker_name: None,
			order_items: Vec::new(),
			food_eta_minutes: None,
			beverage_eta_minutes: None,
			estimated_food_ready_time: None,
			estimated_beverage_ready_time: None,
			reviewed: false,
		}
	}

	#[tokio::test]
	async fn reconcile_retains_orders_missing_from_later_pages() {
		let store = OrderStore::new();
		store
			.reconcile(vec![
				order(1, OrderStatus::Pending, "2026-03-01T12:00:00Z"),
				order(2, OrderStatus::Completed, "2026-03-01T11:00:00Z"),
			])
			.await;
		// Order 2 fell off the second page; it must survive the merge.
		store
			.reconcile(vec![
				order(1, OrderStatus::Pending, "2026-03-01T12:00:00Z"),
				order(3, OrderStatus::Pending, "2026-03-01T13:00:00Z"),
			])
			.await;

		let view = store.view(10).await;
		let ids: Vec<_> = view.iter().map(|o| o.id.as_str().to_string()).collect();
		assert_eq!(ids, vec!["3", "1", "2"]);
		let retained = store.get(&OrderId::from(2u64)).await.unwrap();
		assert_eq!(retained.status, OrderStatus::Completed);
	}

	#[tokio::test]
	async fn reconcile_is_idempotent() {
		let store = OrderStore::new();
		let page = vec![
			order(1, OrderStatus::Pending, "2026-03-01T12:00:00Z"),
			order(2, OrderStatus::InProgress, "2026-03-01T11:00:00Z"),
		];
		store.reconcile(page.clone()).await;
		let first = store.view(10).await;
		store.reconcile(page).await;
		let second = store.view(10).await;
		assert_eq!(first, second);
		assert_eq!(store.len().await, 2);
	}

	#[tokio::test]
	async fn latest_record_wins_on_replay() {
		let store = OrderStore::new();
		store
			.reconcile(vec![order(1, OrderStatus::Pending, "2026-03-01T12:00:00Z")])
			.await;
		store
			.reconcile(vec![order(
				1,
				OrderStatus::InProgress,
				"2026-03-01T12:00:00Z",
			)])
			.await;
		assert_eq!(store.len().await, 1);
		assert_eq!(
			store.get(&OrderId::from(1u64)).await.unwrap().status,
			OrderStatus::InProgress
		);
	}

	#[tokio::test]
	async fn view_sorts_newest_first_with_deterministic_ties() {
		let store = OrderStore::new();
		store
			.reconcile(vec![
				order(1, OrderStatus::Pending, "2026-03-01T12:00:00Z"),
				order(3, OrderStatus::Pending, "2026-03-01T12:00:00Z"),
				order(2, OrderStatus::Pending, "2026-03-01T14:00:00Z"),
			])
			.await;

		for _ in 0..3 {
			let ids: Vec<_> = store
				.view(10)
				.await
				.iter()
				.map(|o| o.id.as_str().to_string())
				.collect();
			// Newest first; equal timestamps fall back to id descending.
			assert_eq!(ids, vec!["2", "3", "1"]);
		}
	}

	#[tokio::test]
	async fn view_truncates_to_limit() {
		let store = OrderStore::new();
		store
			.reconcile(vec![
				order(1, OrderStatus::Pending, "2026-03-01T12:00:00Z"),
				order(2, OrderStatus::Pending, "2026-03-01T13:00:00Z"),
				order(3, OrderStatus::Pending, "2026-03-01T14:00:00Z"),
			])
			.await;
		assert_eq!(store.view(2).await.len(), 2);
		assert_eq!(store.view(10).await.len(), 3);
		assert!(store.view(0).await.is_empty());
	}

	#[tokio::test]
	async fn apply_merges_into_existing_entry() {
		let store = OrderStore::new();
		store
			.reconcile(vec![order(1, OrderStatus::Pending, "2026-03-01T12:00:00Z")])
			.await;

		let patch = OrderPatch {
			status: Some(OrderStatus::InProgress),
			worker_name: Some("Sam".into()),
			..OrderPatch::new(OrderId::from(1u64))
		};
		store.apply(patch).await;

		let merged = store.get(&OrderId::from(1u64)).await.unwrap();
		assert_eq!(merged.status, OrderStatus::InProgress);
		assert_eq!(merged.worker_name.as_deref(), Some("Sam"));
		assert_eq!(merged.customer_name, "customer-1");
	}

	#[tokio::test]
	async fn apply_drops_fragment_for_untracked_order() {
		let store = OrderStore::new();
		let patch = OrderPatch {
			status: Some(OrderStatus::InProgress),
			..OrderPatch::new(OrderId::from(5u64))
		};
		store.apply(patch).await;
		assert!(store.is_empty().await);
	}

	#[tokio::test]
	async fn apply_creates_entry_from_complete_patch() {
		let store = OrderStore::new();
		let patch = OrderPatch {
			customer_name: Some("Grace".into()),
			start_time: Some("2026-03-01T10:00:00Z".parse().unwrap()),
			status: Some(OrderStatus::Pending),
			total_price: Some("5.00".parse().unwrap()),
			..OrderPatch::new(OrderId::from(5u64))
		};
		store.apply(patch).await;
		assert_eq!(store.len().await, 1);
	}
}
