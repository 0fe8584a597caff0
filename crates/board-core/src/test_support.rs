//! Scripted backend used by engine tests.
//!
//! Responses are queued ahead of time; every call is recorded so tests
//! can assert exactly what the engine asked the backend for.

use async_trait::async_trait;
use board_client::{BackendError, BackendInterface};
use board_types::{
	Category, Order, OrderId, OrderPage, OrderPatch, OrderStatus, StatusFilter,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct State {
	pages: Mutex<VecDeque<Result<OrderPage, ()>>>,
	patches: Mutex<VecDeque<Result<OrderPatch, ()>>>,
	fetches: Mutex<Vec<(String, usize)>>,
	order_calls: Mutex<Vec<(OrderId, OrderStatus, Option<String>)>>,
	category_calls: Mutex<Vec<(OrderId, Category, OrderStatus)>>,
	in_flight: AtomicUsize,
	max_in_flight: AtomicUsize,
}

/// Backend double with queued responses and recorded calls.
///
/// When the page queue runs dry, fetches answer with an empty page so
/// polling tests can run any number of cycles.
#[derive(Clone, Default)]
pub(crate) struct ScriptedBackend {
	state: Arc<State>,
	fetch_delay: Duration,
}

impl ScriptedBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds artificial latency to every fetch.
	pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
		self.fetch_delay = delay;
		self
	}

	pub fn push_page(&self, page: OrderPage) {
		self.state.pages.lock().unwrap().push_back(Ok(page));
	}

	pub fn push_page_error(&self) {
		self.state.pages.lock().unwrap().push_back(Err(()));
	}

	pub fn push_patch(&self, patch: OrderPatch) {
		self.state.patches.lock().unwrap().push_back(Ok(patch));
	}

	pub fn push_patch_error(&self) {
		self.state.patches.lock().unwrap().push_back(Err(()));
	}

	pub fn fetch_count(&self) -> usize {
		self.state.fetches.lock().unwrap().len()
	}

	pub fn last_fetch(&self) -> Option<(String, usize)> {
		self.state.fetches.lock().unwrap().last().cloned()
	}

	pub fn order_calls(&self) -> Vec<(OrderId, OrderStatus, Option<String>)> {
		self.state.order_calls.lock().unwrap().clone()
	}

	pub fn category_calls(&self) -> Vec<(OrderId, Category, OrderStatus)> {
		self.state.category_calls.lock().unwrap().clone()
	}

	pub fn max_in_flight(&self) -> usize {
		self.state.max_in_flight.load(Ordering::SeqCst)
	}

	fn next_patch(&self) -> Result<OrderPatch, BackendError> {
		match self.state.patches.lock().unwrap().pop_front() {
			Some(Ok(patch)) => Ok(patch),
			Some(Err(())) | None => Err(BackendError::Rejected {
				status: 500,
				message: "scripted failure".into(),
			}),
		}
	}
}

#[async_trait]
impl BackendInterface for ScriptedBackend {
	async fn fetch_orders(
		&self,
		filter: &StatusFilter,
		limit: usize,
	) -> Result<OrderPage, BackendError> {
		let in_flight = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.state
			.max_in_flight
			.fetch_max(in_flight, Ordering::SeqCst);
		self.state
			.fetches
			.lock()
			.unwrap()
			.push((filter.query_value(), limit));

		if !self.fetch_delay.is_zero() {
			tokio::time::sleep(self.fetch_delay).await;
		}

		let result = match self.state.pages.lock().unwrap().pop_front() {
			Some(Ok(page)) => Ok(page),
			Some(Err(())) => Err(BackendError::Network("scripted failure".into())),
			None => Ok(page(Vec::new(), 0)),
		};
		self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
		result
	}

	async fn update_order_status(
		&self,
		order_id: &OrderId,
		target: OrderStatus,
		worker_id: Option<&str>,
	) -> Result<OrderPatch, BackendError> {
		self.state.order_calls.lock().unwrap().push((
			order_id.clone(),
			target,
			worker_id.map(str::to_string),
		));
		self.next_patch()
	}

	async fn update_category_status(
		&self,
		order_id: &OrderId,
		category: Category,
		target: OrderStatus,
	) -> Result<OrderPatch, BackendError> {
		self.state
			.category_calls
			.lock()
			.unwrap()
			.push((order_id.clone(), category, target));
		self.next_patch()
	}
}

/// Builds a minimal order record for tests.
pub(crate) fn order(id: u64, status: OrderStatus, start_time: &str) -> Order {
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

/// Builds a page around the given results.
pub(crate) fn page(results: Vec<Order>, total: u64) -> OrderPage {
	OrderPage {
		results,
		next_offset: None,
		total,
	}
}
