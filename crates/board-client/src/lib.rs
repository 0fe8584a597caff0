//! Backend transport module for the board engine.
//!
//! This module abstracts the restaurant backend that owns order truth.
//! It provides the interface the engine polls and mutates through, and an
//! HTTP implementation speaking the backend's JSON endpoints.

use async_trait::async_trait;
use board_types::{Category, OrderId, OrderPage, OrderPatch, OrderStatus, StatusFilter};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
	/// Error that occurs during network communication, including
	/// timeouts.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the backend answers with a non-success
	/// status.
	#[error("Backend rejected request ({status}): {message}")]
	Rejected { status: u16, message: String },
	/// Error that occurs when a response body cannot be decoded.
	#[error("Decode error: {0}")]
	Decode(String),
	/// Error that occurs when building the client from configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface to the order backend.
///
/// The engine depends only on this trait; the HTTP implementation lives
/// in [`implementations::http`], and tests substitute their own.
#[async_trait]
pub trait BackendInterface: Send + Sync {
	/// Fetches one page of orders restricted to the given overall
	/// statuses and bounded by `limit`.
	async fn fetch_orders(
		&self,
		filter: &StatusFilter,
		limit: usize,
	) -> Result<OrderPage, BackendError>;

	/// Requests a whole-order status transition.
	///
	/// `worker_id` is attached to the request body when present; the
	/// backend requires it on the transition into `in_progress`.
	async fn update_order_status(
		&self,
		order_id: &OrderId,
		target: OrderStatus,
		worker_id: Option<&str>,
	) -> Result<OrderPatch, BackendError>;

	/// Requests a status transition for one category sub-workflow.
	async fn update_category_status(
		&self,
		order_id: &OrderId,
		category: Category,
		target: OrderStatus,
	) -> Result<OrderPatch, BackendError>;
}

/// Service wrapping a backend implementation.
///
/// Adds structured logging around every call; the engine holds this
/// rather than the raw interface.
pub struct BackendService {
	backend: Box<dyn BackendInterface>,
}

impl BackendService {
	pub fn new(backend: Box<dyn BackendInterface>) -> Self {
		Self { backend }
	}

	/// Fetches one page of orders. See
	/// [`BackendInterface::fetch_orders`].
	pub async fn fetch_orders(
		&self,
		filter: &StatusFilter,
		limit: usize,
	) -> Result<OrderPage, BackendError> {
		let page = self.backend.fetch_orders(filter, limit).await?;
		tracing::debug!(
			returned = page.results.len(),
			total = page.total,
			limit,
			"Fetched order page"
		);
		Ok(page)
	}

	/// Requests a whole-order transition. See
	/// [`BackendInterface::update_order_status`].
	pub async fn update_order_status(
		&self,
		order_id: &OrderId,
		target: OrderStatus,
		worker_id: Option<&str>,
	) -> Result<OrderPatch, BackendError> {
		tracing::debug!(order_id = %order_id, target = %target, "Requesting order transition");
		self.backend
			.update_order_status(order_id, target, worker_id)
			.await
	}

	/// Requests a category transition. See
	/// [`BackendInterface::update_category_status`].
	pub async fn update_category_status(
		&self,
		order_id: &OrderId,
		category: Category,
		target: OrderStatus,
	) -> Result<OrderPatch, BackendError> {
		tracing::debug!(
			order_id = %order_id,
			category = %category,
			target = %target,
			"Requesting category transition"
		);
		self.backend
			.update_category_status(order_id, category, target)
			.await
	}
}
