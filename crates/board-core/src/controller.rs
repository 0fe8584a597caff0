//! Status transition controller.
//!
//! Validates that a requested transition only ever moves forward along
//! the status sequence, issues exactly one backend call, and folds the
//! authoritative response back into the store. The engine never computes
//! a "next status" itself; it decides which request is legal to make and
//! lets the backend own the result.

use crate::view::ViewPublisher;
use board_client::{BackendError, BackendService};
use board_store::OrderStore;
use board_types::{Category, Order, OrderId, OrderPatch, OrderStatus, WorkerRef};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What a transition targets: the whole order or one category
/// sub-workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionScope {
	Order,
	Category(Category),
}

impl fmt::Display for TransitionScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransitionScope::Order => f.write_str("order"),
			TransitionScope::Category(category) => write!(f, "{} category", category),
		}
	}
}

/// Errors that can occur when requesting a status transition.
#[derive(Debug, Error)]
pub enum TransitionError {
	/// The order has never been seen by the store.
	#[error("Order {0} is not tracked by the board")]
	UnknownOrder(OrderId),
	/// The order has no items in the targeted category, so that
	/// sub-workflow does not exist.
	#[error("Order {order} has no {category} items")]
	MissingCategory { order: OrderId, category: Category },
	/// The request would move the status backwards or sideways; the
	/// engine never asks the backend for those.
	#[error("Refusing non-forward transition of {scope} for order {order}: {from} -> {to}")]
	NotMonotonic {
		order: OrderId,
		scope: TransitionScope,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// The target status is one only the backend may enter.
	#[error("Transitions into '{0}' are backend-initiated only")]
	UnsupportedTarget(OrderStatus),
	/// Starting an order requires a worker reference to attach.
	#[error("A worker reference is required to start an order")]
	MissingWorker,
	/// The backend call itself failed; the store is unchanged.
	#[error(transparent)]
	Backend(#[from] BackendError),
}

/// Issues status transitions and merges their results.
pub struct TransitionController {
	backend: Arc<BackendService>,
	store: Arc<OrderStore>,
	publisher: Arc<ViewPublisher>,
}

impl TransitionController {
	pub fn new(
		backend: Arc<BackendService>,
		store: Arc<OrderStore>,
		publisher: Arc<ViewPublisher>,
	) -> Self {
		Self {
			backend,
			store,
			publisher,
		}
	}

	/// Claims a pending order for a worker: `pending -> in_progress`.
	///
	/// The worker's display name is attached speculatively to the merged
	/// record; if the backend's response carries its own name, the
	/// response wins.
	pub async fn start_order(
		&self,
		order_id: &OrderId,
		worker: &WorkerRef,
	) -> Result<Order, TransitionError> {
		self.transition(
			order_id,
			TransitionScope::Order,
			OrderStatus::InProgress,
			Some(worker),
		)
		.await
	}

	/// Marks one category's preparation finished:
	/// `in_progress -> completed`.
	pub async fn complete_category(
		&self,
		order_id: &OrderId,
		category: Category,
	) -> Result<Order, TransitionError> {
		self.transition(
			order_id,
			TransitionScope::Category(category),
			OrderStatus::Completed,
			None,
		)
		.await
	}

	/// Marks one category handed over: `completed -> picked_up`.
	pub async fn pick_up_category(
		&self,
		order_id: &OrderId,
		category: Category,
	) -> Result<Order, TransitionError> {
		self.transition(
			order_id,
			TransitionScope::Category(category),
			OrderStatus::PickedUp,
			None,
		)
		.await
	}

	/// Requests a status transition for the given scope.
	///
	/// Exactly one backend call is issued. On success the response patch
	/// is merged into the store and the updated record returned; on
	/// failure the store is left unchanged and the error surfaces to the
	/// caller. There is no automatic retry.
	pub async fn transition(
		&self,
		order_id: &OrderId,
		scope: TransitionScope,
		target: OrderStatus,
		worker: Option<&WorkerRef>,
	) -> Result<Order, TransitionError> {
		let order = self
			.store
			.get(order_id)
			.await
			.ok_or_else(|| TransitionError::UnknownOrder(order_id.clone()))?;

		let current = match scope {
			TransitionScope::Order => order.status,
			TransitionScope::Category(category) => order.category_status(category).ok_or(
				TransitionError::MissingCategory {
					order: order_id.clone(),
					category,
				},
			)?,
		};

		let to_rank = target
			.sequence_rank()
			.ok_or(TransitionError::UnsupportedTarget(target))?;
		let forward = match current.sequence_rank() {
			Some(from_rank) => to_rank > from_rank,
			// Cancelled is absorbing; nothing leaves it.
			None => false,
		};
		if !forward {
			return Err(TransitionError::NotMonotonic {
				order: order_id.clone(),
				scope,
				from: current,
				to: target,
			});
		}

		let assigning = scope == TransitionScope::Order && target == OrderStatus::InProgress;
		if assigning && worker.is_none() {
			return Err(TransitionError::MissingWorker);
		}

		let patch = match scope {
			TransitionScope::Order => {
				let worker_id = if assigning {
					worker.map(|w| w.id.as_str())
				} else {
					None
				};
				self.backend
					.update_order_status(order_id, target, worker_id)
					.await?
			}
			TransitionScope::Category(category) => {
				self.backend
					.update_category_status(order_id, category, target)
					.await?
			}
		};

		// Two-phase worker attach: the speculative display name goes in
		// first, then the authoritative response, so the backend wins any
		// conflict.
		if assigning {
			if let Some(worker) = worker {
				self.store
					.apply(OrderPatch::with_worker_name(
						order_id.clone(),
						worker.name.clone(),
					))
					.await;
			}
		}
		self.store.apply(patch).await;
		self.publisher.publish().await;

		tracing::info!(
			order_id = %order_id,
			scope = %scope,
			target = %target,
			"Transition applied"
		);

		self.store
			.get(order_id)
			.await
			.ok_or_else(|| TransitionError::UnknownOrder(order_id.clone()))
	}
}
