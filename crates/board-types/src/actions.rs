//! Read-side aggregation of the actions an order currently allows.
//!
//! The board never decides transitions on its own; this module only
//! answers "which buttons are legal right now" from backend-supplied
//! status fields, so a display layer cannot offer an illegal request.

use crate::{Category, Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Who derives the overall status once both category sub-workflows are
/// done.
///
/// The backend's roll-up behavior is deliberately not replicated locally.
/// `Backend` assumes the overall status follows on its own; `Explicit`
/// additionally offers a whole-order pick-up action once every present
/// category status has reached `picked_up`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusRollup {
	#[default]
	Backend,
	Explicit,
}

/// An action the board may legally request for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderAction {
	/// Claim the whole order: `pending -> in_progress`, carries a worker
	/// reference.
	StartOrder,
	/// Mark one category's preparation finished:
	/// `in_progress -> completed`.
	CompleteCategory { category: Category },
	/// Mark one category handed over: `completed -> picked_up`.
	PickUpCategory { category: Category },
	/// Request the whole-order pick-up explicitly. Only offered under
	/// [`StatusRollup::Explicit`].
	PickUpOrder,
}

/// Computes the legal next actions for an order.
///
/// A category with no items has no status and offers no action. Cancelled
/// orders offer nothing.
pub fn available_actions(order: &Order, rollup: StatusRollup) -> Vec<OrderAction> {
	if order.status == OrderStatus::Cancelled {
		return Vec::new();
	}

	let mut actions = Vec::new();

	if order.status == OrderStatus::Pending {
		actions.push(OrderAction::StartOrder);
	}

	for category in [Category::Food, Category::Beverage] {
		match order.category_status(category) {
			Some(OrderStatus::InProgress) => {
				actions.push(OrderAction::CompleteCategory { category });
			}
			Some(OrderStatus::Completed) => {
				actions.push(OrderAction::PickUpCategory { category });
			}
			_ => {}
		}
	}

	if rollup == StatusRollup::Explicit && !order.status.is_terminal() {
		let statuses: Vec<_> = [Category::Food, Category::Beverage]
			.into_iter()
			.filter_map(|c| order.category_status(c))
			.collect();
		if !statuses.is_empty() && statuses.iter().all(|s| *s == OrderStatus::PickedUp) {
			actions.push(OrderAction::PickUpOrder);
		}
	}

	actions
}
