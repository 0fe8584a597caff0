//! API types for the backend query endpoint and the published board view.

use crate::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// One page of orders from the backend query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
	/// Orders matching the requested statuses, bounded by the requested
	/// limit.
	pub results: Vec<Order>,
	/// Offset of the next page, or `None` when this page is the last.
	#[serde(default)]
	pub next_offset: Option<u64>,
	/// Total number of orders matching the filter, across all pages.
	#[serde(default)]
	pub total: u64,
}

/// Set of overall statuses requested from the backend.
///
/// The filter restricts what is fetched and displayed, never what the
/// store retains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusFilter(Vec<OrderStatus>);

impl StatusFilter {
	/// Filter matching every status, the board's starting point.
	pub fn all() -> Self {
		StatusFilter(vec![
			OrderStatus::Pending,
			OrderStatus::InProgress,
			OrderStatus::Completed,
			OrderStatus::PickedUp,
			OrderStatus::Cancelled,
		])
	}

	pub fn new(statuses: Vec<OrderStatus>) -> Self {
		StatusFilter(statuses)
	}

	pub fn contains(&self, status: OrderStatus) -> bool {
		self.0.contains(&status)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Comma-separated wire form for the `statuses` query parameter.
	pub fn query_value(&self) -> String {
		self.0
			.iter()
			.map(|s| s.as_str())
			.collect::<Vec<_>>()
			.join(",")
	}
}

impl Default for StatusFilter {
	fn default() -> Self {
		StatusFilter::all()
	}
}

/// The reconciled, sorted, truncated order list published to the display
/// layer after every poll cycle and every applied transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardView {
	/// Orders sorted newest first, truncated to the requested window.
	pub orders: Vec<Order>,
	/// Total matching orders as of the last page fetch.
	pub total: u64,
	/// Whether the backend holds more orders than the current window.
	pub has_more: bool,
}
