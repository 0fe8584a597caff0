//! Order domain types for the board engine.
//!
//! This module defines the order record as the backend serves it, the
//! fulfillment status lifecycle shared by whole orders and their food and
//! beverage sub-workflows, and the partial-record patch type used to fold
//! transition responses back into the local store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque, server-assigned order identifier.
///
/// The backend serializes identifiers as JSON numbers but nothing in the
/// engine depends on them being numeric, so they are kept as strings. The
/// deserializer accepts either form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrderId(String);

impl OrderId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for OrderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for OrderId {
	fn from(value: &str) -> Self {
		OrderId(value.to_string())
	}
}

impl From<String> for OrderId {
	fn from(value: String) -> Self {
		OrderId(value)
	}
}

impl From<u64> for OrderId {
	fn from(value: u64) -> Self {
		OrderId(value.to_string())
	}
}

impl<'de> Deserialize<'de> for OrderId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct IdVisitor;

		impl de::Visitor<'_> for IdVisitor {
			type Value = OrderId;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a string or integer order identifier")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<OrderId, E> {
				Ok(OrderId(v.to_string()))
			}

			fn visit_u64<E: de::Error>(self, v: u64) -> Result<OrderId, E> {
				Ok(OrderId(v.to_string()))
			}

			fn visit_i64<E: de::Error>(self, v: i64) -> Result<OrderId, E> {
				Ok(OrderId(v.to_string()))
			}
		}

		deserializer.deserialize_any(IdVisitor)
	}
}

/// Error returned when a status token cannot be parsed.
#[derive(Debug, Error)]
#[error("Unrecognized status '{0}'")]
pub struct ParseStatusError(String);

/// Error returned when a category token cannot be parsed.
#[derive(Debug, Error)]
#[error("Unrecognized category '{0}'")]
pub struct ParseCategoryError(String);

/// Fulfillment status of an order or of one of its category sub-workflows.
///
/// Statuses progress forward along the fixed sequence
/// `pending -> in_progress -> completed -> picked_up`. `cancelled` is a
/// terminal state the backend may enter from any non-terminal status; the
/// engine never requests it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order has been placed but no worker has claimed it.
	Pending,
	/// A worker has claimed the order and preparation has started.
	InProgress,
	/// Preparation is finished and the order awaits pick-up.
	Completed,
	/// The order has been handed over.
	PickedUp,
	/// The order was cancelled by the backend. Terminal.
	Cancelled,
}

impl OrderStatus {
	/// Position of this status in the forward sequence, or `None` for
	/// `cancelled`, which sits outside it.
	pub fn sequence_rank(self) -> Option<u8> {
		match self {
			OrderStatus::Pending => Some(0),
			OrderStatus::InProgress => Some(1),
			OrderStatus::Completed => Some(2),
			OrderStatus::PickedUp => Some(3),
			OrderStatus::Cancelled => None,
		}
	}

	/// The immediate successor in the forward sequence, if any.
	pub fn next_in_sequence(self) -> Option<OrderStatus> {
		match self {
			OrderStatus::Pending => Some(OrderStatus::InProgress),
			OrderStatus::InProgress => Some(OrderStatus::Completed),
			OrderStatus::Completed => Some(OrderStatus::PickedUp),
			OrderStatus::PickedUp | OrderStatus::Cancelled => None,
		}
	}

	/// Returns true for states no transition can leave.
	pub fn is_terminal(self) -> bool {
		matches!(self, OrderStatus::PickedUp | OrderStatus::Cancelled)
	}

	/// Wire token for this status.
	pub fn as_str(self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::InProgress => "in_progress",
			OrderStatus::Completed => "completed",
			OrderStatus::PickedUp => "picked_up",
			OrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ParseStatusError;

	/// Parses a status token, accepting the spaced human form the backend
	/// itself normalizes (`"Picked Up"` -> `picked_up`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
			"pending" => Ok(OrderStatus::Pending),
			"in_progress" => Ok(OrderStatus::InProgress),
			"completed" => Ok(OrderStatus::Completed),
			"picked_up" => Ok(OrderStatus::PickedUp),
			"cancelled" => Ok(OrderStatus::Cancelled),
			_ => Err(ParseStatusError(s.to_string())),
		}
	}
}

/// Preparation category of a line item. Food and beverage preparation
/// progress independently within one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Food,
	Beverage,
}

impl Category {
	/// Wire token for this category.
	pub fn as_str(self) -> &'static str {
		match self {
			Category::Food => "food",
			Category::Beverage => "beverage",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Category {
	type Err = ParseCategoryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"food" => Ok(Category::Food),
			"beverage" => Ok(Category::Beverage),
			_ => Err(ParseCategoryError(s.to_string())),
		}
	}
}

/// Reference to the staff member who claimed an order.
///
/// Attached at most once, on the transition into `in_progress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRef {
	/// Backend identifier of the worker.
	pub id: String,
	/// Display name shown on the board.
	pub name: String,
}

/// One ordered line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
	/// Menu name of the item.
	pub item_name: String,
	/// Preparation category. Items the backend leaves uncategorized count
	/// as food, matching the backend's own grouping.
	#[serde(deserialize_with = "deserialize_item_category", default = "default_item_category")]
	pub category: Category,
	/// How many of this item were ordered.
	pub quantity: u32,
	/// Ingredient names the customer asked to leave out.
	#[serde(default)]
	pub unwanted_ingredient_names: Vec<String>,
}

fn default_item_category() -> Category {
	Category::Food
}

fn deserialize_item_category<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: Option<String> = Option::deserialize(deserializer)?;
	Ok(match raw {
		Some(s) if s.eq_ignore_ascii_case("beverage") => Category::Beverage,
		_ => Category::Food,
	})
}

/// A full order record as served by the backend.
///
/// The engine never computes status fields locally; every field here is
/// backend-supplied truth, merged verbatim into the store. ETA and review
/// fields are carried for display and never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier within the restaurant scope. Immutable.
	pub id: OrderId,
	/// Name of the customer who placed the order.
	pub customer_name: String,
	/// Creation timestamp; the board sorts newest first on this field.
	pub start_time: DateTime<Utc>,
	/// Overall lifecycle status.
	pub status: OrderStatus,
	/// Food sub-workflow status; absent when the order has no food items.
	#[serde(default)]
	pub food_status: Option<OrderStatus>,
	/// Beverage sub-workflow status; absent when the order has no
	/// beverage items.
	#[serde(default)]
	pub beverage_status: Option<OrderStatus>,
	/// Total price as the backend computed it.
	pub total_price: Decimal,
	/// Display name of the assigned worker, if one has claimed the order.
	#[serde(default)]
	pub worker_name: Option<String>,
	/// Ordered line items.
	#[serde(default)]
	pub order_items: Vec<OrderItem>,
	/// Estimated minutes until the food items are ready.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub food_eta_minutes: Option<u32>,
	/// Estimated minutes until the beverage items are ready.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub beverage_eta_minutes: Option<u32>,
	/// Absolute food ready time, when the backend projected one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_food_ready_time: Option<DateTime<Utc>>,
	/// Absolute beverage ready time, when the backend projected one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_beverage_ready_time: Option<DateTime<Utc>>,
	/// Whether the customer has left a review for this order.
	#[serde(default)]
	pub reviewed: bool,
}

impl Order {
	/// Status of one category sub-workflow, if the order has items in it.
	pub fn category_status(&self, category: Category) -> Option<OrderStatus> {
		match category {
			Category::Food => self.food_status,
			Category::Beverage => self.beverage_status,
		}
	}

	/// Returns true if the order contains at least one item of `category`.
	pub fn has_items_in(&self, category: Category) -> bool {
		self.order_items.iter().any(|item| item.category == category)
	}
}

/// A partial order record, as returned by the transition endpoints.
///
/// Only present fields overwrite the stored record; everything else is
/// left untouched by a merge. Field names accept both the full-record and
/// the transition-response spellings (`id` / `order_id`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
	/// Identifier of the order this patch belongs to.
	#[serde(alias = "order_id")]
	pub id: OrderId,
	#[serde(default)]
	pub customer_name: Option<String>,
	#[serde(default)]
	pub start_time: Option<DateTime<Utc>>,
	#[serde(default)]
	pub status: Option<OrderStatus>,
	#[serde(default)]
	pub food_status: Option<OrderStatus>,
	#[serde(default)]
	pub beverage_status: Option<OrderStatus>,
	#[serde(default)]
	pub total_price: Option<Decimal>,
	#[serde(default)]
	pub worker_name: Option<String>,
	#[serde(default)]
	pub order_items: Option<Vec<OrderItem>>,
	#[serde(default)]
	pub food_eta_minutes: Option<u32>,
	#[serde(default)]
	pub beverage_eta_minutes: Option<u32>,
	#[serde(default)]
	pub estimated_food_ready_time: Option<DateTime<Utc>>,
	#[serde(default)]
	pub estimated_beverage_ready_time: Option<DateTime<Utc>>,
	#[serde(default)]
	pub reviewed: Option<bool>,
}

impl OrderPatch {
	/// Creates an empty patch for the given order.
	pub fn new(id: OrderId) -> Self {
		OrderPatch {
			id,
			..OrderPatch::default()
		}
	}

	/// Creates a patch carrying only a worker display name. Used for the
	/// speculative half of the two-phase worker-assignment write.
	pub fn with_worker_name(id: OrderId, name: impl Into<String>) -> Self {
		OrderPatch {
			worker_name: Some(name.into()),
			..OrderPatch::new(id)
		}
	}

	/// Shallow-merges this patch into an existing record. Absent fields
	/// leave the record untouched.
	pub fn apply_to(self, order: &mut Order) {
		if let Some(v) = self.customer_name {
			order.customer_name = v;
		}
		if let Some(v) = self.start_time {
			order.start_time = v;
		}
		if let Some(v) = self.status {
			order.status = v;
		}
		if let Some(v) = self.food_status {
			order.food_status = Some(v);
		}
		if let Some(v) = self.beverage_status {
			order.beverage_status = Some(v);
		}
		if let Some(v) = self.total_price {
			order.total_price = v;
		}
		if let Some(v) = self.worker_name {
			order.worker_name = Some(v);
		}
		if let Some(v) = self.order_items {
			order.order_items = v;
		}
		if let Some(v) = self.food_eta_minutes {
			order.food_eta_minutes = Some(v);
		}
		if let Some(v) = self.beverage_eta_minutes {
			order.beverage_eta_minutes = Some(v);
		}
		if let Some(v) = self.estimated_food_ready_time {
			order.estimated_food_ready_time = Some(v);
		}
		if let Some(v) = self.estimated_beverage_ready_time {
			order.estimated_beverage_ready_time = Some(v);
		}
		if let Some(v) = self.reviewed {
			order.reviewed = v;
		}
	}

	/// Promotes the patch to a full record when it carries every required
	/// field. A patch from a transition response normally targets an order
	/// already in the store, so this only matters for the create-if-absent
	/// path.
	pub fn into_order(self) -> Option<Order> {
		Some(Order {
			id: self.id,
			customer_name: self.customer_name?,
			start_time: self.start_time?,
			status: self.status?,
			food_status: self.food_status,
			beverage_status: self.beverage_status,
			total_price: self.total_price?,
			worker_name: self.worker_name,
			order_items: self.order_items.unwrap_or_default(),
			food_eta_minutes: self.food_eta_minutes,
			beverage_eta_minutes: self.beverage_eta_minutes,
			estimated_food_ready_time: self.estimated_food_ready_time,
			estimated_beverage_ready_time: self.estimated_beverage_ready_time,
			reviewed: self.reviewed.unwrap_or(false),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_sequence_is_linear() {
		assert_eq!(
			OrderStatus::Pending.next_in_sequence(),
			Some(OrderStatus::InProgress)
		);
		assert_eq!(
			OrderStatus::InProgress.next_in_sequence(),
			Some(OrderStatus::Completed)
		);
		assert_eq!(
			OrderStatus::Completed.next_in_sequence(),
			Some(OrderStatus::PickedUp)
		);
		assert_eq!(OrderStatus::PickedUp.next_in_sequence(), None);
		assert_eq!(OrderStatus::Cancelled.next_in_sequence(), None);
	}

	#[test]
	fn cancelled_sits_outside_the_sequence() {
		assert_eq!(OrderStatus::Cancelled.sequence_rank(), None);
		assert!(OrderStatus::Cancelled.is_terminal());
		assert!(OrderStatus::PickedUp.is_terminal());
		assert!(!OrderStatus::Completed.is_terminal());
	}

	#[test]
	fn status_parses_spaced_human_form() {
		assert_eq!(
			"Picked Up".parse::<OrderStatus>().unwrap(),
			OrderStatus::PickedUp
		);
		assert_eq!(
			"in_progress".parse::<OrderStatus>().unwrap(),
			OrderStatus::InProgress
		);
		assert!("done".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn order_id_accepts_numbers_and_strings() {
		let numeric: OrderId = serde_json::from_str("42").unwrap();
		let string: OrderId = serde_json::from_str("\"42\"").unwrap();
		assert_eq!(numeric, string);
		assert_eq!(numeric.as_str(), "42");
	}

	#[test]
	fn order_deserializes_from_backend_shape() {
		let json = serde_json::json!({
			"id": 7,
			"customer_name": "Ada",
			"start_time": "2026-03-01T12:30:00Z",
			"status": "in_progress",
			"food_status": "in_progress",
			"beverage_status": null,
			"total_price": "23.50",
			"worker_name": "Sam",
			"order_items": [
				{
					"item_name": "Burger",
					"category": "Food",
					"quantity": 2,
					"unwanted_ingredient_names": ["onion"]
				},
				{"item_name": "House Special", "category": null, "quantity": 1}
			],
			"food_eta_minutes": 15,
			"reviewed": false
		});

		let order: Order = serde_json::from_value(json).unwrap();
		assert_eq!(order.id, OrderId::from(7u64));
		assert_eq!(order.status, OrderStatus::InProgress);
		assert_eq!(order.food_status, Some(OrderStatus::InProgress));
		assert_eq!(order.beverage_status, None);
		assert_eq!(order.total_price.to_string(), "23.50");
		// Uncategorized items count as food.
		assert_eq!(order.order_items[1].category, Category::Food);
		assert!(order.has_items_in(Category::Food));
		assert!(!order.has_items_in(Category::Beverage));
	}

	#[test]
	fn patch_merges_only_present_fields() {
		let json = serde_json::json!({
			"message": "Food status updated to 'completed'.",
			"order_id": 7,
			"food_status": "completed",
			"beverage_status": null
		});
		let patch: OrderPatch = serde_json::from_value(json).unwrap();

		let mut order = sample_order();
		order.food_status = Some(OrderStatus::InProgress);
		order.beverage_status = Some(OrderStatus::Completed);
		patch.apply_to(&mut order);

		assert_eq!(order.food_status, Some(OrderStatus::Completed));
		// Null on the wire means "no such sub-workflow", never a reset.
		assert_eq!(order.beverage_status, Some(OrderStatus::Completed));
		assert_eq!(order.status, OrderStatus::InProgress);
	}

	#[test]
	fn patch_promotes_to_order_only_when_complete() {
		let partial = OrderPatch {
			status: Some(OrderStatus::Pending),
			..OrderPatch::new(OrderId::from("9"))
		};
		assert!(partial.into_order().is_none());

		let full = OrderPatch {
			customer_name: Some("Grace".into()),
			start_time: Some("2026-03-01T10:00:00Z".parse().unwrap()),
			status: Some(OrderStatus::Pending),
			total_price: Some("5.00".parse().unwrap()),
			..OrderPatch::new(OrderId::from("9"))
		};
		let order = full.into_order().unwrap();
		assert_eq!(order.customer_name, "Grace");
		assert!(order.order_items.is_empty());
	}

	fn sample_order() -> Order {
		Order {
			id: OrderId::from(7u64),
			customer_name: "Ada".into(),
			start_time: "2026-03-01T12:30:00Z".parse().unwrap(),
			status: OrderStatus::InProgress,
			food_status: None,
			beverage_status: None,
			total_price: "23.50".parse().unwrap(),
			worker_name: None,
			order_items: Vec::new(),
			food_eta_minutes: None,
			beverage_eta_minutes: None,
			estimated_food_ready_time: None,
			estimated_beverage_ready_time: None,
			reviewed: false,
		}
	}
}
