//! HTTP backend implementation speaking the restaurant API.
//!
//! Endpoints, verbatim from the backend:
//! - `GET {base}/retrieve/orders/?statuses=<csv>&limit=<n>`
//! - `PATCH {base}/orders/{restaurant}/{order}/{status}/` (whole order,
//!   optional `{"worker_id": …}` body)
//! - `PATCH {base}/orders/{restaurant}/{order}/{category}/{status}/`

use crate::{BackendError, BackendInterface};
use async_trait::async_trait;
use board_types::{Category, OrderId, OrderPage, OrderPatch, OrderStatus, StatusFilter};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for one restaurant's order backend.
///
/// One pooled `reqwest` client per instance; the restaurant scope is
/// fixed at construction because every mutation URL carries it.
pub struct HttpBackend {
	client: reqwest::Client,
	base_url: String,
	restaurant_id: String,
}

impl HttpBackend {
	/// Creates a backend client against `base_url`, scoped to one
	/// restaurant.
	pub fn new(
		base_url: impl Into<String>,
		restaurant_id: impl Into<String>,
		request_timeout: Duration,
	) -> Result<Self, BackendError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(10)
			.timeout(request_timeout)
			.build()
			.map_err(|e| BackendError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			restaurant_id: restaurant_id.into(),
		})
	}

	fn orders_url(&self) -> String {
		format!("{}/retrieve/orders/", self.base_url)
	}

	fn order_status_url(&self, order_id: &OrderId, target: OrderStatus) -> String {
		format!(
			"{}/orders/{}/{}/{}/",
			self.base_url, self.restaurant_id, order_id, target
		)
	}

	fn category_status_url(
		&self,
		order_id: &OrderId,
		category: Category,
		target: OrderStatus,
	) -> String {
		format!(
			"{}/orders/{}/{}/{}/{}/",
			self.base_url, self.restaurant_id, order_id, category, target
		)
	}

	/// Decodes a response, folding non-success statuses into
	/// [`BackendError::Rejected`] with whatever message body the backend
	/// sent.
	async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(BackendError::Rejected {
				status: status.as_u16(),
				message,
			});
		}
		response
			.json::<T>()
			.await
			.map_err(|e| BackendError::Decode(e.to_string()))
	}
}

#[async_trait]
impl BackendInterface for HttpBackend {
	async fn fetch_orders(
		&self,
		filter: &StatusFilter,
		limit: usize,
	) -> Result<OrderPage, BackendError> {
		let response = self
			.client
			.get(self.orders_url())
			.query(&[
				("statuses", filter.query_value()),
				("limit", limit.to_string()),
			])
			.send()
			.await
			.map_err(|e| BackendError::Network(e.to_string()))?;
		Self::decode(response).await
	}

	async fn update_order_status(
		&self,
		order_id: &OrderId,
		target: OrderStatus,
		worker_id: Option<&str>,
	) -> Result<OrderPatch, BackendError> {
		let body = match worker_id {
			Some(id) => serde_json::json!({ "worker_id": id }),
			None => serde_json::json!({}),
		};
		let response = self
			.client
			.patch(self.order_status_url(order_id, target))
			.json(&body)
			.send()
			.await
			.map_err(|e| BackendError::Network(e.to_string()))?;
		Self::decode(response).await
	}

	async fn update_category_status(
		&self,
		order_id: &OrderId,
		category: Category,
		target: OrderStatus,
	) -> Result<OrderPatch, BackendError> {
		let response = self
			.client
			.patch(self.category_status_url(order_id, category, target))
			.send()
			.await
			.map_err(|e| BackendError::Network(e.to_string()))?;
		Self::decode(response).await
	}
}
