//! HTTP surface exposing the board view and transition commands.
//!
//! This is the seam a display layer consumes: the reconciled, sorted
//! order list with its legal actions, plus endpoints mirroring the
//! engine's transition, filter and pagination operations. Rendering
//! stays out of scope.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Json},
	routing::{get, post},
	Router,
};
use board_client::BackendError;
use board_config::ApiConfig;
use board_core::{BoardEngine, TransitionError, TransitionScope};
use board_types::{
	available_actions, Category, Order, OrderAction, OrderId, OrderStatus, StatusFilter, WorkerRef,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the board engine for processing requests.
	pub engine: Arc<BoardEngine>,
}

/// Starts the HTTP server for the board API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<BoardEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { engine });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("Board API server starting on {}", bind_address);
	axum::serve(listener, app).await?;

	Ok(())
}

fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/board",
			Router::new()
				.route("/health", get(handle_health))
				.route("/orders", get(handle_orders))
				.route("/orders/load_more", post(handle_load_more))
				.route("/filter", post(handle_set_filter))
				.route("/orders/{id}/status/{target}", post(handle_order_transition))
				.route(
					"/orders/{id}/{category}/{target}",
					post(handle_category_transition),
				),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// One order in the served view, annotated with its legal next actions.
#[derive(Debug, Serialize)]
struct OrderEntry {
	#[serde(flatten)]
	order: Order,
	actions: Vec<OrderAction>,
}

/// Response body for `GET /board/orders`.
#[derive(Debug, Serialize)]
struct ViewResponse {
	orders: Vec<OrderEntry>,
	total: u64,
	has_more: bool,
}

/// Request body for transition endpoints. The worker fields are only
/// consulted when starting an order.
#[derive(Debug, Default, Deserialize)]
struct TransitionBody {
	worker_id: Option<String>,
	worker_name: Option<String>,
}

impl TransitionBody {
	fn worker(self) -> Option<WorkerRef> {
		self.worker_id.map(|id| WorkerRef {
			name: self.worker_name.unwrap_or_else(|| id.clone()),
			id,
		})
	}
}

/// Request body for `POST /board/filter`.
#[derive(Debug, Deserialize)]
struct FilterBody {
	statuses: Vec<OrderStatus>,
}

async fn handle_health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

/// Handles GET /board/orders: the current reconciled view.
async fn handle_orders(State(state): State<AppState>) -> Json<ViewResponse> {
	let view = state.engine.current_view();
	let rollup = state.engine.rollup();
	let orders = view
		.orders
		.into_iter()
		.map(|order| OrderEntry {
			actions: available_actions(&order, rollup),
			order,
		})
		.collect();
	Json(ViewResponse {
		orders,
		total: view.total,
		has_more: view.has_more,
	})
}

/// Handles POST /board/orders/load_more: grows the page window.
async fn handle_load_more(State(state): State<AppState>) -> StatusCode {
	state.engine.load_more();
	StatusCode::ACCEPTED
}

/// Handles POST /board/filter: replaces the status filter.
async fn handle_set_filter(
	State(state): State<AppState>,
	Json(body): Json<FilterBody>,
) -> Result<StatusCode, ApiError> {
	if body.statuses.is_empty() {
		return Err(ApiError::new(
			StatusCode::BAD_REQUEST,
			"statuses cannot be empty",
		));
	}
	state.engine.set_filter(StatusFilter::new(body.statuses));
	Ok(StatusCode::ACCEPTED)
}

/// Handles POST /board/orders/{id}/status/{target}: a whole-order
/// transition.
async fn handle_order_transition(
	Path((id, target)): Path<(String, String)>,
	State(state): State<AppState>,
	body: Option<Json<TransitionBody>>,
) -> Result<Json<Order>, ApiError> {
	let target: OrderStatus = target
		.parse()
		.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;
	let worker = body.map(|Json(b)| b).unwrap_or_default().worker();

	let order = state
		.engine
		.transition(
			&OrderId::from(id),
			TransitionScope::Order,
			target,
			worker.as_ref(),
		)
		.await?;
	Ok(Json(order))
}

/// Handles POST /board/orders/{id}/{category}/{target}: a category
/// transition.
async fn handle_category_transition(
	Path((id, category, target)): Path<(String, String, String)>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	let category: Category = category
		.parse()
		.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;
	let target: OrderStatus = target
		.parse()
		.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;

	let order = state
		.engine
		.transition(
			&OrderId::from(id),
			TransitionScope::Category(category),
			target,
			None,
		)
		.await?;
	Ok(Json(order))
}

/// API error with its HTTP status.
#[derive(Debug)]
struct ApiError {
	status: StatusCode,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, message: impl ToString) -> Self {
		ApiError {
			status,
			message: message.to_string(),
		}
	}
}

impl From<TransitionError> for ApiError {
	fn from(err: TransitionError) -> Self {
		let status = match &err {
			TransitionError::UnknownOrder(_) => StatusCode::NOT_FOUND,
			TransitionError::MissingCategory { .. }
			| TransitionError::NotMonotonic { .. }
			| TransitionError::UnsupportedTarget(_) => StatusCode::CONFLICT,
			TransitionError::MissingWorker => StatusCode::BAD_REQUEST,
			TransitionError::Backend(BackendError::Rejected { status, .. }) => {
				StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
			}
			TransitionError::Backend(_) => StatusCode::BAD_GATEWAY,
		};
		tracing::warn!(error = %err, "Transition request failed");
		ApiError::new(status, err)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		(
			self.status,
			Json(serde_json::json!({ "error": self.message })),
		)
			.into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transition_body_falls_back_to_id_as_display_name() {
		let body = TransitionBody {
			worker_id: Some("W1".into()),
			worker_name: None,
		};
		let worker = body.worker().unwrap();
		assert_eq!(worker.id, "W1");
		assert_eq!(worker.name, "W1");

		let empty = TransitionBody::default();
		assert!(empty.worker().is_none());
	}

	#[test]
	fn transition_errors_map_to_http_statuses() {
		let unknown = ApiError::from(TransitionError::UnknownOrder(OrderId::from(1u64)));
		assert_eq!(unknown.status, StatusCode::NOT_FOUND);

		let unsupported =
			ApiError::from(TransitionError::UnsupportedTarget(OrderStatus::Cancelled));
		assert_eq!(unsupported.status, StatusCode::CONFLICT);

		let rejected = ApiError::from(TransitionError::Backend(BackendError::Rejected {
			status: 404,
			message: "Order not found.".into(),
		}));
		assert_eq!(rejected.status, StatusCode::NOT_FOUND);

		let network =
			ApiError::from(TransitionError::Backend(BackendError::Network("down".into())));
		assert_eq!(network.status, StatusCode::BAD_GATEWAY);
	}
}
