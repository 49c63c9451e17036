//! Delivery request endpoints.

use super::AppState;
use crate::{
    core::{
        delivery::{self, DeliveryOutcome, DeliveryRequestDetails, NewDeliveryRequest},
        sale::SaleWithItems,
    },
    entities::{DeliveryStatus, delivery_request},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

/// Query of the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Only requests in this state
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
}

/// Body of the reject endpoint
#[derive(Debug, Default, Deserialize)]
pub struct RejectBody {
    /// Why the request was turned down
    #[serde(default)]
    pub reason: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<delivery_request::Model>>> {
    Ok(Json(
        delivery::list_delivery_requests(state.db.as_ref(), client_id, query.status).await?,
    ))
}

async fn create(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(input): Json<NewDeliveryRequest>,
) -> Result<(StatusCode, Json<DeliveryOutcome>)> {
    let outcome =
        delivery::create_delivery_request(state.db.as_ref(), client_id, input, state.now(), state.offset)
            .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_one(
    State(state): State<AppState>,
    Path((client_id, request_id)): Path<(i64, i64)>,
) -> Result<Json<DeliveryRequestDetails>> {
    Ok(Json(
        delivery::get_delivery_request(state.db.as_ref(), client_id, request_id).await?,
    ))
}

async fn approve(
    State(state): State<AppState>,
    Path((client_id, request_id)): Path<(i64, i64)>,
) -> Result<Json<SaleWithItems>> {
    Ok(Json(
        delivery::approve_delivery_request(state.db.as_ref(), client_id, request_id).await?,
    ))
}

async fn reject(
    State(state): State<AppState>,
    Path((client_id, request_id)): Path<(i64, i64)>,
    body: Option<Json<RejectBody>>,
) -> Result<Json<delivery_request::Model>> {
    let reason = body.and_then(|Json(b)| b.reason);
    Ok(Json(
        delivery::reject_delivery_request(state.db.as_ref(), client_id, request_id, reason).await?,
    ))
}

/// Delivery request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients/:client_id/deliveries", get(list).post(create))
        .route("/api/clients/:client_id/deliveries/:id", get(get_one))
        .route(
            "/api/clients/:client_id/deliveries/:id/approve",
            post(approve),
        )
        .route("/api/clients/:client_id/deliveries/:id/reject", post(reject))
}
