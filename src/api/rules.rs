//! Auto-approval rule endpoints.

use super::AppState;
use crate::{
    core::auto_approval::{self, RuleInput},
    entities::auto_approval_rule,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;

/// Body of `PUT /api/clients/:client_id/rules/order`
#[derive(Debug, Deserialize)]
pub struct OrderBody {
    /// Every rule id of the client, first evaluated first
    pub rule_ids: Vec<i64>,
}

/// Body of the activation endpoint
#[derive(Debug, Deserialize)]
pub struct ActiveBody {
    /// New activation state
    pub is_active: bool,
}

async fn list(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<auto_approval_rule::Model>>> {
    Ok(Json(auto_approval::list_rules(state.db.as_ref(), client_id).await?))
}

async fn create(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(input): Json<RuleInput>,
) -> Result<(StatusCode, Json<auto_approval_rule::Model>)> {
    let created = auto_approval::create_rule(state.db.as_ref(), client_id, input, state.today()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn reorder(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(body): Json<OrderBody>,
) -> Result<Json<Vec<auto_approval_rule::Model>>> {
    Ok(Json(
        auto_approval::reorder_rules(state.db.as_ref(), client_id, &body.rule_ids).await?,
    ))
}

async fn get_one(
    State(state): State<AppState>,
    Path((client_id, rule_id)): Path<(i64, i64)>,
) -> Result<Json<auto_approval_rule::Model>> {
    Ok(Json(
        auto_approval::get_rule(state.db.as_ref(), client_id, rule_id).await?,
    ))
}

async fn update(
    State(state): State<AppState>,
    Path((client_id, rule_id)): Path<(i64, i64)>,
    Json(input): Json<RuleInput>,
) -> Result<Json<auto_approval_rule::Model>> {
    Ok(Json(
        auto_approval::update_rule(state.db.as_ref(), client_id, rule_id, input).await?,
    ))
}

async fn delete(
    State(state): State<AppState>,
    Path((client_id, rule_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    auto_approval::delete_rule(state.db.as_ref(), client_id, rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_active(
    State(state): State<AppState>,
    Path((client_id, rule_id)): Path<(i64, i64)>,
    Json(body): Json<ActiveBody>,
) -> Result<Json<auto_approval_rule::Model>> {
    Ok(Json(
        auto_approval::set_rule_active(state.db.as_ref(), client_id, rule_id, body.is_active).await?,
    ))
}

/// Rule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients/:client_id/rules", get(list).post(create))
        .route("/api/clients/:client_id/rules/order", put(reorder))
        .route(
            "/api/clients/:client_id/rules/:id",
            get(get_one).patch(update).delete(delete),
        )
        .route("/api/clients/:client_id/rules/:id/active", post(set_active))
}
