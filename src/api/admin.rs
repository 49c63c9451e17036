//! Admin endpoints: clients, subscriptions and the platform overview.

use super::AppState;
use crate::{
    core::{
        client::{self, ClientDetails, ClientUpdate, NewClient},
        notification,
        report::{self, AdminOverview},
        subscription,
    },
    entities::{Plan, client_profile, subscription as subscription_entity},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/admin/clients/:id/active`
#[derive(Debug, Deserialize)]
pub struct ActiveBody {
    /// New activation state
    pub is_active: bool,
}

/// Body of `POST /api/admin/clients/:id/subscriptions`
#[derive(Debug, Deserialize)]
pub struct NewSubscription {
    /// Tier to subscribe to
    pub plan: Plan,
    /// First day covered; defaults to today
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day covered
    pub end_date: NaiveDate,
}

/// Body of `PUT /api/admin/clients/:id/plan`
#[derive(Debug, Deserialize)]
pub struct PlanBody {
    /// New tier for the subscription in force
    pub plan: Plan,
}

/// Query of `POST /api/admin/subscriptions/expire`
#[derive(Debug, Deserialize)]
pub struct ExpireQuery {
    /// Remind clients whose subscription ends within this many days
    #[serde(default = "default_reminder_days")]
    pub remind_days: u64,
}

const fn default_reminder_days() -> u64 {
    7
}

/// Result of the expiry sweep
#[derive(Debug, Serialize)]
pub struct ExpireSummary {
    /// Subscriptions marked expired
    pub expired: u64,
    /// Reminder notifications sent
    pub reminders_sent: usize,
}

async fn overview(State(state): State<AppState>) -> Result<Json<AdminOverview>> {
    Ok(Json(report::admin_overview(state.db.as_ref(), state.today()).await?))
}

async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<client_profile::Model>>> {
    Ok(Json(client::list_clients(state.db.as_ref()).await?))
}

async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<NewClient>,
) -> Result<(StatusCode, Json<client_profile::Model>)> {
    let created = client::create_client(state.db.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<ClientDetails>> {
    Ok(Json(client::get_client_details(state.db.as_ref(), client_id).await?))
}

async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(update): Json<ClientUpdate>,
) -> Result<Json<client_profile::Model>> {
    Ok(Json(client::update_client(state.db.as_ref(), client_id, update).await?))
}

async fn set_client_active(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(body): Json<ActiveBody>,
) -> Result<Json<client_profile::Model>> {
    Ok(Json(
        client::set_client_active(state.db.as_ref(), client_id, body.is_active).await?,
    ))
}

async fn list_subscriptions(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<subscription_entity::Model>>> {
    Ok(Json(
        subscription::list_subscriptions(state.db.as_ref(), client_id).await?,
    ))
}

async fn create_subscription(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(body): Json<NewSubscription>,
) -> Result<(StatusCode, Json<subscription_entity::Model>)> {
    let start = body.start_date.unwrap_or_else(|| state.today());
    let created =
        subscription::create_subscription(state.db.as_ref(), client_id, body.plan, start, body.end_date)
            .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn change_plan(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(body): Json<PlanBody>,
) -> Result<Json<subscription_entity::Model>> {
    Ok(Json(
        subscription::change_plan(state.db.as_ref(), client_id, body.plan, state.today()).await?,
    ))
}

async fn cancel_subscription(
    State(state): State<AppState>,
    Path((client_id, subscription_id)): Path<(i64, i64)>,
) -> Result<Json<subscription_entity::Model>> {
    Ok(Json(
        subscription::cancel_subscription(state.db.as_ref(), client_id, subscription_id).await?,
    ))
}

async fn expire_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<ExpireQuery>,
) -> Result<Json<ExpireSummary>> {
    let today = state.today();
    let expired = subscription::expire_subscriptions(state.db.as_ref(), today).await?;
    let reminders =
        notification::notify_expiring_subscriptions(state.db.as_ref(), today, query.remind_days).await?;
    Ok(Json(ExpireSummary {
        expired,
        reminders_sent: reminders.len(),
    }))
}

/// Admin routes under `/api/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/overview", get(overview))
        .route("/api/admin/clients", get(list_clients).post(create_client))
        .route(
            "/api/admin/clients/:id",
            get(get_client).patch(update_client),
        )
        .route("/api/admin/clients/:id/active", post(set_client_active))
        .route(
            "/api/admin/clients/:id/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/api/admin/clients/:id/plan", put(change_plan))
        .route(
            "/api/admin/clients/:id/subscriptions/:subscription_id/cancel",
            post(cancel_subscription),
        )
        .route("/api/admin/subscriptions/expire", post(expire_subscriptions))
}
