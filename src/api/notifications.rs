//! Notification endpoints of a user.

use super::AppState;
use crate::{core::notification, entities::notification as notification_entity, errors::Result};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// Query of the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Only unread notifications
    #[serde(default)]
    pub unread: bool,
}

/// Result of marking everything read
#[derive(Debug, Serialize)]
pub struct MarkedRead {
    /// Notifications that changed
    pub updated: u64,
}

async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<notification_entity::Model>>> {
    Ok(Json(
        notification::list_notifications(state.db.as_ref(), user_id, query.unread).await?,
    ))
}

async fn mark_read(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(i64, i64)>,
) -> Result<Json<notification_entity::Model>> {
    Ok(Json(
        notification::mark_read(state.db.as_ref(), user_id, notification_id).await?,
    ))
}

async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MarkedRead>> {
    let updated = notification::mark_all_read(state.db.as_ref(), user_id).await?;
    Ok(Json(MarkedRead { updated }))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:user_id/notifications", get(list))
        .route(
            "/api/users/:user_id/notifications/read-all",
            post(mark_all_read),
        )
        .route(
            "/api/users/:user_id/notifications/:id/read",
            post(mark_read),
        )
}
