//! Sales (invoice) endpoints.

use super::AppState;
use crate::{
    core::sale::{self, SaleWithItems},
    entities::sale as sale_entity,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

async fn list(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<sale_entity::Model>>> {
    Ok(Json(sale::list_sales(state.db.as_ref(), client_id).await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path((client_id, sale_id)): Path<(i64, i64)>,
) -> Result<Json<SaleWithItems>> {
    Ok(Json(sale::get_sale(state.db.as_ref(), client_id, sale_id).await?))
}

/// Sales routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients/:client_id/sales", get(list))
        .route("/api/clients/:client_id/sales/:id", get(get_one))
}
