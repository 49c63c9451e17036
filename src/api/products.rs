//! Vendor endpoints for the dashboard, products and inventory.

use super::AppState;
use crate::{
    core::{
        inventory,
        product::{self, NewProduct, ProductUpdate},
        report::{self, VendorDashboard},
    },
    entities::{inventory_log, product as product_entity},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

/// Body of the restock and adjust endpoints
#[derive(Debug, Deserialize)]
pub struct StockChange {
    /// Units added (restock) or signed correction (adjust)
    pub quantity: i32,
    /// Free-form reference stored on the log entry
    #[serde(default)]
    pub note: Option<String>,
}

/// Query of `GET /api/clients/:client_id/inventory`
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// Maximum number of entries
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Query of `GET /api/clients/:client_id/products`
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Only products at or below their threshold
    #[serde(default)]
    pub low_stock: bool,
}

async fn dashboard(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<VendorDashboard>> {
    Ok(Json(
        report::vendor_dashboard(state.db.as_ref(), client_id, state.today()).await?,
    ))
}

async fn list_products(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<product_entity::Model>>> {
    let products = if query.low_stock {
        product::low_stock_products(state.db.as_ref(), client_id).await?
    } else {
        product::list_products(state.db.as_ref(), client_id).await?
    };
    Ok(Json(products))
}

async fn create_product(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<product_entity::Model>)> {
    let created = product::create_product(state.db.as_ref(), client_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_product(
    State(state): State<AppState>,
    Path((client_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<product_entity::Model>> {
    product::get_product(state.db.as_ref(), client_id, product_id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("product", product_id))
}

async fn update_product(
    State(state): State<AppState>,
    Path((client_id, product_id)): Path<(i64, i64)>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<product_entity::Model>> {
    Ok(Json(
        product::update_product(state.db.as_ref(), client_id, product_id, update).await?,
    ))
}

async fn delete_product(
    State(state): State<AppState>,
    Path((client_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<product_entity::Model>> {
    Ok(Json(
        product::delete_product(state.db.as_ref(), client_id, product_id).await?,
    ))
}

async fn restock(
    State(state): State<AppState>,
    Path((client_id, product_id)): Path<(i64, i64)>,
    Json(body): Json<StockChange>,
) -> Result<Json<inventory_log::Model>> {
    Ok(Json(
        inventory::restock(state.db.as_ref(), client_id, product_id, body.quantity, body.note).await?,
    ))
}

async fn adjust(
    State(state): State<AppState>,
    Path((client_id, product_id)): Path<(i64, i64)>,
    Json(body): Json<StockChange>,
) -> Result<Json<inventory_log::Model>> {
    Ok(Json(
        inventory::adjust_inventory(state.db.as_ref(), client_id, product_id, body.quantity, body.note)
            .await?,
    ))
}

async fn product_logs(
    State(state): State<AppState>,
    Path((client_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<inventory_log::Model>>> {
    Ok(Json(
        inventory::list_logs_for_product(state.db.as_ref(), client_id, product_id).await?,
    ))
}

async fn client_logs(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<inventory_log::Model>>> {
    Ok(Json(
        inventory::list_logs_for_client(state.db.as_ref(), client_id, query.limit).await?,
    ))
}

/// Vendor routes for the dashboard, products and inventory.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients/:client_id/dashboard", get(dashboard))
        .route(
            "/api/clients/:client_id/products",
            get(list_products).post(create_product),
        )
        .route(
            "/api/clients/:client_id/products/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/api/clients/:client_id/products/:id/restock", post(restock))
        .route("/api/clients/:client_id/products/:id/adjust", post(adjust))
        .route(
            "/api/clients/:client_id/products/:id/inventory",
            get(product_logs),
        )
        .route("/api/clients/:client_id/inventory", get(client_logs))
}
