//! Inventory movements.
//!
//! Every change to a product's stock goes through [`adjust_stock`], which
//! performs a single guarded `UPDATE` and records an `inventory_logs` row with
//! the resulting stock level. Callers that change several products at once
//! pass a database transaction.

use crate::{
    core::product::require_product,
    entities::{InventoryLog, InventoryReason, Product, inventory_log, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// Changes a product's stock by `delta` and logs the movement.
///
/// Decrements only succeed when enough stock is on hand; the check and the
/// update happen in the same statement.
///
/// # Errors
/// Returns an error if:
/// - `delta` is zero, `i32::MIN`, or would push the stock past `i32::MAX`
/// - The product does not exist or is deleted
/// - A decrement would take the stock below zero
/// - A database operation fails
pub async fn adjust_stock<C>(
    db: &C,
    product_id: i64,
    delta: i32,
    reason: InventoryReason,
    reference: Option<String>,
) -> Result<inventory_log::Model>
where
    C: ConnectionTrait,
{
    let removed = delta
        .checked_neg()
        .filter(|_| delta != 0)
        .ok_or(Error::InvalidQuantity { quantity: delta })?;

    let current = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or_else(|| Error::not_found("product", product_id))?;
    if delta > 0 && current.stock.checked_add(delta).is_none() {
        return Err(Error::InvalidQuantity { quantity: delta });
    }

    let mut update = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).add(delta),
        )
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(product::Column::Id.eq(product_id));
    if delta < 0 {
        update = update.filter(product::Column::Stock.gte(removed));
    }

    let result = update.exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            product_id,
            available: current.stock,
            requested: removed,
        });
    }

    let updated = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("product", product_id))?;

    debug!(product_id, delta, stock_after = updated.stock, ?reason, "Stock adjusted");

    inventory_log::ActiveModel {
        client_id: Set(updated.client_id),
        product_id: Set(product_id),
        change: Set(delta),
        stock_after: Set(updated.stock),
        reason: Set(reason),
        reference: Set(reference),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Adds received goods to a product's stock.
///
/// # Errors
/// Returns an error if `quantity` is not positive, the product does not belong
/// to the client, or a database operation fails.
pub async fn restock(
    db: &DatabaseConnection,
    client_id: i64,
    product_id: i64,
    quantity: i32,
    note: Option<String>,
) -> Result<inventory_log::Model> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    require_product(db, client_id, product_id).await?;

    let txn = db.begin().await?;
    let log = adjust_stock(&txn, product_id, quantity, InventoryReason::Restock, note).await?;
    txn.commit().await?;

    info!(client_id, product_id, quantity, "Product restocked");
    Ok(log)
}

/// Applies a manual correction (positive or negative) to a product's stock.
///
/// # Errors
/// Returns an error if `delta` is zero, the product does not belong to the
/// client, the correction would make stock negative, or a database operation fails.
pub async fn adjust_inventory(
    db: &DatabaseConnection,
    client_id: i64,
    product_id: i64,
    delta: i32,
    note: Option<String>,
) -> Result<inventory_log::Model> {
    require_product(db, client_id, product_id).await?;

    let txn = db.begin().await?;
    let log = adjust_stock(&txn, product_id, delta, InventoryReason::Adjustment, note).await?;
    txn.commit().await?;

    info!(client_id, product_id, delta, "Inventory adjusted");
    Ok(log)
}

/// Movements of one product, newest first.
pub async fn list_logs_for_product(
    db: &DatabaseConnection,
    client_id: i64,
    product_id: i64,
) -> Result<Vec<inventory_log::Model>> {
    InventoryLog::find()
        .filter(inventory_log::Column::ClientId.eq(client_id))
        .filter(inventory_log::Column::ProductId.eq(product_id))
        .order_by_desc(inventory_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Most recent movements across a client's products, newest first.
pub async fn list_logs_for_client(
    db: &DatabaseConnection,
    client_id: i64,
    limit: Option<u64>,
) -> Result<Vec<inventory_log::Model>> {
    InventoryLog::find()
        .filter(inventory_log::Column::ClientId.eq(client_id))
        .order_by_desc(inventory_log::Column::Id)
        .limit(limit.unwrap_or(100))
        .all(db)
        .await
        .map_err(Into::into)
}
