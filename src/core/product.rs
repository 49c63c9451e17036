//! Product business logic - Handles all product-related operations.
//!
//! Products are scoped to a client: every lookup takes the `client_id` so one
//! vendor can never read or modify another vendor's catalogue. Stock on hand is
//! only changed through `core::inventory`, which keeps the audit log in sync.

use crate::{
    core::{client::require_client, inventory},
    entities::{InventoryReason, Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::info;

/// Default low-stock threshold for new products.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

const fn default_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

/// Input for [`create_product`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Stock keeping unit, unique per client
    pub sku: String,
    /// Unit price
    pub price: f64,
    /// Opening stock
    #[serde(default)]
    pub stock: i32,
    /// Low-stock alert level
    #[serde(default = "default_threshold")]
    pub low_stock_threshold: i32,
}

/// Partial update for [`update_product`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    /// New name
    pub name: Option<String>,
    /// New SKU
    pub sku: Option<String>,
    /// New unit price
    pub price: Option<f64>,
    /// New low-stock alert level
    pub low_stock_threshold: Option<i32>,
}

/// Rejects negative, NaN and infinite prices.
pub fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }
    Ok(())
}

fn validate_sku(sku: &str) -> Result<()> {
    if sku.trim().is_empty() {
        return Err(Error::validation("SKU cannot be empty"));
    }
    Ok(())
}

fn validate_threshold(threshold: i32) -> Result<()> {
    if threshold < 0 {
        return Err(Error::validation("Low-stock threshold cannot be negative"));
    }
    Ok(())
}

async fn ensure_sku_available<C>(
    db: &C,
    client_id: i64,
    sku: &str,
    except_product: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Product::find()
        .filter(product::Column::ClientId.eq(client_id))
        .filter(product::Column::Sku.eq(sku))
        .filter(product::Column::IsDeleted.eq(false));
    if let Some(id) = except_product {
        query = query.filter(product::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::DuplicateSku {
            sku: sku.to_string(),
        });
    }
    Ok(())
}

/// Retrieves all active (non-deleted) products of a client, ordered alphabetically by name.
pub async fn list_products(db: &DatabaseConnection, client_id: i64) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::ClientId.eq(client_id))
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product of the client by id, including deleted ones.
pub async fn get_product<C>(
    db: &C,
    client_id: i64,
    product_id: i64,
) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::ClientId.eq(client_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an active product of the client, failing with [`Error::NotFound`]
/// if it does not exist, is deleted, or belongs to another client.
pub async fn require_product<C>(db: &C, client_id: i64, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    get_product(db, client_id, product_id)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or_else(|| Error::not_found("product", product_id))
}

/// Creates a new product, logging its opening stock.
///
/// # Errors
/// Returns an error if:
/// - The client does not exist
/// - The name or SKU is empty, or the SKU is already used by the client
/// - The price is negative or not finite (NaN, infinity)
/// - The opening stock or threshold is negative
/// - A database operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    client_id: i64,
    input: NewProduct,
) -> Result<product::Model> {
    validate_name(&input.name)?;
    validate_sku(&input.sku)?;
    validate_price(input.price)?;
    validate_threshold(input.low_stock_threshold)?;
    if input.stock < 0 {
        return Err(Error::InvalidQuantity {
            quantity: input.stock,
        });
    }

    require_client(db, client_id).await?;
    let sku = input.sku.trim().to_string();
    ensure_sku_available(db, client_id, &sku, None).await?;

    let txn = db.begin().await?;

    let now = chrono::Utc::now().naive_utc();
    let created = product::ActiveModel {
        client_id: Set(client_id),
        name: Set(input.name.trim().to_string()),
        sku: Set(sku),
        price: Set(input.price),
        stock: Set(0),
        low_stock_threshold: Set(input.low_stock_threshold),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if input.stock > 0 {
        inventory::adjust_stock(
            &txn,
            created.id,
            input.stock,
            InventoryReason::Initial,
            None,
        )
        .await?;
    }

    let created = require_product(&txn, client_id, created.id).await?;
    txn.commit().await?;

    info!(client_id, product_id = created.id, sku = %created.sku, "Product created");
    Ok(created)
}

/// Applies a partial update to a product.
///
/// # Errors
/// Returns an error if the product does not exist or is deleted, a new value
/// fails validation, the new SKU is taken, or the update fails.
pub async fn update_product(
    db: &DatabaseConnection,
    client_id: i64,
    product_id: i64,
    update: ProductUpdate,
) -> Result<product::Model> {
    let existing = require_product(db, client_id, product_id).await?;
    let mut active: product::ActiveModel = existing.into();

    if let Some(name) = update.name {
        validate_name(&name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(sku) = update.sku {
        validate_sku(&sku)?;
        let sku = sku.trim().to_string();
        ensure_sku_available(db, client_id, &sku, Some(product_id)).await?;
        active.sku = Set(sku);
    }
    if let Some(price) = update.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(threshold) = update.low_stock_threshold {
        validate_threshold(threshold)?;
        active.low_stock_threshold = Set(threshold);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    active.update(db).await.map_err(Into::into)
}

/// Soft deletes a product, preserving sales and inventory history.
///
/// # Errors
/// Returns an error if the product does not exist or is already deleted.
pub async fn delete_product(
    db: &DatabaseConnection,
    client_id: i64,
    product_id: i64,
) -> Result<product::Model> {
    let mut active: product::ActiveModel = require_product(db, client_id, product_id).await?.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let deleted = active.update(db).await?;

    info!(client_id, product_id, "Product deleted");
    Ok(deleted)
}

/// Active products whose stock is at or below their low-stock threshold.
pub async fn low_stock_products(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::ClientId.eq(client_id))
        .filter(product::Column::IsDeleted.eq(false))
        .filter(Expr::col(product::Column::Stock).lte(Expr::col(product::Column::LowStockThreshold)))
        .order_by_asc(product::Column::Stock)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_product(name: &str, sku: &str, price: f64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            sku: sku.to_string(),
            price,
            stock: 0,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Test empty name validation
        let result = create_product(&db, 1, new_product("  ", "SKU", 1.0)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Test empty SKU validation
        let result = create_product(&db, 1, new_product("Water", "", 1.0)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Test negative price validation
        let result = create_product(&db, 1, new_product("Water", "W1", -10.0)).await;
        assert!(matches!(
            result,
            Err(Error::InvalidAmount { amount }) if amount == -10.0
        ));

        // Test NaN price validation
        let result = create_product(&db, 1, new_product("Water", "W1", f64::NAN)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        // Test negative opening stock
        let mut input = new_product("Water", "W1", 1.0);
        input.stock = -1;
        let result = create_product(&db, 1, input).await;
        assert!(matches!(result, Err(Error::InvalidQuantity { quantity: -1 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_logs_opening_stock() -> Result<()> {
        let (db, client) = setup_with_client().await?;

        let mut input = new_product("Water 20L", " W20 ", 3.5);
        input.stock = 12;
        let product = create_product(&db, client.id, input).await?;

        assert_eq!(product.sku, "W20");
        assert_eq!(product.stock, 12);
        assert_eq!(product.price, 3.5);

        let logs = inventory::list_logs_for_product(&db, client.id, product.id).await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].change, 12);
        assert_eq!(logs[0].stock_after, 12);
        assert_eq!(logs[0].reason, InventoryReason::Initial);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_sku_per_client() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_client(&db, "Shop A").await?;
        let b = create_test_client(&db, "Shop B").await?;

        create_product(&db, a.id, new_product("Water", "W1", 1.0)).await?;
        let result = create_product(&db, a.id, new_product("Other", "W1", 1.0)).await;
        assert!(matches!(result, Err(Error::DuplicateSku { .. })));

        // Another client may reuse the SKU
        create_product(&db, b.id, new_product("Water", "W1", 1.0)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_sku_reusable_after_delete() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        let first = create_product(&db, client.id, new_product("Water", "W1", 1.0)).await?;
        delete_product(&db, client.id, first.id).await?;
        create_product(&db, client.id, new_product("Water v2", "W1", 1.5)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        let product = create_product(&db, client.id, new_product("Water", "W1", 1.0)).await?;
        create_product(&db, client.id, new_product("Ice", "ICE", 2.0)).await?;

        let updated = update_product(
            &db,
            client.id,
            product.id,
            ProductUpdate {
                price: Some(1.25),
                low_stock_threshold: Some(2),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.price, 1.25);
        assert_eq!(updated.low_stock_threshold, 2);
        assert_eq!(updated.name, "Water");

        let result = update_product(
            &db,
            client.id,
            product.id,
            ProductUpdate {
                sku: Some("ICE".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::DuplicateSku { .. })));

        // Keeping its own SKU is not a conflict
        update_product(
            &db,
            client.id,
            product.id,
            ProductUpdate {
                sku: Some("W1".to_string()),
                ..Default::default()
            },
        )
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_products_are_client_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_client(&db, "Shop A").await?;
        let b = create_test_client(&db, "Shop B").await?;
        let product = create_product(&db, a.id, new_product("Water", "W1", 1.0)).await?;

        assert!(get_product(&db, b.id, product.id).await?.is_none());
        assert!(matches!(
            delete_product(&db, b.id, product.id).await,
            Err(Error::NotFound { .. })
        ));
        assert!(list_products(&db, b.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_hides_it() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        let product = create_product(&db, client.id, new_product("Water", "W1", 1.0)).await?;

        let deleted = delete_product(&db, client.id, product.id).await?;
        assert!(deleted.is_deleted);
        assert!(list_products(&db, client.id).await?.is_empty());

        let again = delete_product(&db, client.id, product.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_low_stock_products() -> Result<()> {
        let (db, client) = setup_with_client().await?;

        let mut plenty = new_product("Plenty", "P1", 1.0);
        plenty.stock = 50;
        create_product(&db, client.id, plenty).await?;

        let mut scarce = new_product("Scarce", "S1", 1.0);
        scarce.stock = 5;
        let scarce = create_product(&db, client.id, scarce).await?;

        let low = low_stock_products(&db, client.id).await?;
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, scarce.id);
        Ok(())
    }
}
