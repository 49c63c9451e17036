//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        client::{self, NewClient},
        product::{self, NewProduct},
        subscription,
    },
    entities::{Plan, client_profile, product as product_entity},
    errors::Result,
};
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Fixed "today" used by tests (a Monday).
pub fn today() -> NaiveDate {
    date(2024, 5, 6)
}

/// 10:00 UTC on [`today`].
pub fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates a client whose email is derived from the business name.
///
/// "Shop A" becomes `shop-a@example.com`.
pub async fn create_test_client(
    db: &DatabaseConnection,
    name: &str,
) -> Result<client_profile::Model> {
    let slug = name.trim().to_lowercase().replace(' ', "-");
    client::create_client(
        db,
        NewClient {
            email: format!("{slug}@example.com"),
            owner_name: format!("{name} Owner"),
            business_name: name.to_string(),
            phone: None,
            address: None,
        },
    )
    .await
}

/// Creates a product with sensible defaults.
///
/// # Defaults
/// * price: 2.5
/// * stock: 20
/// * threshold: 5
pub async fn create_test_product(
    db: &DatabaseConnection,
    client_id: i64,
    name: &str,
    sku: &str,
) -> Result<product_entity::Model> {
    product::create_product(
        db,
        client_id,
        NewProduct {
            name: name.to_string(),
            sku: sku.to_string(),
            price: 2.5,
            stock: 20,
            low_stock_threshold: product::DEFAULT_LOW_STOCK_THRESHOLD,
        },
    )
    .await
}

/// Sets up a database with one client.
pub async fn setup_with_client() -> Result<(DatabaseConnection, client_profile::Model)> {
    let db = setup_test_db().await?;
    let client = create_test_client(&db, "Test Shop").await?;
    Ok((db, client))
}

/// Sets up a database with one client and one stocked product.
pub async fn setup_with_product() -> Result<(
    DatabaseConnection,
    client_profile::Model,
    product_entity::Model,
)> {
    let (db, client) = setup_with_client().await?;
    let product = create_test_product(&db, client.id, "Water 20L", "WATER-20").await?;
    Ok((db, client, product))
}

/// Sets up a client with an active subscription covering [`today`].
pub async fn setup_with_plan(plan: Plan) -> Result<(DatabaseConnection, client_profile::Model)> {
    let (db, client) = setup_with_client().await?;
    let start = today().checked_sub_days(Days::new(5)).unwrap_or_default();
    let end = today().checked_add_days(Days::new(25)).unwrap_or_default();
    subscription::create_subscription(&db, client.id, plan, start, end).await?;
    Ok((db, client))
}

/// [`setup_with_plan`] plus one stocked product.
pub async fn setup_with_product_and_plan(
    plan: Plan,
) -> Result<(
    DatabaseConnection,
    client_profile::Model,
    product_entity::Model,
)> {
    let (db, client) = setup_with_plan(plan).await?;
    let product = create_test_product(&db, client.id, "Water 20L", "WATER-20").await?;
    Ok((db, client, product))
}
