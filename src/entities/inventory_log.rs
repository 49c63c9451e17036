//! Inventory log entity - Audit trail of every stock movement.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Why stock changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryReason {
    /// Stock entered when the product was created
    #[sea_orm(string_value = "INITIAL")]
    Initial,
    /// Goods received
    #[sea_orm(string_value = "RESTOCK")]
    Restock,
    /// Goods sold through an approved delivery
    #[sea_orm(string_value = "SALE")]
    Sale,
    /// Manual correction
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

/// Inventory log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_logs")]
pub struct Model {
    /// Unique identifier for the movement
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client
    pub client_id: i64,
    /// Product whose stock changed
    pub product_id: i64,
    /// Signed change in units
    pub change: i32,
    /// Stock on hand after the change
    pub stock_after: i32,
    /// Why the stock changed
    pub reason: InventoryReason,
    /// Free-form reference, e.g. an invoice number
    pub reference: Option<String>,
    /// When the movement happened
    pub created_at: DateTime,
}

/// Defines relationships between `InventoryLog` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each movement belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
