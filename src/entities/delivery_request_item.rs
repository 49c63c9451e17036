//! Delivery request line item.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery request item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_request_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent request
    pub delivery_request_id: i64,
    /// Requested product
    pub product_id: i64,
    /// Units requested, always positive
    pub quantity: i32,
    /// Product price captured when the request was filed
    pub unit_price: f64,
}

/// Defines relationships between `DeliveryRequestItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one request
    #[sea_orm(
        belongs_to = "super::delivery_request::Entity",
        from = "Column::DeliveryRequestId",
        to = "super::delivery_request::Column::Id"
    )]
    DeliveryRequest,
    /// Each line references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::delivery_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryRequest.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
