//! Sale entity - The invoice produced when a delivery request is approved.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Selling client
    pub client_id: i64,
    /// Originating delivery request
    pub delivery_request_id: Option<i64>,
    /// Invoice number, `INV-{client}-{sequence}`
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// Customer name copied from the request
    pub customer_name: String,
    /// Customer phone copied from the request
    pub customer_phone: String,
    /// Invoice total
    pub total_amount: f64,
    /// When the sale was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one client
    #[sea_orm(
        belongs_to = "super::client_profile::Entity",
        from = "Column::ClientId",
        to = "super::client_profile::Column::Id"
    )]
    ClientProfile,
    /// One sale has many line items
    #[sea_orm(has_many = "super::sale_item::Entity")]
    Items,
}

impl Related<super::client_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientProfile.def()
    }
}

impl Related<super::sale_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
