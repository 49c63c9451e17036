//! Delivery request entity - A customer order awaiting (or past) approval.
//!
//! Requests are created `PENDING`; approval turns them into a sale, either
//! manually or through a matching auto-approval rule.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval state of a delivery request
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Waiting for a decision
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Approved and converted into a sale
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Refused by the vendor
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl DeliveryStatus {
    /// Wire/database spelling of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Delivery request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Client the request was filed with
    pub client_id: i64,
    /// Customer name
    pub customer_name: String,
    /// Customer phone, matched by CUSTOMER rules
    pub customer_phone: String,
    /// Delivery address
    pub address: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Sum of `quantity * unit_price` over the items
    pub total_amount: f64,
    /// Approval state
    pub status: DeliveryStatus,
    /// Whether a rule approved this request
    pub auto_approved: bool,
    /// Rule that approved the request, if any
    pub approval_rule_id: Option<i64>,
    /// Reason given when rejected
    pub rejection_reason: Option<String>,
    /// When the request was submitted
    pub requested_at: DateTimeUtc,
    /// When the request was approved or rejected
    pub decided_at: Option<DateTimeUtc>,
}

/// Defines relationships between `DeliveryRequest` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request belongs to one client
    #[sea_orm(
        belongs_to = "super::client_profile::Entity",
        from = "Column::ClientId",
        to = "super::client_profile::Column::Id"
    )]
    ClientProfile,
    /// One request has many line items
    #[sea_orm(has_many = "super::delivery_request_item::Entity")]
    Items,
}

impl Related<super::client_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientProfile.def()
    }
}

impl Related<super::delivery_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
