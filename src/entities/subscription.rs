//! Subscription entity - Billing plan of a client over a date range.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subscription tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    /// Entry tier, no auto-approval
    #[sea_orm(string_value = "BASIC")]
    Basic,
    /// Mid tier, limited auto-approval rules
    #[sea_orm(string_value = "STANDARD")]
    Standard,
    /// Top tier, unlimited rules
    #[sea_orm(string_value = "PREMIUM")]
    Premium,
}

/// Lifecycle state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Currently billed
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Cancelled before its end date
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    /// Ran past its end date
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
}

/// Subscription database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Subscribed client
    pub client_id: i64,
    /// Tier
    pub plan: Plan,
    /// Lifecycle state
    pub status: SubscriptionStatus,
    /// First day covered (inclusive)
    pub start_date: Date,
    /// Last day covered (inclusive)
    pub end_date: Date,
    /// When the subscription was created
    pub created_at: DateTime,
}

/// Defines relationships between Subscription and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each subscription belongs to one client
    #[sea_orm(
        belongs_to = "super::client_profile::Entity",
        from = "Column::ClientId",
        to = "super::client_profile::Column::Id"
    )]
    ClientProfile,
}

impl Related<super::client_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
