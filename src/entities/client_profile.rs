//! Client profile entity - The vendor business (tenant) record.
//!
//! Every tenant-scoped table carries a `client_id` pointing here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_profiles")]
pub struct Model {
    /// Unique identifier for the client
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning vendor user
    pub user_id: i64,
    /// Trading name of the business
    pub business_name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Business address
    pub address: Option<String>,
    /// Deactivated clients keep their data but cannot take new requests
    pub is_active: bool,
    /// When the client was created
    pub created_at: DateTime,
    /// When the client was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `ClientProfile` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each client belongs to one vendor user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One client has many subscriptions over time
    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscriptions,
    /// One client has many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
    /// One client has many auto-approval rules
    #[sea_orm(has_many = "super::auto_approval_rule::Entity")]
    AutoApprovalRules,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::auto_approval_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AutoApprovalRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
