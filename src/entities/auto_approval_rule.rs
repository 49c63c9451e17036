//! Auto-approval rule entity - A vendor's stored approval condition.
//!
//! List-valued conditions (`customer_phones`, `product_ids`, `allowed_days`)
//! are stored as JSON arrays in text columns; `core::auto_approval` converts
//! rows into engine rules. Times are `HH:MM` strings in business local time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which predicate a rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Customer phone whitelist
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    /// Product whitelist
    #[sea_orm(string_value = "PRODUCT")]
    Product,
    /// Order total range
    #[sea_orm(string_value = "AMOUNT")]
    Amount,
    /// Day-of-week and time-of-day window
    #[sea_orm(string_value = "TIME")]
    Time,
    /// All present sub-conditions must match
    #[sea_orm(string_value = "COMBINED")]
    Combined,
}

/// Auto-approval rule database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auto_approval_rules")]
pub struct Model {
    /// Unique identifier for the rule
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client
    pub client_id: i64,
    /// Display name
    pub name: String,
    /// Predicate kind
    pub rule_type: RuleType,
    /// Evaluation order, 1 is evaluated first
    pub priority: i32,
    /// Inactive rules are skipped
    pub is_active: bool,
    /// JSON array of customer phones
    pub customer_phones: String,
    /// JSON array of product ids
    pub product_ids: String,
    /// Lower bound on the order total
    pub min_amount: Option<f64>,
    /// Upper bound on the order total
    pub max_amount: Option<f64>,
    /// JSON array of weekday names (`"Mon"` .. `"Sun"`)
    pub allowed_days: String,
    /// Window start, `HH:MM`
    pub start_time: Option<String>,
    /// Window end, `HH:MM`
    pub end_time: Option<String>,
    /// When the rule was created
    pub created_at: DateTime,
    /// When the rule was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `AutoApprovalRule` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rule belongs to one client
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
