//! Notification entity - Alerts addressed to a user over a delivery channel.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery channel of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    /// Shown in the dashboard
    #[sea_orm(string_value = "IN_APP")]
    InApp,
    /// Sent by email
    #[sea_orm(string_value = "EMAIL")]
    Email,
    /// Sent by text message
    #[sea_orm(string_value = "SMS")]
    Sms,
}

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Delivery channel
    pub channel: NotificationChannel,
    /// Category, e.g. `"delivery_auto_approved"`, `"low_stock"`
    pub kind: String,
    /// Whether the recipient has read it
    pub is_read: bool,
    /// When the notification was created
    pub created_at: DateTime,
}

/// Defines relationships between Notification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each notification belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
