//! User entity - Represents a person who can act in the CRM.
//!
//! Admins manage vendors; vendors own exactly one client profile.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Vendor operating a client business
    #[sea_orm(string_value = "VENDOR")]
    Vendor,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, stored lowercase
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: Role,
    /// When the user was created
    pub created_at: DateTime,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A vendor user has one client profile
    #[sea_orm(has_one = "super::client_profile::Entity")]
    ClientProfile,
    /// A user receives many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::client_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientProfile.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
