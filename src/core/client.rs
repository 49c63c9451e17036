//! Client (vendor) management.
//!
//! Creating a client creates its vendor user and business profile together.
//! Most tenant-scoped operations start with [`require_client`].

use crate::{
    core::user,
    entities::{ClientProfile, Role, client_profile, user as user_entity},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Input for [`create_client`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    /// Vendor login email
    pub email: String,
    /// Vendor display name
    pub owner_name: String,
    /// Business name
    pub business_name: String,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Business address
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial update for [`update_client`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientUpdate {
    /// New business name
    pub business_name: Option<String>,
    /// New contact phone
    pub phone: Option<String>,
    /// New address
    pub address: Option<String>,
}

/// A client with its owning user
#[derive(Debug, Clone, Serialize)]
pub struct ClientDetails {
    /// Business profile
    pub profile: client_profile::Model,
    /// Vendor user
    pub owner: user_entity::Model,
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Creates a vendor user and its client profile in one transaction.
///
/// # Errors
/// Returns an error if the business name is empty, the email is invalid or
/// taken, or a database operation fails.
pub async fn create_client(
    db: &DatabaseConnection,
    input: NewClient,
) -> Result<client_profile::Model> {
    if input.business_name.trim().is_empty() {
        return Err(Error::validation("Business name cannot be empty"));
    }

    let txn = db.begin().await?;

    let owner = user::create_user(&txn, &input.email, &input.owner_name, Role::Vendor).await?;

    let now = chrono::Utc::now().naive_utc();
    let profile = client_profile::ActiveModel {
        user_id: Set(owner.id),
        business_name: Set(input.business_name.trim().to_string()),
        phone: Set(clean_optional(input.phone)),
        address: Set(clean_optional(input.address)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(client_id = profile.id, "Created client '{}'", profile.business_name);
    Ok(profile)
}

/// Retrieves a client by id.
pub async fn get_client<C>(db: &C, client_id: i64) -> Result<Option<client_profile::Model>>
where
    C: ConnectionTrait,
{
    ClientProfile::find_by_id(client_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a client by id, failing with [`Error::NotFound`] if it does not exist.
pub async fn require_client<C>(db: &C, client_id: i64) -> Result<client_profile::Model>
where
    C: ConnectionTrait,
{
    get_client(db, client_id)
        .await?
        .ok_or_else(|| Error::not_found("client", client_id))
}

/// Retrieves a client together with its vendor user.
pub async fn get_client_details(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<ClientDetails> {
    let profile = require_client(db, client_id).await?;
    let owner = user::get_user(db, profile.user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", profile.user_id))?;
    Ok(ClientDetails { profile, owner })
}

/// Lists all clients ordered by business name.
pub async fn list_clients(db: &DatabaseConnection) -> Result<Vec<client_profile::Model>> {
    ClientProfile::find()
        .order_by_asc(client_profile::Column::BusinessName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a client profile.
///
/// # Errors
/// Returns an error if the client does not exist, the new business name is
/// empty, or the update fails.
pub async fn update_client(
    db: &DatabaseConnection,
    client_id: i64,
    update: ClientUpdate,
) -> Result<client_profile::Model> {
    let mut profile: client_profile::ActiveModel = require_client(db, client_id).await?.into();

    if let Some(name) = update.business_name {
        if name.trim().is_empty() {
            return Err(Error::validation("Business name cannot be empty"));
        }
        profile.business_name = Set(name.trim().to_string());
    }
    if let Some(phone) = update.phone {
        profile.phone = Set(clean_optional(Some(phone)));
    }
    if let Some(address) = update.address {
        profile.address = Set(clean_optional(Some(address)));
    }
    profile.updated_at = Set(chrono::Utc::now().naive_utc());

    profile.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a client.
pub async fn set_client_active(
    db: &DatabaseConnection,
    client_id: i64,
    is_active: bool,
) -> Result<client_profile::Model> {
    let mut profile: client_profile::ActiveModel = require_client(db, client_id).await?.into();
    profile.is_active = Set(is_active);
    profile.updated_at = Set(chrono::Utc::now().naive_utc());
    let profile = profile.update(db).await?;

    info!(client_id, is_active, "Client activation changed");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_client_creates_vendor_user() -> Result<()> {
        let db = setup_test_db().await?;

        let client = create_client(
            &db,
            NewClient {
                email: "water@shop.com".to_string(),
                owner_name: "Wendy".to_string(),
                business_name: "  Wendy's Water ".to_string(),
                phone: Some("  ".to_string()),
                address: None,
            },
        )
        .await?;

        assert_eq!(client.business_name, "Wendy's Water");
        assert!(client.is_active);
        assert!(client.phone.is_none());

        let details = get_client_details(&db, client.id).await?;
        assert_eq!(details.owner.role, Role::Vendor);
        assert_eq!(details.owner.email, "water@shop.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_client_duplicate_email_rolls_back() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "Shop A").await?;

        let result = create_client(
            &db,
            NewClient {
                email: "shop-a@example.com".to_string(),
                owner_name: "Other".to_string(),
                business_name: "Shop B".to_string(),
                phone: None,
                address: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::DuplicateEmail { .. })));
        assert_eq!(list_clients(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_deactivate_client() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Shop A").await?;

        let updated = update_client(
            &db,
            client.id,
            ClientUpdate {
                phone: Some("555-0100".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.business_name, "Shop A");

        let result = update_client(
            &db,
            client.id,
            ClientUpdate {
                business_name: Some(String::new()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let inactive = set_client_active(&db, client.id, false).await?;
        assert!(!inactive.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_require_client_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = require_client(&db, 404).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "client",
                ..
            })
        ));
        Ok(())
    }
}
