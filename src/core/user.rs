//! User accounts - admins and vendor owners.

use crate::{
    entities::{Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Lowercases and trims an email, rejecting obviously malformed input.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(Error::validation(format!("Invalid email address '{email}'"))),
    }
}

/// Creates a user after validating the email and name.
///
/// # Errors
/// Returns an error if:
/// - The email is malformed or already registered
/// - The name is empty or whitespace-only
/// - The database insert fails
pub async fn create_user<C>(db: &C, email: &str, name: &str, role: Role) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let email = normalize_email(email)?;
    if name.trim().is_empty() {
        return Err(Error::validation("User name cannot be empty"));
    }

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::DuplicateEmail { email });
    }

    let user = user::ActiveModel {
        email: Set(email),
        name: Set(name.trim().to_string()),
        role: Set(role),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    user.insert(db).await.map_err(Into::into)
}

/// Retrieves a user by id.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Retrieves a user by email, case-insensitively.
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists users holding `role`, oldest first.
pub async fn list_users_by_role(db: &DatabaseConnection, role: Role) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(role))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
