//! Notifications addressed to users.
//!
//! Notifications are stored rows; the channel records how the user wants to
//! be reached. Vendor-facing events go through [`notify_client`], which
//! resolves the client's owner.

use crate::{
    core::{client::require_client, subscription},
    entities::{Notification, NotificationChannel, notification},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::info;

/// Kind recorded for auto-approved delivery requests.
pub const KIND_DELIVERY_AUTO_APPROVED: &str = "delivery_auto_approved";
/// Kind recorded for requests waiting on the vendor.
pub const KIND_DELIVERY_PENDING: &str = "delivery_pending";
/// Kind recorded for low stock alerts.
pub const KIND_LOW_STOCK: &str = "low_stock";
/// Kind recorded for subscriptions about to end.
pub const KIND_SUBSCRIPTION_EXPIRING: &str = "subscription_expiring";

/// Stores a notification for a user.
///
/// # Errors
/// Returns an error if the title is empty or the insert fails.
pub async fn create_notification<C>(
    db: &C,
    user_id: i64,
    title: &str,
    message: &str,
    channel: NotificationChannel,
    kind: &str,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    if title.trim().is_empty() {
        return Err(Error::validation("Notification title cannot be empty"));
    }

    notification::ActiveModel {
        user_id: Set(user_id),
        title: Set(title.trim().to_string()),
        message: Set(message.to_string()),
        channel: Set(channel),
        kind: Set(kind.to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Sends an in-app notification to the owner of a client.
pub async fn notify_client<C>(
    db: &C,
    client_id: i64,
    title: &str,
    message: &str,
    kind: &str,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let client = require_client(db, client_id).await?;
    create_notification(
        db,
        client.user_id,
        title,
        message,
        NotificationChannel::InApp,
        kind,
    )
    .await
}

/// Lists a user's notifications, newest first.
pub async fn list_notifications(
    db: &DatabaseConnection,
    user_id: i64,
    unread_only: bool,
) -> Result<Vec<notification::Model>> {
    let mut query = Notification::find().filter(notification::Column::UserId.eq(user_id));
    if unread_only {
        query = query.filter(notification::Column::IsRead.eq(false));
    }
    query
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks one of the user's notifications as read.
///
/// # Errors
/// Returns [`Error::NotFound`] if the notification does not belong to the user.
pub async fn mark_read(
    db: &DatabaseConnection,
    user_id: i64,
    notification_id: i64,
) -> Result<notification::Model> {
    let found = Notification::find_by_id(notification_id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("notification", notification_id))?;

    if found.is_read {
        return Ok(found);
    }
    let mut active: notification::ActiveModel = found.into();
    active.is_read = Set(true);
    active.update(db).await.map_err(Into::into)
}

/// Marks all of the user's notifications as read, returning how many changed.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Number of unread notifications of a user.
pub async fn unread_count(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Reminds every client whose active subscription ends within `days` days.
///
/// Returns the notifications created.
pub async fn notify_expiring_subscriptions(
    db: &DatabaseConnection,
    today: NaiveDate,
    days: u64,
) -> Result<Vec<notification::Model>> {
    let expiring = subscription::expiring_subscriptions(db, today, days).await?;

    let mut sent = Vec::with_capacity(expiring.len());
    for sub in expiring {
        let message = format!(
            "Your {} subscription ends on {}. Renew to keep your plan features.",
            sub.plan, sub.end_date
        );
        sent.push(
            notify_client(
                db,
                sub.client_id,
                "Subscription ending soon",
                &message,
                KIND_SUBSCRIPTION_EXPIRING,
            )
            .await?,
        );
    }

    if !sent.is_empty() {
        info!(count = sent.len(), "Sent subscription expiry reminders");
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Plan;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_notify_client_reaches_owner() -> Result<()> {
        let (db, client) = setup_with_client().await?;

        let n = notify_client(&db, client.id, "Hello", "World", "test").await?;
        assert_eq!(n.user_id, client.user_id);
        assert_eq!(n.channel, NotificationChannel::InApp);
        assert!(!n.is_read);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_tracking() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        let user_id = client.user_id;

        let first = notify_client(&db, client.id, "One", "", "test").await?;
        notify_client(&db, client.id, "Two", "", "test").await?;
        notify_client(&db, client.id, "Three", "", "test").await?;
        assert_eq!(unread_count(&db, user_id).await?, 3);

        let read = mark_read(&db, user_id, first.id).await?;
        assert!(read.is_read);
        assert_eq!(unread_count(&db, user_id).await?, 2);
        assert_eq!(list_notifications(&db, user_id, true).await?.len(), 2);

        let all = list_notifications(&db, user_id, false).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "Three");

        assert_eq!(mark_all_read(&db, user_id).await?, 2);
        assert_eq!(unread_count(&db, user_id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_other_users_notification() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        let n = notify_client(&db, client.id, "Private", "", "test").await?;

        let result = mark_read(&db, client.user_id + 100, n.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_title_rejected() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        let result = notify_client(&db, client.id, " ", "body", "test").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_notify_expiring_subscriptions() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        subscription::create_subscription(
            &db,
            client.id,
            Plan::Standard,
            date(2024, 5, 1),
            date(2024, 5, 12),
        )
        .await?;

        let sent = notify_expiring_subscriptions(&db, date(2024, 5, 10), 3).await?;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, KIND_SUBSCRIPTION_EXPIRING);
        assert!(sent[0].message.contains("STANDARD"));

        let none = notify_expiring_subscriptions(&db, date(2024, 5, 1), 3).await?;
        assert!(none.is_empty());
        Ok(())
    }
}
