//! Subscription lifecycle and plan lookup.
//!
//! A client holds at most one `ACTIVE` subscription covering any given day.
//! Without one the client is treated as being on the BASIC plan.

use crate::{
    core::client::require_client,
    entities::{Plan, Subscription, SubscriptionStatus, subscription},
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::info;

/// Creates an `ACTIVE` subscription covering `start_date..=end_date`.
///
/// # Errors
/// Returns an error if:
/// - The client does not exist
/// - `end_date` is not after `start_date`
/// - Another active subscription of the client overlaps the range
/// - The database insert fails
pub async fn create_subscription(
    db: &DatabaseConnection,
    client_id: i64,
    plan: Plan,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<subscription::Model> {
    require_client(db, client_id).await?;

    if end_date <= start_date {
        return Err(Error::validation(format!(
            "Subscription end date {end_date} must be after start date {start_date}"
        )));
    }

    let overlapping = Subscription::find()
        .filter(subscription::Column::ClientId.eq(client_id))
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .filter(subscription::Column::StartDate.lte(end_date))
        .filter(subscription::Column::EndDate.gte(start_date))
        .count(db)
        .await?;
    if overlapping > 0 {
        return Err(Error::validation(
            "Subscription overlaps an existing active subscription",
        ));
    }

    let created = subscription::ActiveModel {
        client_id: Set(client_id),
        plan: Set(plan),
        status: Set(SubscriptionStatus::Active),
        start_date: Set(start_date),
        end_date: Set(end_date),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(client_id, %plan, %start_date, %end_date, "Subscription created");
    Ok(created)
}

/// The active subscription covering `today`, if any.
pub async fn current_subscription<C>(
    db: &C,
    client_id: i64,
    today: NaiveDate,
) -> Result<Option<subscription::Model>>
where
    C: ConnectionTrait,
{
    Subscription::find()
        .filter(subscription::Column::ClientId.eq(client_id))
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .filter(subscription::Column::StartDate.lte(today))
        .filter(subscription::Column::EndDate.gte(today))
        .order_by_desc(subscription::Column::StartDate)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The plan in force for the client on `today`; BASIC when unsubscribed.
pub async fn current_plan<C>(db: &C, client_id: i64, today: NaiveDate) -> Result<Plan>
where
    C: ConnectionTrait,
{
    Ok(current_subscription(db, client_id, today)
        .await?
        .map_or(Plan::Basic, |s| s.plan))
}

/// Lists every subscription of a client, newest first.
pub async fn list_subscriptions(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::ClientId.eq(client_id))
        .order_by_desc(subscription::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Switches the plan of the subscription currently in force.
///
/// # Errors
/// Returns [`Error::NotFound`] if the client has no current subscription.
pub async fn change_plan(
    db: &DatabaseConnection,
    client_id: i64,
    plan: Plan,
    today: NaiveDate,
) -> Result<subscription::Model> {
    let current = current_subscription(db, client_id, today)
        .await?
        .ok_or_else(|| Error::not_found("subscription", format!("client {client_id}")))?;

    let old_plan = current.plan;
    let mut active: subscription::ActiveModel = current.into();
    active.plan = Set(plan);
    let updated = active.update(db).await?;

    info!(client_id, from = %old_plan, to = %plan, "Subscription plan changed");
    Ok(updated)
}

/// Cancels one of the client's subscriptions.
///
/// # Errors
/// Returns [`Error::NotFound`] if the subscription does not belong to the client,
/// or [`Error::Validation`] if it is not active.
pub async fn cancel_subscription(
    db: &DatabaseConnection,
    client_id: i64,
    subscription_id: i64,
) -> Result<subscription::Model> {
    let found = Subscription::find_by_id(subscription_id)
        .filter(subscription::Column::ClientId.eq(client_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("subscription", subscription_id))?;

    if found.status != SubscriptionStatus::Active {
        return Err(Error::validation(format!(
            "Subscription {subscription_id} is not active"
        )));
    }

    let mut active: subscription::ActiveModel = found.into();
    active.status = Set(SubscriptionStatus::Cancelled);
    active.update(db).await.map_err(Into::into)
}

/// Marks every active subscription that ended before `today` as expired.
///
/// Returns the number of subscriptions expired.
pub async fn expire_subscriptions(db: &DatabaseConnection, today: NaiveDate) -> Result<u64> {
    let result = Subscription::update_many()
        .col_expr(
            subscription::Column::Status,
            Expr::value(SubscriptionStatus::Expired),
        )
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .filter(subscription::Column::EndDate.lt(today))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(count = result.rows_affected, "Expired subscriptions");
    }
    Ok(result.rows_affected)
}

/// Active subscriptions ending within `days` days of `today` (inclusive).
pub async fn expiring_subscriptions(
    db: &DatabaseConnection,
    today: NaiveDate,
    days: u64,
) -> Result<Vec<subscription::Model>> {
    let horizon = today
        .checked_add_days(Days::new(days))
        .ok_or_else(|| Error::validation(format!("Horizon of {days} days is out of range")))?;

    Subscription::find()
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .filter(subscription::Column::EndDate.gte(today))
        .filter(subscription::Column::EndDate.lte(horizon))
        .order_by_asc(subscription::Column::EndDate)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_subscription_date_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Shop").await?;

        let result =
            create_subscription(&db, client.id, Plan::Standard, date(2024, 5, 1), date(2024, 5, 1))
                .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_overlapping_subscription_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Shop").await?;

        create_subscription(&db, client.id, Plan::Standard, date(2024, 5, 1), date(2024, 5, 31))
            .await?;
        let result =
            create_subscription(&db, client.id, Plan::Premium, date(2024, 5, 31), date(2024, 6, 30))
                .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Adjacent range is fine
        create_subscription(&db, client.id, Plan::Premium, date(2024, 6, 1), date(2024, 6, 30))
            .await?;
        assert_eq!(list_subscriptions(&db, client.id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_current_plan_defaults_to_basic() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Shop").await?;

        assert_eq!(current_plan(&db, client.id, date(2024, 5, 10)).await?, Plan::Basic);

        create_subscription(&db, client.id, Plan::Premium, date(2024, 5, 1), date(2024, 5, 31))
            .await?;
        assert_eq!(current_plan(&db, client.id, date(2024, 5, 10)).await?, Plan::Premium);
        assert_eq!(current_plan(&db, client.id, date(2024, 5, 31)).await?, Plan::Premium);
        assert_eq!(current_plan(&db, client.id, date(2024, 6, 1)).await?, Plan::Basic);
        Ok(())
    }

    #[tokio::test]
    async fn test_change_plan_and_cancel() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Shop").await?;
        let today = date(2024, 5, 10);

        assert!(matches!(
            change_plan(&db, client.id, Plan::Premium, today).await,
            Err(Error::NotFound { .. })
        ));

        let sub =
            create_subscription(&db, client.id, Plan::Standard, date(2024, 5, 1), date(2024, 5, 31))
                .await?;
        let changed = change_plan(&db, client.id, Plan::Premium, today).await?;
        assert_eq!(changed.plan, Plan::Premium);

        let cancelled = cancel_subscription(&db, client.id, sub.id).await?;
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert_eq!(current_plan(&db, client.id, today).await?, Plan::Basic);

        assert!(matches!(
            cancel_subscription(&db, client.id, sub.id).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_expire_and_expiring_subscriptions() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_client(&db, "Shop A").await?;
        let b = create_test_client(&db, "Shop B").await?;

        create_subscription(&db, a.id, Plan::Standard, date(2024, 4, 1), date(2024, 4, 30)).await?;
        create_subscription(&db, b.id, Plan::Premium, date(2024, 5, 1), date(2024, 5, 15)).await?;

        let today = date(2024, 5, 10);
        let soon = expiring_subscriptions(&db, today, 7).await?;
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].client_id, b.id);

        assert_eq!(expire_subscriptions(&db, today).await?, 1);
        assert_eq!(expire_subscriptions(&db, today).await?, 0);

        let history = list_subscriptions(&db, a.id).await?;
        assert_eq!(history[0].status, SubscriptionStatus::Expired);
        Ok(())
    }
}
