//! Startup seeding of admins and demo vendors from `[seed]` configuration.
//!
//! Seeding is idempotent: accounts whose email already exists are skipped, so
//! it runs safely on every start.

use crate::{
    config::settings::SeedConfig,
    core::{
        client::{self, NewClient},
        subscription, user,
    },
    entities::Role,
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate};
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

/// What a seeding run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Admin users created
    pub admins_created: usize,
    /// Clients created
    pub clients_created: usize,
}

/// Creates the configured admins and clients that do not exist yet.
///
/// New clients get a subscription starting `today` for their configured
/// number of days.
///
/// # Errors
/// Returns an error if an entry fails validation or a database operation fails.
pub async fn seed_initial_data(
    db: &DatabaseConnection,
    seed: &SeedConfig,
    today: NaiveDate,
) -> Result<SeedSummary> {
    info!(
        "Starting seed. Found {} admins and {} clients in configuration.",
        seed.admins.len(),
        seed.clients.len()
    );
    let mut summary = SeedSummary::default();

    for admin in &seed.admins {
        if user::get_user_by_email(db, &admin.email).await?.is_some() {
            debug!("Admin '{}' already exists. Skipping.", admin.email);
            continue;
        }
        user::create_user(db, &admin.email, &admin.name, Role::Admin).await?;
        summary.admins_created += 1;
    }

    for cfg_client in &seed.clients {
        if user::get_user_by_email(db, &cfg_client.email).await?.is_some() {
            debug!("Client '{}' already exists. Skipping.", cfg_client.email);
            continue;
        }

        let created = client::create_client(
            db,
            NewClient {
                email: cfg_client.email.clone(),
                owner_name: cfg_client.owner_name.clone(),
                business_name: cfg_client.business_name.clone(),
                phone: None,
                address: None,
            },
        )
        .await?;

        let end_date = today
            .checked_add_days(Days::new(u64::from(cfg_client.subscription_days.max(1))))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Subscription length for '{}' is out of range",
                    cfg_client.email
                ))
            })?;
        subscription::create_subscription(db, created.id, cfg_client.plan, today, end_date)
            .await?;
        summary.clients_created += 1;
    }

    info!(
        admins = summary.admins_created,
        clients = summary.clients_created,
        "Finished seeding"
    );
    Ok(summary)
}
