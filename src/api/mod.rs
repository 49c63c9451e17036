//! JSON HTTP API.
//!
//! Handlers are thin: they extract path, query and body values, call into
//! [`crate::core`] and serialize the result. Errors become responses through
//! the `IntoResponse` impl in [`error`].

pub mod admin;
pub mod deliveries;
pub mod error;
pub mod notifications;
pub mod products;
pub mod rules;
pub mod sales;

use crate::{config::AppConfig, errors::Result};
use axum::{Json, Router, routing::get};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Business time zone used for rule evaluation and "today"
    pub offset: FixedOffset,
}

impl AppState {
    /// Builds the state, resolving the configured business time zone.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Config`] if the UTC offset is out of range.
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Result<Self> {
        let offset = config.approval.offset()?;
        Ok(Self {
            db: Arc::new(db),
            config: Arc::new(config),
            offset,
        })
    }

    /// Current instant.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Today's date in the business time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset).date_naive()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(admin::routes())
        .merge(products::routes())
        .merge(deliveries::routes())
        .merge(sales::routes())
        .merge(rules::routes())
        .merge(notifications::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
