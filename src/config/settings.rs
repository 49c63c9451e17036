//! Application settings loaded from `config.toml`.
//!
//! Every section is optional; missing values fall back to defaults so the
//! service starts with an empty file. `DATABASE_URL` and `BIND_ADDRESS`
//! environment variables take precedence over the file.

use crate::entities::Plan;
use crate::errors::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Auto-approval settings
    pub approval: ApprovalConfig,
    /// Accounts created at startup when missing
    pub seed: SeedConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// `[database]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: super::database::DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// `[approval]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Offset of the business time zone from UTC, used by TIME rules
    pub utc_offset_minutes: i32,
}

impl ApprovalConfig {
    /// Business time zone as a chrono offset.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the offset is outside +/- 24h.
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| Error::Config {
            message: format!(
                "approval.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ),
        })
    }
}

/// `[seed]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Administrator accounts
    pub admins: Vec<SeedAdmin>,
    /// Demo vendors with their plan
    pub clients: Vec<SeedClient>,
}

/// One `[[seed.admins]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAdmin {
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
}

/// One `[[seed.clients]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct SeedClient {
    /// Vendor login email
    pub email: String,
    /// Vendor display name
    pub owner_name: String,
    /// Business name
    pub business_name: String,
    /// Plan of the initial subscription
    #[serde(default = "default_seed_plan")]
    pub plan: Plan,
    /// Length of the initial subscription in days
    #[serde(default = "default_seed_days")]
    pub subscription_days: u32,
}

const fn default_seed_plan() -> Plan {
    Plan::Basic
}

const fn default_seed_days() -> u32 {
    30
}

/// Parses configuration from a TOML string.
///
/// # Errors
/// Returns [`Error::Config`] when the TOML is invalid.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    debug!("Attempting to load configuration from: {path:?}");
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration the way `main` needs it.
///
/// Reads `CONFIG_PATH` (default `config.toml`); a missing file yields the
/// defaults. `DATABASE_URL` and `BIND_ADDRESS` override the file.
///
/// # Errors
/// Returns an error if an existing file cannot be parsed.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        info!("No configuration file at {path}, using defaults");
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(addr) = std::env::var("BIND_ADDRESS") {
        config.server.bind_address = addr;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            bind_address = "0.0.0.0:8080"

            [database]
            url = "sqlite::memory:"

            [approval]
            utc_offset_minutes = 330

            [[seed.admins]]
            email = "admin@example.com"
            name = "Admin"

            [[seed.clients]]
            email = "shop@example.com"
            owner_name = "Sam"
            business_name = "Sam's Water"
            plan = "STANDARD"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.approval.offset().unwrap().local_minus_utc(), 330 * 60);
        assert_eq!(config.seed.admins.len(), 1);
        assert_eq!(config.seed.clients[0].plan, Plan::Standard);
        assert_eq!(config.seed.clients[0].subscription_days, 30);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(
            config.database.url,
            super::super::database::DEFAULT_DATABASE_URL
        );
        assert_eq!(config.approval.utc_offset_minutes, 0);
        assert!(config.seed.clients.is_empty());
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let config = parse_config("[approval]\nutc_offset_minutes = 100000").unwrap();
        assert!(matches!(config.approval.offset(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = parse_config("[server\nbind_address = 1");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
