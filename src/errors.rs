//! Unified error types for the CRM.
//!
//! Domain failures use struct variants so callers (and tests) can match on the
//! offending value. Infrastructure errors are wrapped with `#[from]`.

use thiserror::Error;

/// All errors produced by the core and API layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Input failed a business validation rule
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// Money amount is negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Quantity is zero or negative
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// Entity lookup failed (or the entity belongs to another vendor)
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity, e.g. `"product"`
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// SKU already used by another product of the same vendor
    #[error("SKU '{sku}' is already in use")]
    DuplicateSku {
        /// The duplicated SKU
        sku: String,
    },

    /// Email already registered
    #[error("Email '{email}' is already registered")]
    DuplicateEmail {
        /// The duplicated email
        email: String,
    },

    /// Not enough stock to satisfy a sale
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product that ran short
        product_id: i64,
        /// Stock on hand
        available: i32,
        /// Quantity requested
        requested: i32,
    },

    /// Subscription plan does not allow another auto-approval rule
    #[error("Plan {plan} allows at most {limit} auto-approval rules")]
    PlanLimitReached {
        /// Plan name
        plan: String,
        /// Maximum number of rules for the plan
        limit: usize,
    },

    /// Delivery request is not in a state that permits the operation
    #[error("Delivery request {id} is {status}, expected PENDING")]
    InvalidStatus {
        /// Delivery request id
        id: i64,
        /// Current status
        status: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON (de)serialization of stored rule conditions
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (config file, socket binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::not_found("product", 42);
        assert_eq!(err.to_string(), "product not found: 42");

        let err = Error::PlanLimitReached {
            plan: "STANDARD".to_string(),
            limit: 3,
        };
        assert_eq!(
            err.to_string(),
            "Plan STANDARD allows at most 3 auto-approval rules"
        );
    }
}
