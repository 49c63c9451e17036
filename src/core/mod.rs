//! Framework-agnostic business logic.
//!
//! Every operation takes a database connection and returns [`crate::errors::Result`];
//! the HTTP layer only translates requests and responses.

pub mod auto_approval;
pub mod client;
pub mod delivery;
pub mod inventory;
pub mod notification;
pub mod plan;
pub mod product;
pub mod report;
pub mod rules;
pub mod sale;
pub mod seed;
pub mod subscription;
pub mod user;
