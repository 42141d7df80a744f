//! Persistence layer for the facility monitoring backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain store ports

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;

pub use db::{create_pool, DatabaseConfig};
pub use repositories::PgStores;
