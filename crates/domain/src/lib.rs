//! Domain layer for the facility monitoring backend.
//!
//! This crate contains:
//! - Domain models (tenants, devices, readings, alerts, tickets, audit entries)
//! - The store ports implemented by the persistence layer
//! - Business services: authorization, alert lifecycle, audit trail
//! - An in-memory store for tests, behind the `test-utils` feature

pub mod error;
pub mod models;
pub mod ports;
pub mod services;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{DomainError, ForbiddenReason, StoreError};
