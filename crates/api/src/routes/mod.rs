//! HTTP route handlers.

pub mod alerts;
pub mod audit_logs;
pub mod companies;
pub mod devices;
pub mod health;
pub mod locations;
pub mod onboarding;
pub mod profile;
pub mod sensor_data;
pub mod tickets;
pub mod users;
