//! Custom Axum extractors.

pub mod client_ip;
pub mod ingest_key;
pub mod session;

pub use client_ip::ClientIp;
pub use ingest_key::{IngestKey, INGEST_KEY_HEADER};
pub use session::{CurrentActor, Session};
