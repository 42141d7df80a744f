//! Repository implementations for database operations.

pub mod alert;
pub mod audit_log;
pub mod company;
pub mod device;
pub mod directory;
mod filter;
pub mod location;
pub mod profile;
pub mod reading;
pub mod ticket;

pub use alert::AlertRepository;
pub use audit_log::AuditLogRepository;
pub use company::CompanyRepository;
pub use device::DeviceRepository;
pub use directory::PgDirectoryStore;
pub use location::LocationRepository;
pub use profile::ProfileRepository;
pub use reading::ReadingRepository;
pub use ticket::TicketRepository;

use sqlx::PgPool;
use std::sync::Arc;

/// Every store port backed by one connection pool.
#[derive(Clone)]
pub struct PgStores {
    pub directory: Arc<PgDirectoryStore>,
    pub readings: Arc<ReadingRepository>,
    pub alerts: Arc<AlertRepository>,
    pub audit: Arc<AuditLogRepository>,
    pub tickets: Arc<TicketRepository>,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self {
            directory: Arc::new(PgDirectoryStore::new(pool.clone())),
            readings: Arc::new(ReadingRepository::new(pool.clone())),
            alerts: Arc::new(AlertRepository::new(pool.clone())),
            audit: Arc::new(AuditLogRepository::new(pool.clone())),
            tickets: Arc::new(TicketRepository::new(pool)),
        }
    }
}
