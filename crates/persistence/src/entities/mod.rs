//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

/// Declares a Postgres enum mirror of a domain enum with conversions both
/// ways. Variants are stored in snake_case.
macro_rules! db_enum {
    ($db:ident, $pg:literal, $domain:ident { $($variant:ident),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
        #[sqlx(type_name = $pg, rename_all = "snake_case")]
        pub enum $db {
            $($variant),+
        }

        impl From<$db> for $domain {
            fn from(db: $db) -> Self {
                match db {
                    $($db::$variant => $domain::$variant),+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                match value {
                    $($domain::$variant => $db::$variant),+
                }
            }
        }
    };
}

pub mod alert;
pub mod audit_log;
pub mod company;
pub mod device;
pub mod location;
pub mod profile;
pub mod reading;
pub mod ticket;

pub use alert::{AlertEntity, AlertSeverityDb, AlertStatusDb, AlertTypeDb};
pub use audit_log::AuditLogEntity;
pub use company::CompanyEntity;
pub use device::{DeviceEntity, DeviceStatusDb};
pub use location::LocationEntity;
pub use profile::{AccountStatusDb, RoleDb, UserProfileEntity};
pub use reading::{DoorStatusDb, SensorReadingEntity};
pub use ticket::{TicketEntity, TicketStatusDb};
