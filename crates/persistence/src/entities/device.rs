//! Device entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Device, DeviceStatus, Thresholds};
use sqlx::FromRow;

db_enum!(DeviceStatusDb, "device_status", DeviceStatus { Active, Inactive, Maintenance });

/// Database row mapping for the devices table, joined with the owning
/// location's company.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub id: i64,
    pub location_id: i64,
    pub company_id: i64,
    pub name: String,
    pub device_type: String,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub status: DeviceStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeviceEntity> for Device {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            id: entity.id,
            location_id: entity.location_id,
            company_id: entity.company_id,
            name: entity.name,
            device_type: entity.device_type,
            thresholds: Thresholds {
                temperature_min: entity.temperature_min,
                temperature_max: entity.temperature_max,
                humidity_min: entity.humidity_min,
                humidity_max: entity.humidity_max,
            },
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_entity_thresholds() {
        let now = Utc::now();
        let device: Device = DeviceEntity {
            id: 9,
            location_id: 3,
            company_id: 1,
            name: "Walk-in chiller".to_string(),
            device_type: "chiller".to_string(),
            temperature_min: Some(2.0),
            temperature_max: Some(8.0),
            humidity_min: None,
            humidity_max: Some(85.0),
            status: DeviceStatusDb::Maintenance,
            created_at: now,
            updated_at: now,
        }
        .into();

        assert_eq!(device.thresholds.temperature_max, Some(8.0));
        assert_eq!(device.thresholds.humidity_min, None);
        assert_eq!(device.status, DeviceStatus::Maintenance);
    }
}
