//! Sensor reading entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{DoorStatus, SensorReading};
use sqlx::FromRow;

db_enum!(DoorStatusDb, "door_status", DoorStatus { Open, Closed });

/// Database row mapping for the sensor_readings table.
#[derive(Debug, Clone, FromRow)]
pub struct SensorReadingEntity {
    pub id: i64,
    pub device_id: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub door_status: Option<DoorStatusDb>,
    pub recorded_at: DateTime<Utc>,
}

impl From<SensorReadingEntity> for SensorReading {
    fn from(entity: SensorReadingEntity) -> Self {
        Self {
            id: entity.id,
            device_id: entity.device_id,
            temperature: entity.temperature,
            humidity: entity.humidity,
            door_status: entity.door_status.map(Into::into),
            recorded_at: entity.recorded_at,
        }
    }
}
