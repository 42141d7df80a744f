//! Sensor reading domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorStatus {
    Open,
    Closed,
}

impl DoorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorStatus::Open => "open",
            DoorStatus::Closed => "closed",
        }
    }
}

impl FromStr for DoorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(DoorStatus::Open),
            "closed" => Ok(DoorStatus::Closed),
            _ => Err(format!("Invalid door status: {}", s)),
        }
    }
}

impl std::fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable sample reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub id: i64,
    pub device_id: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub door_status: Option<DoorStatus>,
    pub recorded_at: DateTime<Utc>,
}

impl SensorReading {
    pub fn door_open(&self) -> bool {
        matches!(self.door_status, Some(DoorStatus::Open))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub device_id: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub door_status: Option<DoorStatus>,
    pub recorded_at: DateTime<Utc>,
}

impl NewReading {
    pub fn has_measurement(&self) -> bool {
        self.temperature.is_some() || self.humidity.is_some() || self.door_status.is_some()
    }
}

/// Reading submitted by a device.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataRequest {
    pub device_id: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub door_status: Option<DoorStatus>,
    /// Server time is used when absent.
    pub recorded_at: Option<DateTime<Utc>>,
}

impl SensorDataRequest {
    pub fn into_new_reading(self, now: DateTime<Utc>) -> NewReading {
        NewReading {
            device_id: self.device_id,
            temperature: self.temperature,
            humidity: self.humidity,
            door_status: self.door_status,
            recorded_at: self.recorded_at.unwrap_or(now),
        }
    }
}
