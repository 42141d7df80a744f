//! Device domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Operational status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Active,
    Inactive,
    Maintenance,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Maintenance => "maintenance",
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(DeviceStatus::Active),
            "inactive" => Ok(DeviceStatus::Inactive),
            "maintenance" => Ok(DeviceStatus::Maintenance),
            _ => Err(format!("Invalid device status: {}", s)),
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acceptable ranges for a device's metrics. An absent bound is never breached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
}

/// A sensor device installed at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub location_id: i64,
    /// Company of the owning location, joined in for scope checks.
    pub company_id: i64,
    pub name: String,
    pub device_type: String,
    pub thresholds: Thresholds,
    pub status: DeviceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub location_id: i64,
    pub name: String,
    pub device_type: String,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}

impl DeviceChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.device_type.is_none()
            && self.status.is_none()
            && self.thresholds.is_none()
    }
}

impl Thresholds {
    /// Checks that each range is ordered and within sensor limits.
    pub fn validate_ranges(&self) -> Result<(), validator::ValidationError> {
        use shared::validation::{validate_bounds, validate_humidity, validate_temperature};

        for t in [self.temperature_min, self.temperature_max].into_iter().flatten() {
            validate_temperature(t)?;
        }
        for h in [self.humidity_min, self.humidity_max].into_iter().flatten() {
            validate_humidity(h)?;
        }
        validate_bounds(self.temperature_min, self.temperature_max)?;
        validate_bounds(self.humidity_min, self.humidity_max)
    }
}

fn validate_thresholds(thresholds: &Thresholds) -> Result<(), validator::ValidationError> {
    thresholds.validate_ranges()
}

/// Request payload for creating a device.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub location_id: i64,

    #[validate(length(
        min = 1,
        max = 120,
        message = "Name must be between 1 and 120 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 60,
        message = "Device type must be between 1 and 60 characters"
    ))]
    pub device_type: String,

    #[serde(default)]
    #[validate(custom(function = "validate_thresholds"))]
    pub thresholds: Thresholds,
}

/// Request payload for updating a device.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Name must be between 1 and 120 characters"
    ))]
    pub name: Option<String>,

    #[validate(length(
        min = 1,
        max = 60,
        message = "Device type must be between 1 and 60 characters"
    ))]
    pub device_type: Option<String>,

    pub status: Option<DeviceStatus>,

    #[validate(custom(function = "validate_thresholds"))]
    pub thresholds: Option<Thresholds>,
}

impl From<UpdateDeviceRequest> for DeviceChanges {
    fn from(req: UpdateDeviceRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            device_type: req.device_type.map(|t| t.trim().to_string()),
            status: req.status,
            thresholds: req.thresholds,
        }
    }
}
