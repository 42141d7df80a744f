//! Alert domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of an alert. `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Snoozed,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Snoozed => "snoozed",
            AlertStatus::Resolved => "resolved",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved)
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "snoozed" => Ok(AlertStatus::Snoozed),
            "resolved" => Ok(AlertStatus::Resolved),
            _ => Err(format!("Invalid alert status: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metric an alert is about. Part of the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Temperature,
    Humidity,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Temperature => "temperature",
            AlertType::Humidity => "humidity",
        }
    }

    pub fn all() -> &'static [AlertType] {
        &[AlertType::Temperature, AlertType::Humidity]
    }
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temperature" => Ok(AlertType::Temperature),
            "humidity" => Ok(AlertType::Humidity),
            _ => Err(format!("Invalid alert type: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warning" => Ok(AlertSeverity::Warning),
            "critical" => Ok(AlertSeverity::Critical),
            _ => Err(format!("Invalid alert severity: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold breach raised for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub device_id: i64,
    pub location_id: i64,
    pub company_id: i64,
    pub alert_type: AlertType,
    pub message: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub snoozed_until: Option<DateTime<Utc>>,
    pub condition_started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Whether the alert should appear in active listings at `now`.
    ///
    /// A snoozed alert resurfaces once its deadline passes without any write.
    pub fn is_display_active(&self, now: DateTime<Utc>) -> bool {
        display_active(self.status, self.snoozed_until, now)
    }
}

/// `status != resolved AND (snoozed_until IS NULL OR snoozed_until < now)`
pub fn display_active(
    status: AlertStatus,
    snoozed_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    status != AlertStatus::Resolved && snoozed_until.map_or(true, |until| until < now)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub device_id: i64,
    pub location_id: i64,
    pub alert_type: AlertType,
    pub message: String,
    pub severity: AlertSeverity,
    pub condition_started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Which alerts a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertView {
    /// Only alerts passing the display predicate.
    #[default]
    Active,
    /// Every alert, resolved ones included.
    All,
}

/// Request payload for snoozing an alert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeAlertRequest {
    pub alert_id: Option<i64>,
    /// Defaults to the configured snooze length.
    pub duration_minutes: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_display_active_unsnoozed() {
        let now = Utc::now();
        assert!(display_active(AlertStatus::Active, None, now));
    }

    #[test]
    fn test_display_active_while_snoozed() {
        let now = Utc::now();
        let until = now + Duration::minutes(30);
        assert!(!display_active(AlertStatus::Snoozed, Some(until), now));
    }

    #[test]
    fn test_display_active_resurfaces_after_deadline() {
        let now = Utc::now();
        let until = now - Duration::seconds(1);
        assert!(display_active(AlertStatus::Snoozed, Some(until), now));
    }

    #[test]
    fn test_display_active_at_exact_deadline_still_hidden() {
        let now = Utc::now();
        assert!(!display_active(AlertStatus::Snoozed, Some(now), now));
    }

    #[test]
    fn test_resolved_never_displayed() {
        let now = Utc::now();
        assert!(!display_active(AlertStatus::Resolved, None, now));
        assert!(!display_active(
            AlertStatus::Resolved,
            Some(now - Duration::hours(1)),
            now
        ));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("snoozed".parse::<AlertStatus>().unwrap(), AlertStatus::Snoozed);
        assert_eq!("HUMIDITY".parse::<AlertType>().unwrap(), AlertType::Humidity);
        assert_eq!(
            "critical".parse::<AlertSeverity>().unwrap(),
            AlertSeverity::Critical
        );
        assert!("acknowledged".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_resolved_is_terminal() {
        assert!(AlertStatus::Resolved.is_terminal());
        assert!(!AlertStatus::Snoozed.is_terminal());
    }
}
