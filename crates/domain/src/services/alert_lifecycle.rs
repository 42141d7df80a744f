//! Alert lifecycle state machine.
//!
//! Pure rules only: which readings breach, when a breach becomes an alert,
//! how long a snooze lasts and which transitions are legal. [`AlertService`]
//! applies them against the stores.
//!
//! [`AlertService`]: crate::services::alerts::AlertService

use chrono::{DateTime, Duration, Utc};

use crate::error::DomainError;
use crate::models::{
    Alert, AlertSeverity, AlertStatus, AlertType, Device, NewAlert, SensorReading, Thresholds,
};

/// Excursion beyond a temperature bound, in °C, above which an alert is critical.
pub const CRITICAL_TEMPERATURE_EXCURSION: f64 = 5.0;

/// Excursion beyond a humidity bound, in %RH, above which an alert is critical.
pub const CRITICAL_HUMIDITY_EXCURSION: f64 = 10.0;

/// Tunables of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    /// How long every reading must breach before an alert is raised.
    pub sustain_window: Duration,
    pub default_snooze: Duration,
    pub max_snooze: Duration,
    /// Resolve unresolved alerts once the metric is back within bounds.
    pub auto_resolve_on_recovery: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            sustain_window: Duration::seconds(300),
            default_snooze: Duration::minutes(30),
            max_snooze: Duration::minutes(1440),
            auto_resolve_on_recovery: true,
        }
    }
}

/// Which side of the range a value left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Below,
    Above,
}

/// A single metric outside its configured range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBreach {
    pub alert_type: AlertType,
    pub value: f64,
    pub bound: f64,
    pub side: BoundSide,
    pub severity: AlertSeverity,
}

impl MetricBreach {
    pub fn excursion(&self) -> f64 {
        (self.value - self.bound).abs()
    }

    pub fn message(&self) -> String {
        let (name, unit) = match self.alert_type {
            AlertType::Temperature => ("Temperature", "°C"),
            AlertType::Humidity => ("Humidity", "%RH"),
        };
        let (direction, bound_name) = match self.side {
            BoundSide::Above => ("above", "maximum"),
            BoundSide::Below => ("below", "minimum"),
        };
        format!(
            "{} {:.1}{} is {} the {} of {:.1}{} while the door is closed",
            name, self.value, unit, direction, bound_name, self.bound, unit
        )
    }
}

/// Value of a metric in a reading, if it was measured.
pub fn metric_value(reading: &SensorReading, alert_type: AlertType) -> Option<f64> {
    match alert_type {
        AlertType::Temperature => reading.temperature,
        AlertType::Humidity => reading.humidity,
    }
}

fn bounds(thresholds: &Thresholds, alert_type: AlertType) -> (Option<f64>, Option<f64>) {
    match alert_type {
        AlertType::Temperature => (thresholds.temperature_min, thresholds.temperature_max),
        AlertType::Humidity => (thresholds.humidity_min, thresholds.humidity_max),
    }
}

fn severity_for(alert_type: AlertType, excursion: f64) -> AlertSeverity {
    let critical = match alert_type {
        AlertType::Temperature => CRITICAL_TEMPERATURE_EXCURSION,
        AlertType::Humidity => CRITICAL_HUMIDITY_EXCURSION,
    };
    if excursion > critical {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    }
}

/// Checks one metric of a reading against the device thresholds.
///
/// An open door explains any excursion, so such readings never breach.
pub fn metric_breach(
    reading: &SensorReading,
    thresholds: &Thresholds,
    alert_type: AlertType,
) -> Option<MetricBreach> {
    if reading.door_open() {
        return None;
    }
    let value = metric_value(reading, alert_type)?;
    let (min, max) = bounds(thresholds, alert_type);

    let (bound, side) = match (min, max) {
        (_, Some(max)) if value > max => (max, BoundSide::Above),
        (Some(min), _) if value < min => (min, BoundSide::Below),
        _ => return None,
    };

    Some(MetricBreach {
        alert_type,
        value,
        bound,
        side,
        severity: severity_for(alert_type, (value - bound).abs()),
    })
}

/// What evaluating one metric of a new reading calls for.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvaluation {
    /// The breach was sustained and no unresolved alert exists.
    Create(NewAlert),
    /// An unresolved alert already covers the breach.
    Deduplicated(i64),
    /// Breaching, but not for the whole sustain window yet.
    Pending,
    /// Within bounds. Carries the alert to resolve, if any.
    Clear { resolve: Option<i64> },
    /// The reading did not measure this metric.
    NotMeasured,
}

/// Evaluates one metric of `reading` for `device`.
///
/// `window` holds the device's readings inside the sustain window ending at
/// the new reading, oldest first, the new reading included. `existing` is
/// the unresolved alert of this device and type, if any.
pub fn evaluate_metric(
    alert_type: AlertType,
    reading: &SensorReading,
    device: &Device,
    window: &[SensorReading],
    existing: Option<&Alert>,
    policy: &AlertPolicy,
    now: DateTime<Utc>,
) -> MetricEvaluation {
    if metric_value(reading, alert_type).is_none() {
        return MetricEvaluation::NotMeasured;
    }

    let Some(breach) = metric_breach(reading, &device.thresholds, alert_type) else {
        let resolve = existing
            .filter(|_| policy.auto_resolve_on_recovery)
            .map(|alert| alert.id);
        return MetricEvaluation::Clear { resolve };
    };

    if let Some(alert) = existing {
        return MetricEvaluation::Deduplicated(alert.id);
    }

    let sustained = window
        .iter()
        .all(|r| metric_breach(r, &device.thresholds, alert_type).is_some());
    if !sustained {
        return MetricEvaluation::Pending;
    }

    let condition_started_at = window
        .iter()
        .map(|r| r.recorded_at)
        .min()
        .map_or(reading.recorded_at, |first| first.min(reading.recorded_at));

    MetricEvaluation::Create(NewAlert {
        device_id: device.id,
        location_id: device.location_id,
        alert_type,
        message: breach.message(),
        severity: breach.severity,
        condition_started_at,
        created_at: now,
    })
}

/// Deadline of a snooze issued at `now`.
///
/// The window always restarts at `now`; a previous deadline is ignored.
pub fn snooze_until(
    now: DateTime<Utc>,
    requested: Option<Duration>,
    policy: &AlertPolicy,
) -> Result<DateTime<Utc>, DomainError> {
    let duration = requested.unwrap_or(policy.default_snooze);
    if duration < Duration::minutes(1) || duration > policy.max_snooze {
        return Err(DomainError::validation(format!(
            "Snooze duration must be between 1 and {} minutes",
            policy.max_snooze.num_minutes()
        )));
    }
    Ok(now + duration)
}

/// Checks that an alert in `from` may move to `to`.
pub fn check_transition(from: AlertStatus, to: AlertStatus) -> Result<(), DomainError> {
    match (from, to) {
        (AlertStatus::Resolved, _) => Err(DomainError::validation("Alert is already resolved")),
        (_, AlertStatus::Active) => Err(DomainError::validation(
            "Alerts only return to active by their snooze elapsing",
        )),
        _ => Ok(()),
    }
}
