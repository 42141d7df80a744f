//! Alert entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Alert, AlertSeverity, AlertStatus, AlertType};
use sqlx::FromRow;

db_enum!(AlertTypeDb, "alert_type", AlertType { Temperature, Humidity });
db_enum!(AlertSeverityDb, "alert_severity", AlertSeverity { Warning, Critical });
db_enum!(AlertStatusDb, "alert_status", AlertStatus { Active, Snoozed, Resolved });

/// Database row mapping for the alerts table, joined with the location's
/// company.
#[derive(Debug, Clone, FromRow)]
pub struct AlertEntity {
    pub id: i64,
    pub device_id: i64,
    pub location_id: i64,
    pub company_id: i64,
    pub alert_type: AlertTypeDb,
    pub message: String,
    pub severity: AlertSeverityDb,
    pub status: AlertStatusDb,
    pub snoozed_until: Option<DateTime<Utc>>,
    pub condition_started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<AlertEntity> for Alert {
    fn from(entity: AlertEntity) -> Self {
        Self {
            id: entity.id,
            device_id: entity.device_id,
            location_id: entity.location_id,
            company_id: entity.company_id,
            alert_type: entity.alert_type.into(),
            message: entity.message,
            severity: entity.severity.into(),
            status: entity.status.into(),
            snoozed_until: entity.snoozed_until,
            condition_started_at: entity.condition_started_at,
            created_at: entity.created_at,
            resolved_at: entity.resolved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_snoozed_alert_conversion() {
        let now = Utc::now();
        let alert: Alert = AlertEntity {
            id: 1,
            device_id: 2,
            location_id: 3,
            company_id: 4,
            alert_type: AlertTypeDb::Humidity,
            message: "Humidity 91.0% is above the maximum of 85.0%".to_string(),
            severity: AlertSeverityDb::Warning,
            status: AlertStatusDb::Snoozed,
            snoozed_until: Some(now + Duration::minutes(30)),
            condition_started_at: now - Duration::minutes(6),
            created_at: now,
            resolved_at: None,
        }
        .into();

        assert_eq!(alert.alert_type, AlertType::Humidity);
        assert_eq!(alert.status, AlertStatus::Snoozed);
        assert!(!alert.is_display_active(now));
    }
}
