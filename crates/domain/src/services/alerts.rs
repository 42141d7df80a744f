//! Alert service: ingestion, evaluation and the user-facing transitions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::DomainError;
use crate::models::{
    Actor, Alert, AlertStatus, AlertType, AlertView, Device, NewReading, RequestContext,
    SensorReading,
};
use crate::ports::{AlertStore, ReadingStore};
use crate::services::alert_lifecycle::{
    check_transition, evaluate_metric, snooze_until, AlertPolicy, MetricEvaluation,
};
use crate::services::audit::{audit_helpers, AuditRecorder};
use crate::services::authorization::{authorize, Operation, ResourceKind, Target};
use crate::services::directory::{device_target, TenantDirectory};
use shared::pagination::{clamp_limit, KeysetCursor};
use shared::validation::{validate_humidity, validate_temperature};

/// Default page size of reading history.
pub const DEFAULT_READINGS_LIMIT: i64 = 50;

/// Largest reading history page.
pub const MAX_READINGS_LIMIT: i64 = 500;

/// Alerts written while evaluating one reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub created: Vec<Alert>,
    pub resolved: Vec<Alert>,
}

/// Result of ingesting a reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub reading: SensorReading,
    #[serde(flatten)]
    pub evaluation: EvaluationReport,
}

/// A page of reading history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPage {
    pub readings: Vec<SensorReading>,
    pub next_cursor: Option<String>,
}

#[derive(Clone)]
pub struct AlertService {
    directory: TenantDirectory,
    alerts: Arc<dyn AlertStore>,
    readings: Arc<dyn ReadingStore>,
    audit: AuditRecorder,
    policy: AlertPolicy,
}

fn alert_target(alert: &Alert) -> Target {
    Target::location(alert.company_id, alert.location_id)
}

impl AlertService {
    pub fn new(
        directory: TenantDirectory,
        alerts: Arc<dyn AlertStore>,
        readings: Arc<dyn ReadingStore>,
        audit: AuditRecorder,
        policy: AlertPolicy,
    ) -> Self {
        Self {
            directory,
            alerts,
            readings,
            audit,
            policy,
        }
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Alerts visible to `actor`, newest first.
    pub async fn list(
        &self,
        actor: &Actor,
        view: AlertView,
        now: DateTime<Utc>,
    ) -> Result<Vec<Alert>, DomainError> {
        let scope = authorize(actor, ResourceKind::Alert, Operation::List, None)?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.alerts.list_alerts(&scope, view, now).await?)
    }

    async fn fetch(&self, alert_id: i64) -> Result<Alert, DomainError> {
        self.alerts
            .find_alert(alert_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Alert not found"))
    }

    /// Hides an alert until `now + duration` (30 minutes by default).
    ///
    /// Repeated snoozes restart the window from `now`.
    pub async fn snooze(
        &self,
        ctx: &RequestContext,
        alert_id: i64,
        duration: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<Alert, DomainError> {
        let alert = self.fetch(alert_id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Alert,
            Operation::Snooze,
            Some(&alert_target(&alert)),
        )?;
        check_transition(alert.status, AlertStatus::Snoozed)?;
        let until = snooze_until(now, duration, &self.policy)?;

        let snoozed = self
            .alerts
            .snooze_alert(alert_id, until)
            .await?
            .ok_or_else(|| DomainError::not_found("Alert not found"))?;

        let minutes = (until - now).num_minutes();
        tracing::info!(
            alert_id,
            profile_id = ctx.profile_id(),
            minutes,
            "Alert snoozed"
        );
        metrics::counter!("alerts_snoozed_total").increment(1);
        self.audit
            .record(audit_helpers::alert_snoozed(ctx, &snoozed, minutes))
            .await;

        Ok(snoozed)
    }

    /// Moves an alert to the terminal `resolved` state.
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        alert_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Alert, DomainError> {
        let alert = self.fetch(alert_id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Alert,
            Operation::Resolve,
            Some(&alert_target(&alert)),
        )?;
        check_transition(alert.status, AlertStatus::Resolved)?;

        let resolved = self
            .alerts
            .resolve_alert(alert_id, now)
            .await?
            .ok_or_else(|| DomainError::validation("Alert is already resolved"))?;

        tracing::info!(alert_id, profile_id = ctx.profile_id(), "Alert resolved");
        metrics::counter!("alerts_resolved_total").increment(1);
        self.audit
            .record(audit_helpers::alert_resolved(Some(ctx), &resolved))
            .await;

        Ok(resolved)
    }

    /// Stores a device-submitted reading and evaluates it.
    pub async fn ingest(
        &self,
        reading: NewReading,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, DomainError> {
        if !reading.has_measurement() {
            return Err(DomainError::validation("Reading contains no measurements"));
        }
        if let Some(t) = reading.temperature {
            validate_temperature(t).map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if let Some(h) = reading.humidity {
            validate_humidity(h).map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let device = self.directory.device(reading.device_id).await?;
        let stored = self.readings.append_reading(reading).await?;
        let evaluation = self.evaluate(&stored, &device, now).await?;

        Ok(IngestOutcome {
            reading: stored,
            evaluation,
        })
    }

    /// Evaluates a stored reading against its device's thresholds.
    pub async fn evaluate(
        &self,
        reading: &SensorReading,
        device: &Device,
        now: DateTime<Utc>,
    ) -> Result<EvaluationReport, DomainError> {
        let window = self
            .readings
            .readings_between(
                device.id,
                reading.recorded_at - self.policy.sustain_window,
                reading.recorded_at,
            )
            .await?;

        let mut report = EvaluationReport::default();
        for alert_type in AlertType::all() {
            let existing = self.alerts.find_unresolved(device.id, *alert_type).await?;
            let outcome = evaluate_metric(
                *alert_type,
                reading,
                device,
                &window,
                existing.as_ref(),
                &self.policy,
                now,
            );

            match outcome {
                MetricEvaluation::Create(new_alert) => {
                    match self.alerts.insert_alert(new_alert).await? {
                        Some(alert) => {
                            tracing::warn!(
                                alert_id = alert.id,
                                device_id = device.id,
                                alert_type = %alert.alert_type,
                                severity = %alert.severity,
                                "Alert raised"
                            );
                            metrics::counter!(
                                "alerts_created_total",
                                "type" => alert.alert_type.as_str(),
                                "severity" => alert.severity.as_str()
                            )
                            .increment(1);
                            self.audit.record(audit_helpers::alert_created(&alert)).await;
                            report.created.push(alert);
                        }
                        None => {
                            tracing::debug!(
                                device_id = device.id,
                                alert_type = %alert_type,
                                "Concurrent alert insert deduplicated"
                            );
                        }
                    }
                }
                MetricEvaluation::Clear {
                    resolve: Some(alert_id),
                } => {
                    if let Some(alert) = self.alerts.resolve_alert(alert_id, now).await? {
                        tracing::info!(
                            alert_id,
                            device_id = device.id,
                            "Alert resolved on recovery"
                        );
                        metrics::counter!("alerts_resolved_total").increment(1);
                        self.audit
                            .record(audit_helpers::alert_resolved(None, &alert))
                            .await;
                        report.resolved.push(alert);
                    }
                }
                MetricEvaluation::Deduplicated(_)
                | MetricEvaluation::Pending
                | MetricEvaluation::Clear { resolve: None }
                | MetricEvaluation::NotMeasured => {}
            }
        }

        Ok(report)
    }

    /// Newest-first page of a device's readings.
    pub async fn list_readings(
        &self,
        actor: &Actor,
        device_id: i64,
        cursor: Option<&str>,
        limit: Option<i64>,
    ) -> Result<ReadingPage, DomainError> {
        let device = self.directory.device(device_id).await?;
        authorize(
            actor,
            ResourceKind::Reading,
            Operation::List,
            Some(&device_target(&device)),
        )?;

        let before = cursor
            .map(KeysetCursor::decode)
            .transpose()
            .map_err(|e| DomainError::validation(e.to_string()))?;
        let limit = clamp_limit(limit, DEFAULT_READINGS_LIMIT, MAX_READINGS_LIMIT);

        let mut readings = self
            .readings
            .list_readings(device_id, before, limit + 1)
            .await?;

        let next_cursor = if readings.len() as i64 > limit {
            readings.truncate(limit as usize);
            readings
                .last()
                .map(|r| KeysetCursor::new(r.recorded_at, r.id).encode())
        } else {
            None
        };

        Ok(ReadingPage {
            readings,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForbiddenReason;
    use crate::models::{
        AccountStatus, AuditAction, DoorStatus, Location, Role, Thresholds, UserProfile,
    };
    use crate::services::audit::AuditDiagnostics;
    use crate::testing::InMemoryStore;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: AlertService,
        location: Location,
        device: Device,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let company = store.seed_company("Acme Cold Chain");
        let location = store.seed_location(company.id, "Depot North");
        let device = store.seed_device(
            &location,
            Thresholds {
                temperature_max: Some(28.0),
                ..Default::default()
            },
        );
        let service = AlertService::new(
            TenantDirectory::new(store.clone()),
            store.clone(),
            store.clone(),
            AuditRecorder::new(store.clone(), AuditDiagnostics::disabled()),
            AlertPolicy::default(),
        );
        Fixture {
            store,
            service,
            location,
            device,
        }
    }

    fn ctx(profile: &UserProfile) -> RequestContext {
        RequestContext::new(profile.to_actor(), None)
    }

    fn reading(device_id: i64, temperature: f64, at: DateTime<Utc>) -> NewReading {
        NewReading {
            device_id,
            temperature: Some(temperature),
            humidity: None,
            door_status: Some(DoorStatus::Closed),
            recorded_at: at,
        }
    }

    #[tokio::test]
    async fn test_breach_creates_exactly_one_alert() {
        let f = fixture();
        let now = Utc::now();

        let first = f
            .service
            .ingest(reading(f.device.id, 31.0, now), now)
            .await
            .unwrap();
        assert_eq!(first.evaluation.created.len(), 1);
        let alert = &first.evaluation.created[0];
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.location_id, f.location.id);

        let later = now + Duration::seconds(30);
        let second = f
            .service
            .ingest(reading(f.device.id, 32.0, later), later)
            .await
            .unwrap();
        assert!(second.evaluation.created.is_empty());
        assert_eq!(f.store.alerts().len(), 1);

        let created: Vec<_> = f
            .store
            .audit_entries()
            .into_iter()
            .filter(|e| e.action == AuditAction::AlertCreated)
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].actor_profile_id, None);
    }

    #[tokio::test]
    async fn test_recovery_resolves_alert() {
        let f = fixture();
        let now = Utc::now();
        f.service
            .ingest(reading(f.device.id, 31.0, now), now)
            .await
            .unwrap();

        let later = now + Duration::minutes(1);
        let outcome = f
            .service
            .ingest(reading(f.device.id, 22.0, later), later)
            .await
            .unwrap();
        assert_eq!(outcome.evaluation.resolved.len(), 1);
        assert_eq!(outcome.evaluation.resolved[0].status, AlertStatus::Resolved);

        let again = later + Duration::minutes(1);
        let outcome = f
            .service
            .ingest(reading(f.device.id, 31.0, again), again)
            .await
            .unwrap();
        assert!(outcome.evaluation.created.is_empty(), "recovery reading is in the window");
    }

    #[tokio::test]
    async fn test_ingest_unknown_device_not_found() {
        let f = fixture();
        let now = Utc::now();
        let err = f
            .service
            .ingest(reading(9999, 31.0, now), now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ingest_rejects_empty_reading() {
        let f = fixture();
        let now = Utc::now();
        let err = f
            .service
            .ingest(
                NewReading {
                    device_id: f.device.id,
                    temperature: None,
                    humidity: None,
                    door_status: None,
                    recorded_at: now,
                },
                now,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_snooze_hides_until_deadline_then_resurfaces() {
        let f = fixture();
        let alert = f.store.seed_alert(&f.device, AlertType::Temperature);
        let employee = f.store.seed_profile(
            Role::Employee,
            Some(f.location.company_id),
            Some(f.location.id),
            AccountStatus::Approved,
        );
        let now = Utc::now();

        let snoozed = f
            .service
            .snooze(&ctx(&employee), alert.id, None, now)
            .await
            .unwrap();
        assert_eq!(snoozed.status, AlertStatus::Snoozed);
        assert_eq!(snoozed.snoozed_until, Some(now + Duration::minutes(30)));

        let actor = employee.to_actor();
        let before = now + Duration::minutes(29);
        assert!(f
            .service
            .list(&actor, AlertView::Active, before)
            .await
            .unwrap()
            .is_empty());

        let after = now + Duration::minutes(31);
        let visible = f.service.list(&actor, AlertView::Active, after).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, alert.id);
    }

    #[tokio::test]
    async fn test_snooze_restarts_window() {
        let f = fixture();
        let alert = f.store.seed_alert(&f.device, AlertType::Temperature);
        let manager = f.store.seed_profile(
            Role::Manager,
            Some(f.location.company_id),
            None,
            AccountStatus::Approved,
        );
        let now = Utc::now();
        f.service
            .snooze(&ctx(&manager), alert.id, Some(Duration::minutes(120)), now)
            .await
            .unwrap();

        let later = now + Duration::minutes(10);
        let again = f
            .service
            .snooze(&ctx(&manager), alert.id, None, later)
            .await
            .unwrap();
        assert_eq!(again.snoozed_until, Some(later + Duration::minutes(30)));
    }

    #[tokio::test]
    async fn test_snooze_missing_alert_is_not_found() {
        let f = fixture();
        let admin = f
            .store
            .seed_profile(Role::Admin, None, None, AccountStatus::Approved);
        let err = f
            .service
            .snooze(&ctx(&admin), 424242, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_snooze_out_of_scope_is_scope_mismatch() {
        let f = fixture();
        let alert = f.store.seed_alert(&f.device, AlertType::Temperature);
        let other = f.store.seed_company("Other Foods");
        let other_location = f.store.seed_location(other.id, "Elsewhere");
        let outsider = f.store.seed_profile(
            Role::Employee,
            Some(other.id),
            Some(other_location.id),
            AccountStatus::Approved,
        );

        let err = f
            .service
            .snooze(&ctx(&outsider), alert.id, None, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::ScopeMismatch));
        assert_eq!(f.store.alerts()[0].status, AlertStatus::Active);
    }

    #[tokio::test]
    async fn test_snooze_resolved_alert_is_validation() {
        let f = fixture();
        let alert = f.store.seed_alert(&f.device, AlertType::Temperature);
        let manager = f.store.seed_profile(
            Role::Manager,
            Some(f.location.company_id),
            None,
            AccountStatus::Approved,
        );
        let now = Utc::now();
        f.service.resolve(&ctx(&manager), alert.id, now).await.unwrap();

        let err = f
            .service
            .snooze(&ctx(&manager), alert.id, None, now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_employee_cannot_resolve() {
        let f = fixture();
        let alert = f.store.seed_alert(&f.device, AlertType::Temperature);
        let employee = f.store.seed_profile(
            Role::Employee,
            Some(f.location.company_id),
            Some(f.location.id),
            AccountStatus::Approved,
        );
        let err = f
            .service
            .resolve(&ctx(&employee), alert.id, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(
            err.forbidden_reason(),
            Some(ForbiddenReason::RoleInsufficient)
        );
    }

    #[tokio::test]
    async fn test_employee_listing_limited_to_location() {
        let f = fixture();
        f.store.seed_alert(&f.device, AlertType::Temperature);
        let sibling = f.store.seed_location(f.location.company_id, "Depot South");
        let sibling_device = f.store.seed_device(&sibling, Thresholds::default());
        f.store.seed_alert(&sibling_device, AlertType::Humidity);

        let employee = f.store.seed_profile(
            Role::Employee,
            Some(f.location.company_id),
            Some(f.location.id),
            AccountStatus::Approved,
        );
        let alerts = f
            .service
            .list(&employee.to_actor(), AlertView::All, Utc::now())
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert!(alerts.iter().all(|a| a.location_id == f.location.id));

        let unassigned = f.store.seed_profile(
            Role::Employee,
            Some(f.location.company_id),
            None,
            AccountStatus::Approved,
        );
        assert!(f
            .service
            .list(&unassigned.to_actor(), AlertView::All, Utc::now())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_reading_history_pages_with_cursor() {
        let f = fixture();
        let start = crate::models::audit_timestamp(Utc::now()) - Duration::hours(1);
        for i in 0..5 {
            let at = start + Duration::minutes(i);
            f.service
                .ingest(reading(f.device.id, 20.0, at), at)
                .await
                .unwrap();
        }
        let admin = f
            .store
            .seed_profile(Role::Admin, None, None, AccountStatus::Approved)
            .to_actor();

        let page = f
            .service
            .list_readings(&admin, f.device.id, None, Some(3))
            .await
            .unwrap();
        assert_eq!(page.readings.len(), 3);
        assert_eq!(page.readings[0].recorded_at, start + Duration::minutes(4));
        let cursor = page.next_cursor.expect("more readings remain");

        let rest = f
            .service
            .list_readings(&admin, f.device.id, Some(&cursor), Some(3))
            .await
            .unwrap();
        assert_eq!(rest.readings.len(), 2);
        assert_eq!(rest.next_cursor, None);
    }

    #[tokio::test]
    async fn test_reading_history_rejects_bad_cursor() {
        let f = fixture();
        let admin = f
            .store
            .seed_profile(Role::Admin, None, None, AccountStatus::Approved)
            .to_actor();
        let err = f
            .service
            .list_readings(&admin, f.device.id, Some("not a cursor"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
