//! Audit trail recorder.
//!
//! Appends are best-effort: a failed append is logged, counted and pushed to
//! the diagnostics channel, and the caller's operation carries on. Callers
//! await [`AuditRecorder::record`] so the write is issued before the request
//! returns.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::DomainError;
use crate::models::{
    Actor, AuditAction, AuditEntityType, AuditLogEntry, AuditLogFilter, AuditScope,
    ChainVerification, NewAuditEntry, RequestContext,
};
use crate::ports::AuditStore;
use crate::services::authorization::{authorize, Operation, ResourceKind, ScopeFilter};
use shared::crypto::GENESIS_HASH;

/// Default page size of audit queries.
pub const DEFAULT_QUERY_LIMIT: i64 = 100;

/// Largest page an audit query may request.
pub const MAX_QUERY_LIMIT: i64 = 500;

const VERIFY_BATCH: i64 = 1000;

/// Builder for audit entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
    actor_profile_id: Option<i64>,
    action: AuditAction,
    entity_id: Option<i64>,
    details: Map<String, JsonValue>,
    ip_address: Option<String>,
}

impl AuditEntryBuilder {
    /// Entry for an action taken by a user in a request.
    pub fn by(ctx: &RequestContext, action: AuditAction) -> Self {
        Self {
            actor_profile_id: Some(ctx.profile_id()),
            action,
            entity_id: None,
            details: Map::new(),
            ip_address: ctx.ip_address.clone(),
        }
    }

    /// Entry for an action taken by the system itself.
    pub fn system(action: AuditAction) -> Self {
        Self {
            actor_profile_id: None,
            action,
            entity_id: None,
            details: Map::new(),
            ip_address: None,
        }
    }

    pub fn on(mut self, entity_id: i64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Records a field's previous and new value under `changes`.
    pub fn change(
        mut self,
        field: impl Into<String>,
        old: impl Into<JsonValue>,
        new: impl Into<JsonValue>,
    ) -> Self {
        let changes = self
            .details
            .entry("changes")
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if let JsonValue::Object(map) = changes {
            map.insert(field.into(), json!({"old": old.into(), "new": new.into()}));
        }
        self
    }

    /// Merges an object into the details. Non-objects are stored under `data`.
    pub fn details(mut self, value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => self.details.extend(map),
            JsonValue::Null => {}
            other => {
                self.details.insert("data".to_string(), other);
            }
        }
        self
    }

    pub fn build(self) -> NewAuditEntry {
        NewAuditEntry {
            actor_profile_id: self.actor_profile_id,
            action: self.action,
            entity_type: self.action.entity_type(),
            entity_id: self.entity_id,
            details: JsonValue::Object(self.details),
            ip_address: self.ip_address,
        }
    }
}

/// A failed append, as delivered to the diagnostics channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditFailure {
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: Option<i64>,
    pub actor_profile_id: Option<i64>,
    pub error: String,
    pub at: DateTime<Utc>,
}

/// Sending half of the audit diagnostics channel.
#[derive(Debug, Clone)]
pub struct AuditDiagnostics {
    tx: Option<mpsc::Sender<AuditFailure>>,
}

impl AuditDiagnostics {
    /// Creates a bounded channel. When it is full, failures are only logged.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AuditFailure>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Diagnostics that only log.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    fn report(&self, failure: AuditFailure) {
        if let Some(ref tx) = self.tx {
            if let Err(e) = tx.try_send(failure) {
                tracing::warn!("Audit diagnostics channel unavailable: {}", e);
            }
        }
    }
}

/// What happened to an append.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Recorded(AuditLogEntry),
    Dropped,
}

impl AppendOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, AppendOutcome::Recorded(_))
    }
}

/// Appends and queries the audit trail.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
    diagnostics: AuditDiagnostics,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>, diagnostics: AuditDiagnostics) -> Self {
        Self { store, diagnostics }
    }

    /// Appends an entry. Never fails.
    pub async fn record(&self, entry: NewAuditEntry) -> AppendOutcome {
        let action = entry.action;
        let entity_type = entry.entity_type;
        let entity_id = entry.entity_id;
        let actor_profile_id = entry.actor_profile_id;

        match self.store.append(entry).await {
            Ok(stored) => {
                tracing::debug!(
                    audit_id = stored.id,
                    action = %action,
                    entity_id = ?entity_id,
                    "Audit entry recorded"
                );
                AppendOutcome::Recorded(stored)
            }
            Err(e) => {
                tracing::error!(
                    action = %action,
                    entity_type = %entity_type,
                    entity_id = ?entity_id,
                    actor_profile_id = ?actor_profile_id,
                    "Failed to append audit entry: {}",
                    e
                );
                metrics::counter!(
                    "audit_append_failures_total",
                    "action" => action.as_str()
                )
                .increment(1);
                self.diagnostics.report(AuditFailure {
                    action,
                    entity_type,
                    entity_id,
                    actor_profile_id,
                    error: e.to_string(),
                    at: Utc::now(),
                });
                AppendOutcome::Dropped
            }
        }
    }

    /// Lists entries visible to `actor`.
    ///
    /// Admins see everything; managers see entries whose actor belongs to
    /// their company; employees are refused.
    pub async fn query(
        &self,
        actor: &Actor,
        filter: &AuditLogFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AuditLogEntry>, DomainError> {
        let scope = authorize(actor, ResourceKind::AuditLog, Operation::List, None)?;

        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(DomainError::validation("offset must not be negative"));
        }
        let limit = shared::pagination::clamp_limit(limit, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT);

        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(DomainError::validation("from must not be after to"));
            }
        }

        let audit_scope = match scope {
            ScopeFilter::Global => AuditScope::All,
            ScopeFilter::Company(company_id) => AuditScope::ActorCompany(company_id),
            ScopeFilter::Location(_) | ScopeFilter::Empty => AuditScope::Nothing,
        };
        if audit_scope == AuditScope::Nothing {
            return Ok(Vec::new());
        }

        Ok(self.store.query(&audit_scope, filter, limit, offset).await?)
    }

    /// Walks the whole chain and reports the first broken link.
    pub async fn verify_chain(&self, actor: &Actor) -> Result<ChainVerification, DomainError> {
        authorize(actor, ResourceKind::AuditLog, Operation::Verify, None)?;

        let mut verifier = ChainVerifier::new(GENESIS_HASH);
        let mut after_id = 0;
        loop {
            let batch = self.store.chain_batch(after_id, VERIFY_BATCH).await?;
            let Some(last) = batch.last() else {
                break;
            };
            after_id = last.id;
            verifier.feed(&batch);
            if (batch.len() as i64) < VERIFY_BATCH {
                break;
            }
        }

        let report = verifier.finish();
        if !report.chain_intact {
            tracing::error!(
                first_break_at = ?report.first_break_at,
                "Audit hash chain verification failed"
            );
        }
        Ok(report)
    }
}

/// Incremental hash chain check.
#[derive(Debug, Clone)]
pub struct ChainVerifier {
    expected_prev: String,
    total: u64,
    first_break_at: Option<i64>,
}

impl ChainVerifier {
    pub fn new(expected_prev: &str) -> Self {
        Self {
            expected_prev: expected_prev.to_string(),
            total: 0,
            first_break_at: None,
        }
    }

    /// Feeds entries in ascending id order.
    pub fn feed(&mut self, entries: &[AuditLogEntry]) {
        for entry in entries {
            self.total += 1;
            let linked = entry.prev_hash == self.expected_prev;
            let sealed = entry.recompute_hash() == entry.entry_hash;
            if !(linked && sealed) && self.first_break_at.is_none() {
                self.first_break_at = Some(entry.id);
            }
            self.expected_prev = entry.entry_hash.clone();
        }
    }

    pub fn finish(self) -> ChainVerification {
        ChainVerification {
            total_entries: self.total,
            chain_intact: self.first_break_at.is_none(),
            first_break_at: self.first_break_at,
            last_hash: self.expected_prev,
        }
    }
}

/// Verifies a slice of entries starting from `expected_prev`.
pub fn verify_entries(entries: &[AuditLogEntry], expected_prev: &str) -> ChainVerification {
    let mut verifier = ChainVerifier::new(expected_prev);
    verifier.feed(entries);
    verifier.finish()
}

/// Helper functions for common audit entries.
pub mod audit_helpers {
    use super::*;
    use crate::models::{
        AccountStatus, Alert, Device, Location, ProfileChanges, Ticket, UserProfile,
    };

    pub fn user_created(ctx: &RequestContext, profile: &UserProfile) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, AuditAction::UserCreated)
            .on(profile.id)
            .detail("email", profile.email.clone())
            .detail("name", profile.name.clone())
            .detail("role", profile.role.as_str())
            .detail("companyId", profile.company_id)
            .detail("locationId", profile.location_id)
            .detail("status", profile.status.as_str())
            .build()
    }

    /// Action for a status change, distinguishing reactivation from first approval.
    pub fn status_action(previous: AccountStatus, next: AccountStatus) -> AuditAction {
        match (previous, next) {
            (_, AccountStatus::Suspended) => AuditAction::UserSuspended,
            (AccountStatus::Suspended, _) => AuditAction::UserReactivated,
            _ => AuditAction::UserApproved,
        }
    }

    pub fn user_status_changed(
        ctx: &RequestContext,
        target: &UserProfile,
        previous: AccountStatus,
    ) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, status_action(previous, target.status))
            .on(target.id)
            .detail("previousStatus", previous.as_str())
            .detail("newStatus", target.status.as_str())
            .detail("targetEmail", target.email.clone())
            .detail("targetName", target.name.clone())
            .detail("targetRole", target.role.as_str())
            .build()
    }

    pub fn user_updated(
        ctx: &RequestContext,
        before: &UserProfile,
        changes: &ProfileChanges,
    ) -> NewAuditEntry {
        let mut builder = AuditEntryBuilder::by(ctx, AuditAction::UserUpdated).on(before.id);
        if let Some(ref name) = changes.name {
            builder = builder.change("name", before.name.clone(), name.clone());
        }
        if let Some(ref email) = changes.email {
            builder = builder.change("email", before.email.clone(), email.clone());
        }
        if let Some(role) = changes.role {
            builder = builder.change("role", before.role.as_str(), role.as_str());
        }
        if let Some(company_id) = changes.company_id {
            builder = builder.change("companyId", before.company_id, company_id);
        }
        if let Some(location_id) = changes.location_id {
            builder = builder.change("locationId", before.location_id, location_id);
        }
        builder.build()
    }

    pub fn location_created(ctx: &RequestContext, location: &Location) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, AuditAction::LocationCreated)
            .on(location.id)
            .detail("name", location.name.clone())
            .detail("postalCode", location.postal_code.clone())
            .detail("companyId", location.company_id)
            .build()
    }

    pub fn location_updated(
        ctx: &RequestContext,
        before: &Location,
        after: &Location,
    ) -> NewAuditEntry {
        let mut builder = AuditEntryBuilder::by(ctx, AuditAction::LocationUpdated).on(before.id);
        if before.name != after.name {
            builder = builder.change("name", before.name.clone(), after.name.clone());
        }
        if before.postal_code != after.postal_code {
            builder = builder.change(
                "postalCode",
                before.postal_code.clone(),
                after.postal_code.clone(),
            );
        }
        builder.build()
    }

    pub fn location_deleted(ctx: &RequestContext, location: &Location) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, AuditAction::LocationDeleted)
            .on(location.id)
            .detail("name", location.name.clone())
            .detail("companyId", location.company_id)
            .build()
    }

    pub fn device_created(ctx: &RequestContext, device: &Device) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, AuditAction::DeviceCreated)
            .on(device.id)
            .detail("name", device.name.clone())
            .detail("deviceType", device.device_type.clone())
            .detail("locationId", device.location_id)
            .detail("thresholds", json!(device.thresholds))
            .build()
    }

    pub fn device_updated(ctx: &RequestContext, before: &Device, after: &Device) -> NewAuditEntry {
        let mut builder = AuditEntryBuilder::by(ctx, AuditAction::DeviceUpdated).on(before.id);
        if before.name != after.name {
            builder = builder.change("name", before.name.clone(), after.name.clone());
        }
        if before.device_type != after.device_type {
            builder = builder.change(
                "deviceType",
                before.device_type.clone(),
                after.device_type.clone(),
            );
        }
        if before.status != after.status {
            builder = builder.change("status", before.status.as_str(), after.status.as_str());
        }
        if before.thresholds != after.thresholds {
            builder = builder.change(
                "thresholds",
                json!(before.thresholds),
                json!(after.thresholds),
            );
        }
        builder.build()
    }

    pub fn device_deleted(ctx: &RequestContext, device: &Device) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, AuditAction::DeviceDeleted)
            .on(device.id)
            .detail("name", device.name.clone())
            .detail("locationId", device.location_id)
            .build()
    }

    pub fn alert_created(alert: &Alert) -> NewAuditEntry {
        AuditEntryBuilder::system(AuditAction::AlertCreated)
            .on(alert.id)
            .detail("deviceId", alert.device_id)
            .detail("locationId", alert.location_id)
            .detail("alertType", alert.alert_type.as_str())
            .detail("severity", alert.severity.as_str())
            .detail("message", alert.message.clone())
            .detail(
                "conditionStartedAt",
                alert.condition_started_at.to_rfc3339(),
            )
            .build()
    }

    pub fn alert_snoozed(
        ctx: &RequestContext,
        alert: &Alert,
        duration_minutes: i64,
    ) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, AuditAction::AlertSnoozed)
            .on(alert.id)
            .detail("deviceId", alert.device_id)
            .detail("durationMinutes", duration_minutes)
            .detail(
                "snoozedUntil",
                alert.snoozed_until.map(|t| t.to_rfc3339()),
            )
            .build()
    }

    /// Resolution by a user, or by recovery when `ctx` is `None`.
    pub fn alert_resolved(ctx: Option<&RequestContext>, alert: &Alert) -> NewAuditEntry {
        let builder = match ctx {
            Some(ctx) => AuditEntryBuilder::by(ctx, AuditAction::AlertResolved),
            None => AuditEntryBuilder::system(AuditAction::AlertResolved)
                .detail("reason", "condition_cleared"),
        };
        builder
            .on(alert.id)
            .detail("deviceId", alert.device_id)
            .detail("alertType", alert.alert_type.as_str())
            .build()
    }

    pub fn ticket_created(ctx: &RequestContext, ticket: &Ticket) -> NewAuditEntry {
        AuditEntryBuilder::by(ctx, AuditAction::TicketCreated)
            .on(ticket.id)
            .detail("locationId", ticket.location_id)
            .detail("deviceId", ticket.device_id)
            .detail("problem", ticket.problem.clone())
            .detail("visitDate", ticket.visit_date.to_string())
            .build()
    }

    pub fn ticket_updated(ctx: &RequestContext, before: &Ticket, after: &Ticket) -> NewAuditEntry {
        let action = if after.status == crate::models::TicketStatus::Completed
            && before.status != after.status
        {
            AuditAction::TicketCompleted
        } else {
            AuditAction::TicketUpdated
        };

        let mut builder = AuditEntryBuilder::by(ctx, action).on(before.id);
        if before.status != after.status {
            builder = builder.change("status", before.status.as_str(), after.status.as_str());
        }
        if before.problem != after.problem {
            builder = builder.change("problem", before.problem.clone(), after.problem.clone());
        }
        if before.visit_date != after.visit_date {
            builder = builder.change(
                "visitDate",
                before.visit_date.to_string(),
                after.visit_date.to_string(),
            );
        }
        builder.build()
    }
}
