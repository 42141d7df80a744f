//! Audit trail domain models.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::str::FromStr;

/// Version of the action taxonomy written with each entry.
///
/// Bump when an action is added, renamed or removed so older entries stay
/// interpretable.
pub const AUDIT_TAXONOMY_VERSION: i16 = 1;

/// Closed set of audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    UserCreated,
    UserApproved,
    UserSuspended,
    UserReactivated,
    UserUpdated,
    LocationCreated,
    LocationUpdated,
    LocationDeleted,
    DeviceCreated,
    DeviceUpdated,
    DeviceDeleted,
    AlertCreated,
    AlertSnoozed,
    AlertAcknowledged,
    AlertResolved,
    TicketCreated,
    TicketUpdated,
    TicketCompleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserCreated => "USER_CREATED",
            AuditAction::UserApproved => "USER_APPROVED",
            AuditAction::UserSuspended => "USER_SUSPENDED",
            AuditAction::UserReactivated => "USER_REACTIVATED",
            AuditAction::UserUpdated => "USER_UPDATED",
            AuditAction::LocationCreated => "LOCATION_CREATED",
            AuditAction::LocationUpdated => "LOCATION_UPDATED",
            AuditAction::LocationDeleted => "LOCATION_DELETED",
            AuditAction::DeviceCreated => "DEVICE_CREATED",
            AuditAction::DeviceUpdated => "DEVICE_UPDATED",
            AuditAction::DeviceDeleted => "DEVICE_DELETED",
            AuditAction::AlertCreated => "ALERT_CREATED",
            AuditAction::AlertSnoozed => "ALERT_SNOOZED",
            AuditAction::AlertAcknowledged => "ALERT_ACKNOWLEDGED",
            AuditAction::AlertResolved => "ALERT_RESOLVED",
            AuditAction::TicketCreated => "TICKET_CREATED",
            AuditAction::TicketUpdated => "TICKET_UPDATED",
            AuditAction::TicketCompleted => "TICKET_COMPLETED",
        }
    }

    pub fn all() -> &'static [AuditAction] {
        &[
            AuditAction::UserCreated,
            AuditAction::UserApproved,
            AuditAction::UserSuspended,
            AuditAction::UserReactivated,
            AuditAction::UserUpdated,
            AuditAction::LocationCreated,
            AuditAction::LocationUpdated,
            AuditAction::LocationDeleted,
            AuditAction::DeviceCreated,
            AuditAction::DeviceUpdated,
            AuditAction::DeviceDeleted,
            AuditAction::AlertCreated,
            AuditAction::AlertSnoozed,
            AuditAction::AlertAcknowledged,
            AuditAction::AlertResolved,
            AuditAction::TicketCreated,
            AuditAction::TicketUpdated,
            AuditAction::TicketCompleted,
        ]
    }

    /// The entity type an action is recorded against.
    pub fn entity_type(&self) -> AuditEntityType {
        match self {
            AuditAction::UserCreated
            | AuditAction::UserApproved
            | AuditAction::UserSuspended
            | AuditAction::UserReactivated
            | AuditAction::UserUpdated => AuditEntityType::User,
            AuditAction::LocationCreated
            | AuditAction::LocationUpdated
            | AuditAction::LocationDeleted => AuditEntityType::Location,
            AuditAction::DeviceCreated
            | AuditAction::DeviceUpdated
            | AuditAction::DeviceDeleted => AuditEntityType::Device,
            AuditAction::AlertCreated
            | AuditAction::AlertSnoozed
            | AuditAction::AlertAcknowledged
            | AuditAction::AlertResolved => AuditEntityType::Alert,
            AuditAction::TicketCreated
            | AuditAction::TicketUpdated
            | AuditAction::TicketCompleted => AuditEntityType::Ticket,
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        AuditAction::all()
            .iter()
            .find(|a| a.as_str() == upper)
            .copied()
            .ok_or_else(|| format!("Unknown audit action: {}", s))
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityType {
    User,
    Location,
    Device,
    Alert,
    Ticket,
}

impl AuditEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntityType::User => "user",
            AuditEntityType::Location => "location",
            AuditEntityType::Device => "device",
            AuditEntityType::Alert => "alert",
            AuditEntityType::Ticket => "ticket",
        }
    }
}

impl FromStr for AuditEntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(AuditEntityType::User),
            "location" => Ok(AuditEntityType::Location),
            "device" => Ok(AuditEntityType::Device),
            "alert" => Ok(AuditEntityType::Alert),
            "ticket" => Ok(AuditEntityType::Ticket),
            _ => Err(format!("Unknown audit entity type: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry waiting to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    /// `None` for system-originated actions such as alert evaluation.
    pub actor_profile_id: Option<i64>,
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: Option<i64>,
    pub details: JsonValue,
    pub ip_address: Option<String>,
}

impl NewAuditEntry {
    /// Hash of this entry when appended after `prev_hash` at `created_at`.
    ///
    /// `created_at` must already be truncated to microseconds, the precision
    /// the store keeps, or verification of the stored row will fail.
    pub fn chain_hash(&self, prev_hash: &str, created_at: DateTime<Utc>) -> String {
        let payload = canonical_payload(
            self.actor_profile_id,
            self.action,
            AUDIT_TAXONOMY_VERSION,
            self.entity_type,
            self.entity_id,
            &self.details,
            self.ip_address.as_deref(),
            created_at,
        );
        shared::crypto::chain_digest(prev_hash, &payload)
    }
}

/// Timestamp precision used for audit entries.
pub fn audit_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(6)
}

/// A persisted, immutable audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: i64,
    pub actor_profile_id: Option<i64>,
    pub action: AuditAction,
    pub taxonomy_version: i16,
    pub entity_type: AuditEntityType,
    pub entity_id: Option<i64>,
    pub details: JsonValue,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub prev_hash: String,
    pub entry_hash: String,
}

impl AuditLogEntry {
    /// Recomputes the entry hash from the stored fields.
    pub fn recompute_hash(&self) -> String {
        let payload = canonical_payload(
            self.actor_profile_id,
            self.action,
            self.taxonomy_version,
            self.entity_type,
            self.entity_id,
            &self.details,
            self.ip_address.as_deref(),
            self.created_at,
        );
        shared::crypto::chain_digest(&self.prev_hash, &payload)
    }
}

#[allow(clippy::too_many_arguments)]
fn canonical_payload(
    actor_profile_id: Option<i64>,
    action: AuditAction,
    taxonomy_version: i16,
    entity_type: AuditEntityType,
    entity_id: Option<i64>,
    details: &JsonValue,
    ip_address: Option<&str>,
    created_at: DateTime<Utc>,
) -> String {
    // serde_json maps are key-ordered, so this rendering is stable across
    // a round trip through the store.
    json!({
        "actor_profile_id": actor_profile_id,
        "action": action.as_str(),
        "taxonomy_version": taxonomy_version,
        "entity_type": entity_type.as_str(),
        "entity_id": entity_id,
        "details": details,
        "ip_address": ip_address,
        "created_at": created_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
    })
    .to_string()
}

/// Filters accepted by audit queries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogFilter {
    pub action: Option<AuditAction>,
    pub entity_type: Option<AuditEntityType>,
    pub entity_id: Option<i64>,
    pub actor_profile_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Which entries an audit query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditScope {
    All,
    /// Entries whose actor currently belongs to the company.
    ActorCompany(i64),
    Nothing,
}

/// Result of walking the hash chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerification {
    pub total_entries: u64,
    pub chain_intact: bool,
    /// Id of the first entry whose hash or back-link does not match.
    pub first_break_at: Option<i64>,
    pub last_hash: String,
}
