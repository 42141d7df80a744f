//! Store ports implemented by the persistence layer.
//!
//! Listing methods take the [`ScopeFilter`] produced by the authorization
//! engine and must never return rows outside it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    AccountStatus, Alert, AlertType, AlertView, AuditLogEntry, AuditLogFilter, AuditScope,
    Company, Device, DeviceChanges, Location, LocationChanges, NewAlert, NewAuditEntry, NewDevice,
    NewLocation, NewReading, NewTicket, NewUserProfile, ProfileChanges, SensorReading, Ticket,
    TicketChanges, UserProfile,
};
use crate::services::authorization::ScopeFilter;
use shared::pagination::KeysetCursor;

/// Company → Location → Device hierarchy and user assignments.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, StoreError>;

    async fn find_profile_by_auth_user(
        &self,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, StoreError>;

    /// Profile created by an administrator that no session is bound to yet.
    async fn find_unlinked_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, StoreError>;

    /// Binds an unlinked profile to a session identity.
    async fn link_profile(
        &self,
        id: i64,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, StoreError>;

    async fn list_profiles(&self, scope: &ScopeFilter) -> Result<Vec<UserProfile>, StoreError>;

    async fn insert_profile(&self, profile: NewUserProfile) -> Result<UserProfile, StoreError>;

    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<UserProfile>, StoreError>;

    /// Single-row status update.
    async fn set_profile_status(
        &self,
        id: i64,
        status: AccountStatus,
    ) -> Result<Option<UserProfile>, StoreError>;

    async fn find_company(&self, id: i64) -> Result<Option<Company>, StoreError>;

    async fn list_companies(&self, scope: &ScopeFilter) -> Result<Vec<Company>, StoreError>;

    async fn insert_company(&self, name: &str) -> Result<Company, StoreError>;

    async fn find_location(&self, id: i64) -> Result<Option<Location>, StoreError>;

    async fn list_locations(&self, scope: &ScopeFilter) -> Result<Vec<Location>, StoreError>;

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError>;

    async fn update_location(
        &self,
        id: i64,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, StoreError>;

    async fn delete_location(&self, id: i64) -> Result<bool, StoreError>;

    async fn find_device(&self, id: i64) -> Result<Option<Device>, StoreError>;

    /// Devices in scope, optionally narrowed to one location.
    async fn list_devices(
        &self,
        scope: &ScopeFilter,
        location_id: Option<i64>,
    ) -> Result<Vec<Device>, StoreError>;

    async fn count_devices(&self, location_id: i64) -> Result<i64, StoreError>;

    async fn insert_device(&self, device: NewDevice) -> Result<Device, StoreError>;

    async fn update_device(
        &self,
        id: i64,
        changes: &DeviceChanges,
    ) -> Result<Option<Device>, StoreError>;

    async fn delete_device(&self, id: i64) -> Result<bool, StoreError>;
}

/// Append-only sensor readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn append_reading(&self, reading: NewReading) -> Result<SensorReading, StoreError>;

    /// Readings of a device recorded in `[since, until]`, oldest first.
    async fn readings_between(
        &self,
        device_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, StoreError>;

    /// Newest-first page of a device's readings strictly before `before`.
    async fn list_readings(
        &self,
        device_id: i64,
        before: Option<KeysetCursor>,
        limit: i64,
    ) -> Result<Vec<SensorReading>, StoreError>;
}

/// Alert records.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn find_alert(&self, id: i64) -> Result<Option<Alert>, StoreError>;

    /// The unresolved alert for a device and type, if any.
    async fn find_unresolved(
        &self,
        device_id: i64,
        alert_type: AlertType,
    ) -> Result<Option<Alert>, StoreError>;

    /// Inserts an alert unless an unresolved one with the same device and
    /// type exists, in which case `None` is returned and nothing is written.
    async fn insert_alert(&self, alert: NewAlert) -> Result<Option<Alert>, StoreError>;

    /// Alerts in scope, newest first. With [`AlertView::Active`] only alerts
    /// passing the display predicate at `now` are returned.
    async fn list_alerts(
        &self,
        scope: &ScopeFilter,
        view: AlertView,
        now: DateTime<Utc>,
    ) -> Result<Vec<Alert>, StoreError>;

    /// Conditional update of an unresolved alert to snoozed. `None` when no
    /// unresolved row with that id exists.
    async fn snooze_alert(
        &self,
        id: i64,
        until: DateTime<Utc>,
    ) -> Result<Option<Alert>, StoreError>;

    /// Conditional update of an unresolved alert to resolved.
    async fn resolve_alert(&self, id: i64, at: DateTime<Utc>)
        -> Result<Option<Alert>, StoreError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends an entry, chaining it to the current head.
    ///
    /// Implementations must serialise appends so that two entries never
    /// share a `prev_hash`.
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError>;

    /// Newest-first page of entries.
    async fn query(
        &self,
        scope: &AuditScope,
        filter: &AuditLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>, StoreError>;

    /// Oldest-first batch of entries with `id > after_id`.
    async fn chain_batch(&self, after_id: i64, limit: i64)
        -> Result<Vec<AuditLogEntry>, StoreError>;
}

/// Service tickets.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    async fn find_ticket(&self, id: i64) -> Result<Option<Ticket>, StoreError>;

    async fn list_tickets(&self, scope: &ScopeFilter) -> Result<Vec<Ticket>, StoreError>;

    async fn update_ticket(
        &self,
        id: i64,
        changes: &TicketChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>, StoreError>;
}
