//! In-memory store adapters for tests.
//!
//! [`InMemoryStore`] implements every store port with the same scoping,
//! dedup and hash-chain rules as the Postgres adapters, so service and HTTP
//! tests run without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    audit_timestamp, display_active, AccountStatus, Alert, AlertStatus, AlertType, AlertView,
    AuditLogEntry, AuditLogFilter, AuditScope, Company, Device, DeviceChanges, DeviceStatus,
    Location, LocationChanges, NewAlert, NewAuditEntry, NewDevice, NewLocation, NewReading,
    NewTicket, NewUserProfile, ProfileChanges, Role, SensorReading, Thresholds, Ticket,
    TicketChanges, TicketStatus, UserProfile, AUDIT_TAXONOMY_VERSION,
};
use crate::ports::{AlertStore, AuditStore, DirectoryStore, ReadingStore, TicketStore};
use crate::services::authorization::ScopeFilter;
use shared::crypto::GENESIS_HASH;
use shared::pagination::KeysetCursor;

#[derive(Default)]
struct State {
    next_id: i64,
    companies: Vec<Company>,
    locations: Vec<Location>,
    devices: Vec<Device>,
    profiles: Vec<UserProfile>,
    readings: Vec<SensorReading>,
    alerts: Vec<Alert>,
    audit: Vec<AuditLogEntry>,
    tickets: Vec<Ticket>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn location(&self, id: i64) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.profiles
            .iter()
            .any(|p| Some(p.id) != except && p.email.eq_ignore_ascii_case(email))
    }
}

fn in_scope(scope: &ScopeFilter, company_id: i64, location_id: Option<i64>) -> bool {
    match scope {
        ScopeFilter::Global => true,
        ScopeFilter::Company(c) => *c == company_id,
        ScopeFilter::Location(l) => location_id == Some(*l),
        ScopeFilter::Empty => false,
    }
}

/// Every store port backed by vectors behind one mutex.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_company(&self, name: &str) -> Company {
        let mut state = self.state();
        let company = Company {
            id: state.next_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.companies.push(company.clone());
        company
    }

    pub fn seed_location(&self, company_id: i64, name: &str) -> Location {
        let mut state = self.state();
        let now = Utc::now();
        let location = Location {
            id: state.next_id(),
            company_id,
            name: name.to_string(),
            postal_code: "10115".to_string(),
            created_at: now,
            updated_at: now,
        };
        state.locations.push(location.clone());
        location
    }

    pub fn seed_device(&self, location: &Location, thresholds: Thresholds) -> Device {
        let mut state = self.state();
        let now = Utc::now();
        let device = Device {
            id: state.next_id(),
            location_id: location.id,
            company_id: location.company_id,
            name: format!("Sensor {}", state.next_id),
            device_type: "cooler".to_string(),
            thresholds,
            status: DeviceStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.devices.push(device.clone());
        device
    }

    /// Seeds a profile already bound to a fresh session identity.
    pub fn seed_profile(
        &self,
        role: Role,
        company_id: Option<i64>,
        location_id: Option<i64>,
        status: AccountStatus,
    ) -> UserProfile {
        let mut state = self.state();
        let now = Utc::now();
        let id = state.next_id();
        let profile = UserProfile {
            id,
            auth_user_id: Some(Uuid::new_v4()),
            email: format!("user{}@example.com", id),
            name: format!("User {}", id),
            role,
            company_id,
            location_id,
            status,
            created_at: now,
            updated_at: now,
        };
        state.profiles.push(profile.clone());
        profile
    }

    /// Seeds an alert directly, bypassing evaluation.
    pub fn seed_alert(&self, device: &Device, alert_type: AlertType) -> Alert {
        let mut state = self.state();
        let now = Utc::now();
        let alert = Alert {
            id: state.next_id(),
            device_id: device.id,
            location_id: device.location_id,
            company_id: device.company_id,
            alert_type,
            message: format!("{} out of range", alert_type),
            severity: crate::models::AlertSeverity::Warning,
            status: AlertStatus::Active,
            snoozed_until: None,
            condition_started_at: now,
            created_at: now,
            resolved_at: None,
        };
        state.alerts.push(alert.clone());
        alert
    }

    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.state().audit.clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.state().alerts.clone()
    }

    /// Overwrites the details of a stored entry without rehashing.
    pub fn tamper_audit_details(&self, id: i64, details: JsonValue) {
        if let Some(entry) = self.state().audit.iter_mut().find(|e| e.id == id) {
            entry.details = details;
        }
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.state().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_profile_by_auth_user(
        &self,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .state()
            .profiles
            .iter()
            .find(|p| p.auth_user_id == Some(auth_user_id))
            .cloned())
    }

    async fn find_unlinked_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .state()
            .profiles
            .iter()
            .find(|p| p.auth_user_id.is_none() && p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn link_profile(
        &self,
        id: i64,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut state = self.state();
        let Some(profile) = state
            .profiles
            .iter_mut()
            .find(|p| p.id == id && p.auth_user_id.is_none())
        else {
            return Ok(None);
        };
        profile.auth_user_id = Some(auth_user_id);
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn list_profiles(&self, scope: &ScopeFilter) -> Result<Vec<UserProfile>, StoreError> {
        let mut profiles: Vec<UserProfile> = self
            .state()
            .profiles
            .iter()
            .filter(|p| match scope {
                ScopeFilter::Global => true,
                ScopeFilter::Company(c) => p.company_id == Some(*c),
                ScopeFilter::Location(l) => p.location_id == Some(*l),
                ScopeFilter::Empty => false,
            })
            .cloned()
            .collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(profiles)
    }

    async fn insert_profile(&self, profile: NewUserProfile) -> Result<UserProfile, StoreError> {
        let mut state = self.state();
        if state.email_taken(&profile.email, None) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        if let Some(company_id) = profile.company_id {
            if !state.companies.iter().any(|c| c.id == company_id) {
                return Err(StoreError::MissingReference("company".to_string()));
            }
        }
        let now = Utc::now();
        let stored = UserProfile {
            id: state.next_id(),
            auth_user_id: profile.auth_user_id,
            email: profile.email,
            name: profile.name,
            role: profile.role,
            company_id: profile.company_id,
            location_id: profile.location_id,
            status: profile.status,
            created_at: now,
            updated_at: now,
        };
        state.profiles.push(stored.clone());
        Ok(stored)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut state = self.state();
        if let Some(ref email) = changes.email {
            if state.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict("email already registered".to_string()));
            }
        }
        let Some(profile) = state.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        changes.apply_to(profile);
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn set_profile_status(
        &self,
        id: i64,
        status: AccountStatus,
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut state = self.state();
        let Some(profile) = state.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        profile.status = status;
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn find_company(&self, id: i64) -> Result<Option<Company>, StoreError> {
        Ok(self.state().companies.iter().find(|c| c.id == id).cloned())
    }

    async fn list_companies(&self, scope: &ScopeFilter) -> Result<Vec<Company>, StoreError> {
        let state = self.state();
        Ok(state
            .companies
            .iter()
            .filter(|c| match scope {
                ScopeFilter::Global => true,
                ScopeFilter::Company(id) => c.id == *id,
                ScopeFilter::Location(l) => state.location(*l).map(|l| l.company_id) == Some(c.id),
                ScopeFilter::Empty => false,
            })
            .cloned()
            .collect())
    }

    async fn insert_company(&self, name: &str) -> Result<Company, StoreError> {
        let mut state = self.state();
        let company = Company {
            id: state.next_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.companies.push(company.clone());
        Ok(company)
    }

    async fn find_location(&self, id: i64) -> Result<Option<Location>, StoreError> {
        Ok(self.state().location(id).cloned())
    }

    async fn list_locations(&self, scope: &ScopeFilter) -> Result<Vec<Location>, StoreError> {
        Ok(self
            .state()
            .locations
            .iter()
            .filter(|l| in_scope(scope, l.company_id, Some(l.id)))
            .cloned()
            .collect())
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        let mut state = self.state();
        if !state.companies.iter().any(|c| c.id == location.company_id) {
            return Err(StoreError::MissingReference("company".to_string()));
        }
        let now = Utc::now();
        let stored = Location {
            id: state.next_id(),
            company_id: location.company_id,
            name: location.name,
            postal_code: location.postal_code,
            created_at: now,
            updated_at: now,
        };
        state.locations.push(stored.clone());
        Ok(stored)
    }

    async fn update_location(
        &self,
        id: i64,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, StoreError> {
        let mut state = self.state();
        let Some(location) = state.locations.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(ref name) = changes.name {
            location.name = name.clone();
        }
        if let Some(ref postal_code) = changes.postal_code {
            location.postal_code = postal_code.clone();
        }
        location.updated_at = Utc::now();
        Ok(Some(location.clone()))
    }

    async fn delete_location(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state();
        if state.devices.iter().any(|d| d.location_id == id) {
            return Err(StoreError::Conflict("location has devices".to_string()));
        }
        let before = state.locations.len();
        state.locations.retain(|l| l.id != id);
        Ok(state.locations.len() != before)
    }

    async fn find_device(&self, id: i64) -> Result<Option<Device>, StoreError> {
        Ok(self.state().devices.iter().find(|d| d.id == id).cloned())
    }

    async fn list_devices(
        &self,
        scope: &ScopeFilter,
        location_id: Option<i64>,
    ) -> Result<Vec<Device>, StoreError> {
        Ok(self
            .state()
            .devices
            .iter()
            .filter(|d| in_scope(scope, d.company_id, Some(d.location_id)))
            .filter(|d| location_id.map_or(true, |l| d.location_id == l))
            .cloned()
            .collect())
    }

    async fn count_devices(&self, location_id: i64) -> Result<i64, StoreError> {
        Ok(self
            .state()
            .devices
            .iter()
            .filter(|d| d.location_id == location_id)
            .count() as i64)
    }

    async fn insert_device(&self, device: NewDevice) -> Result<Device, StoreError> {
        let mut state = self.state();
        let company_id = state
            .location(device.location_id)
            .map(|l| l.company_id)
            .ok_or_else(|| StoreError::MissingReference("location".to_string()))?;
        let now = Utc::now();
        let stored = Device {
            id: state.next_id(),
            location_id: device.location_id,
            company_id,
            name: device.name,
            device_type: device.device_type,
            thresholds: device.thresholds,
            status: DeviceStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.devices.push(stored.clone());
        Ok(stored)
    }

    async fn update_device(
        &self,
        id: i64,
        changes: &DeviceChanges,
    ) -> Result<Option<Device>, StoreError> {
        let mut state = self.state();
        let Some(device) = state.devices.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(ref name) = changes.name {
            device.name = name.clone();
        }
        if let Some(ref device_type) = changes.device_type {
            device.device_type = device_type.clone();
        }
        if let Some(status) = changes.status {
            device.status = status;
        }
        if let Some(thresholds) = changes.thresholds {
            device.thresholds = thresholds;
        }
        device.updated_at = Utc::now();
        Ok(Some(device.clone()))
    }

    async fn delete_device(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state();
        let before = state.devices.len();
        state.devices.retain(|d| d.id != id);
        if state.devices.len() == before {
            return Ok(false);
        }
        state.readings.retain(|r| r.device_id != id);
        state.alerts.retain(|a| a.device_id != id);
        for ticket in state.tickets.iter_mut().filter(|t| t.device_id == Some(id)) {
            ticket.device_id = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl ReadingStore for InMemoryStore {
    async fn append_reading(&self, reading: NewReading) -> Result<SensorReading, StoreError> {
        let mut state = self.state();
        if !state.devices.iter().any(|d| d.id == reading.device_id) {
            return Err(StoreError::MissingReference("device".to_string()));
        }
        let stored = SensorReading {
            id: state.next_id(),
            device_id: reading.device_id,
            temperature: reading.temperature,
            humidity: reading.humidity,
            door_status: reading.door_status,
            recorded_at: reading.recorded_at,
        };
        state.readings.push(stored.clone());
        Ok(stored)
    }

    async fn readings_between(
        &self,
        device_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, StoreError> {
        let mut readings: Vec<SensorReading> = self
            .state()
            .readings
            .iter()
            .filter(|r| r.device_id == device_id && r.recorded_at >= since && r.recorded_at <= until)
            .cloned()
            .collect();
        readings.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at).then(a.id.cmp(&b.id)));
        Ok(readings)
    }

    async fn list_readings(
        &self,
        device_id: i64,
        before: Option<KeysetCursor>,
        limit: i64,
    ) -> Result<Vec<SensorReading>, StoreError> {
        let mut readings: Vec<SensorReading> = self
            .state()
            .readings
            .iter()
            .filter(|r| r.device_id == device_id)
            .filter(|r| before.map_or(true, |c| (r.recorded_at, r.id) < (c.at, c.id)))
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        readings.truncate(limit.max(0) as usize);
        Ok(readings)
    }
}

#[async_trait]
impl AlertStore for InMemoryStore {
    async fn find_alert(&self, id: i64) -> Result<Option<Alert>, StoreError> {
        Ok(self.state().alerts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_unresolved(
        &self,
        device_id: i64,
        alert_type: AlertType,
    ) -> Result<Option<Alert>, StoreError> {
        Ok(self
            .state()
            .alerts
            .iter()
            .find(|a| {
                a.device_id == device_id
                    && a.alert_type == alert_type
                    && a.status != AlertStatus::Resolved
            })
            .cloned())
    }

    async fn insert_alert(&self, alert: NewAlert) -> Result<Option<Alert>, StoreError> {
        let mut state = self.state();
        let duplicate = state.alerts.iter().any(|a| {
            a.device_id == alert.device_id
                && a.alert_type == alert.alert_type
                && a.status != AlertStatus::Resolved
        });
        if duplicate {
            return Ok(None);
        }
        let company_id = state
            .location(alert.location_id)
            .map(|l| l.company_id)
            .ok_or_else(|| StoreError::MissingReference("location".to_string()))?;
        let stored = Alert {
            id: state.next_id(),
            device_id: alert.device_id,
            location_id: alert.location_id,
            company_id,
            alert_type: alert.alert_type,
            message: alert.message,
            severity: alert.severity,
            status: AlertStatus::Active,
            snoozed_until: None,
            condition_started_at: alert.condition_started_at,
            created_at: alert.created_at,
            resolved_at: None,
        };
        state.alerts.push(stored.clone());
        Ok(Some(stored))
    }

    async fn list_alerts(
        &self,
        scope: &ScopeFilter,
        view: AlertView,
        now: DateTime<Utc>,
    ) -> Result<Vec<Alert>, StoreError> {
        let mut alerts: Vec<Alert> = self
            .state()
            .alerts
            .iter()
            .filter(|a| in_scope(scope, a.company_id, Some(a.location_id)))
            .filter(|a| match view {
                AlertView::Active => display_active(a.status, a.snoozed_until, now),
                AlertView::All => true,
            })
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(alerts)
    }

    async fn snooze_alert(
        &self,
        id: i64,
        until: DateTime<Utc>,
    ) -> Result<Option<Alert>, StoreError> {
        let mut state = self.state();
        let Some(alert) = state
            .alerts
            .iter_mut()
            .find(|a| a.id == id && a.status != AlertStatus::Resolved)
        else {
            return Ok(None);
        };
        alert.status = AlertStatus::Snoozed;
        alert.snoozed_until = Some(until);
        Ok(Some(alert.clone()))
    }

    async fn resolve_alert(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Alert>, StoreError> {
        let mut state = self.state();
        let Some(alert) = state
            .alerts
            .iter_mut()
            .find(|a| a.id == id && a.status != AlertStatus::Resolved)
        else {
            return Ok(None);
        };
        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(at);
        Ok(Some(alert.clone()))
    }
}

fn matches_filter(entry: &AuditLogEntry, filter: &AuditLogFilter) -> bool {
    filter.action.map_or(true, |a| entry.action == a)
        && filter.entity_type.map_or(true, |t| entry.entity_type == t)
        && filter.entity_id.map_or(true, |id| entry.entity_id == Some(id))
        && filter
            .actor_profile_id
            .map_or(true, |id| entry.actor_profile_id == Some(id))
        && filter.from.map_or(true, |from| entry.created_at >= from)
        && filter.to.map_or(true, |to| entry.created_at <= to)
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError> {
        let mut state = self.state();
        let prev_hash = state
            .audit
            .last()
            .map_or_else(|| GENESIS_HASH.to_string(), |e| e.entry_hash.clone());
        let created_at = audit_timestamp(Utc::now());
        let entry_hash = entry.chain_hash(&prev_hash, created_at);
        let stored = AuditLogEntry {
            id: state.next_id(),
            actor_profile_id: entry.actor_profile_id,
            action: entry.action,
            taxonomy_version: AUDIT_TAXONOMY_VERSION,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            details: entry.details,
            ip_address: entry.ip_address,
            created_at,
            prev_hash,
            entry_hash,
        };
        state.audit.push(stored.clone());
        Ok(stored)
    }

    async fn query(
        &self,
        scope: &AuditScope,
        filter: &AuditLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        let state = self.state();
        let actor_company = |actor: Option<i64>| {
            actor.and_then(|id| {
                state
                    .profiles
                    .iter()
                    .find(|p| p.id == id)
                    .and_then(|p| p.company_id)
            })
        };

        Ok(state
            .audit
            .iter()
            .rev()
            .filter(|e| match scope {
                AuditScope::All => true,
                AuditScope::ActorCompany(c) => actor_company(e.actor_profile_id) == Some(*c),
                AuditScope::Nothing => false,
            })
            .filter(|e| matches_filter(e, filter))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn chain_batch(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        Ok(self
            .state()
            .audit
            .iter()
            .filter(|e| e.id > after_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TicketStore for InMemoryStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let mut state = self.state();
        let company_id = state
            .location(ticket.location_id)
            .map(|l| l.company_id)
            .ok_or_else(|| StoreError::MissingReference("location".to_string()))?;
        let now = Utc::now();
        let stored = Ticket {
            id: state.next_id(),
            location_id: ticket.location_id,
            company_id,
            device_id: Some(ticket.device_id),
            created_by: ticket.created_by,
            problem: ticket.problem,
            visit_date: ticket.visit_date,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        state.tickets.push(stored.clone());
        Ok(stored)
    }

    async fn find_ticket(&self, id: i64) -> Result<Option<Ticket>, StoreError> {
        Ok(self.state().tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tickets(&self, scope: &ScopeFilter) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets: Vec<Ticket> = self
            .state()
            .tickets
            .iter()
            .filter(|t| in_scope(scope, t.company_id, Some(t.location_id)))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tickets)
    }

    async fn update_ticket(
        &self,
        id: i64,
        changes: &TicketChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut state = self.state();
        let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            if status == TicketStatus::Completed && ticket.status != TicketStatus::Completed {
                ticket.completed_at = Some(now);
            }
            ticket.status = status;
        }
        if let Some(ref problem) = changes.problem {
            ticket.problem = problem.clone();
        }
        if let Some(visit_date) = changes.visit_date {
            ticket.visit_date = visit_date;
        }
        ticket.updated_at = now;
        Ok(Some(ticket.clone()))
    }
}

/// Audit store whose appends always fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingAuditStore;

#[async_trait]
impl AuditStore for FailingAuditStore {
    async fn append(&self, _entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError> {
        Err(StoreError::Unavailable("audit store offline".to_string()))
    }

    async fn query(
        &self,
        _scope: &AuditScope,
        _filter: &AuditLogFilter,
        _limit: i64,
        _offset: i64,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        Err(StoreError::Unavailable("audit store offline".to_string()))
    }

    async fn chain_batch(
        &self,
        _after_id: i64,
        _limit: i64,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        Err(StoreError::Unavailable("audit store offline".to_string()))
    }
}
