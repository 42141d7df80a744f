//! Companies, locations and devices.

use validator::Validate;

use crate::error::{DomainError, ForbiddenReason};
use crate::models::{
    Actor, Company, CreateDeviceRequest, CreateLocationRequest, Device, DeviceChanges, Location,
    LocationChanges, NewDevice, NewLocation, RequestContext, UpdateDeviceRequest,
    UpdateLocationRequest,
};
use crate::services::audit::{audit_helpers, AuditRecorder};
use crate::services::authorization::{authorize, Operation, ResourceKind};
use crate::services::directory::{device_target, location_target, TenantDirectory};

#[derive(Clone)]
pub struct LocationService {
    directory: TenantDirectory,
    audit: AuditRecorder,
}

impl LocationService {
    pub fn new(directory: TenantDirectory, audit: AuditRecorder) -> Self {
        Self { directory, audit }
    }

    pub async fn list_companies(&self, actor: &Actor) -> Result<Vec<Company>, DomainError> {
        let scope = authorize(actor, ResourceKind::Company, Operation::List, None)?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.directory.store().list_companies(&scope).await?)
    }

    pub async fn list_locations(&self, actor: &Actor) -> Result<Vec<Location>, DomainError> {
        let scope = authorize(actor, ResourceKind::Location, Operation::List, None)?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.directory.store().list_locations(&scope).await?)
    }

    pub async fn get_location(&self, actor: &Actor, id: i64) -> Result<Location, DomainError> {
        let location = self.directory.location(id).await?;
        authorize(
            actor,
            ResourceKind::Location,
            Operation::Read,
            Some(&location_target(&location)),
        )?;
        Ok(location)
    }

    /// Creates a location owned by the creating manager's company.
    pub async fn create_location(
        &self,
        ctx: &RequestContext,
        req: CreateLocationRequest,
    ) -> Result<Location, DomainError> {
        req.validate()?;
        authorize(&ctx.actor, ResourceKind::Location, Operation::Create, None)?;
        let company_id = ctx
            .actor
            .company_id
            .ok_or(DomainError::Forbidden(ForbiddenReason::ScopeMismatch))?;

        let location = self
            .directory
            .store()
            .insert_location(NewLocation {
                company_id,
                name: req.name.trim().to_string(),
                postal_code: req.postal_code.trim().to_uppercase(),
            })
            .await?;

        tracing::info!(
            location_id = location.id,
            company_id,
            "Location created"
        );
        self.audit
            .record(audit_helpers::location_created(ctx, &location))
            .await;

        Ok(location)
    }

    pub async fn update_location(
        &self,
        ctx: &RequestContext,
        id: i64,
        req: UpdateLocationRequest,
    ) -> Result<Location, DomainError> {
        req.validate()?;
        let changes = LocationChanges::from(req);
        if changes.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }

        let before = self.directory.location(id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Location,
            Operation::Update,
            Some(&location_target(&before)),
        )?;

        let after = self
            .directory
            .store()
            .update_location(id, &changes)
            .await?
            .ok_or_else(|| DomainError::not_found("Location not found"))?;

        self.audit
            .record(audit_helpers::location_updated(ctx, &before, &after))
            .await;
        Ok(after)
    }

    /// Deletes an empty location. Locations with devices are refused.
    pub async fn delete_location(&self, ctx: &RequestContext, id: i64) -> Result<(), DomainError> {
        let location = self.directory.location(id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Location,
            Operation::Delete,
            Some(&location_target(&location)),
        )?;

        let devices = self.directory.store().count_devices(id).await?;
        if devices > 0 {
            return Err(DomainError::validation(format!(
                "Location still has {} device(s); remove them first",
                devices
            )));
        }

        if !self.directory.store().delete_location(id).await? {
            return Err(DomainError::not_found("Location not found"));
        }

        tracing::info!(location_id = id, "Location deleted");
        self.audit
            .record(audit_helpers::location_deleted(ctx, &location))
            .await;
        Ok(())
    }

    /// Devices in scope, optionally narrowed to one location.
    pub async fn list_devices(
        &self,
        actor: &Actor,
        location_id: Option<i64>,
    ) -> Result<Vec<Device>, DomainError> {
        let scope = authorize(actor, ResourceKind::Device, Operation::List, None)?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .directory
            .store()
            .list_devices(&scope, location_id)
            .await?)
    }

    pub async fn get_device(&self, actor: &Actor, id: i64) -> Result<Device, DomainError> {
        let device = self.directory.device(id).await?;
        authorize(
            actor,
            ResourceKind::Device,
            Operation::Read,
            Some(&device_target(&device)),
        )?;
        Ok(device)
    }

    pub async fn create_device(
        &self,
        ctx: &RequestContext,
        req: CreateDeviceRequest,
    ) -> Result<Device, DomainError> {
        req.validate()?;
        let location = self.directory.location(req.location_id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Device,
            Operation::Create,
            Some(&location_target(&location)),
        )?;

        let device = self
            .directory
            .store()
            .insert_device(NewDevice {
                location_id: location.id,
                name: req.name.trim().to_string(),
                device_type: req.device_type.trim().to_string(),
                thresholds: req.thresholds,
            })
            .await?;

        tracing::info!(
            device_id = device.id,
            location_id = location.id,
            "Device created"
        );
        self.audit
            .record(audit_helpers::device_created(ctx, &device))
            .await;
        Ok(device)
    }

    pub async fn update_device(
        &self,
        ctx: &RequestContext,
        id: i64,
        req: UpdateDeviceRequest,
    ) -> Result<Device, DomainError> {
        req.validate()?;
        let changes = DeviceChanges::from(req);
        if changes.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }

        let before = self.directory.device(id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Device,
            Operation::Update,
            Some(&device_target(&before)),
        )?;

        let after = self
            .directory
            .store()
            .update_device(id, &changes)
            .await?
            .ok_or_else(|| DomainError::not_found("Device not found"))?;

        self.audit
            .record(audit_helpers::device_updated(ctx, &before, &after))
            .await;
        Ok(after)
    }

    /// Deletes a device together with its readings and alerts.
    pub async fn delete_device(&self, ctx: &RequestContext, id: i64) -> Result<(), DomainError> {
        let device = self.directory.device(id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Device,
            Operation::Delete,
            Some(&device_target(&device)),
        )?;

        if !self.directory.store().delete_device(id).await? {
            return Err(DomainError::not_found("Device not found"));
        }

        tracing::info!(device_id = id, "Device deleted");
        self.audit
            .record(audit_helpers::device_deleted(ctx, &device))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, AuditAction, Company, Role, Thresholds, UserProfile};
    use crate::services::audit::AuditDiagnostics;
    use crate::testing::InMemoryStore;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: LocationService,
        company: Company,
        manager: UserProfile,
        admin: UserProfile,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let company = store.seed_company("Acme Cold Chain");
        let manager =
            store.seed_profile(Role::Manager, Some(company.id), None, AccountStatus::Approved);
        let admin = store.seed_profile(Role::Admin, None, None, AccountStatus::Approved);
        let service = LocationService::new(
            TenantDirectory::new(store.clone()),
            AuditRecorder::new(store.clone(), AuditDiagnostics::disabled()),
        );
        Fixture {
            store,
            service,
            company,
            manager,
            admin,
        }
    }

    fn ctx(profile: &UserProfile) -> RequestContext {
        RequestContext::new(profile.to_actor(), None)
    }

    fn location_request(name: &str) -> CreateLocationRequest {
        CreateLocationRequest {
            name: name.to_string(),
            postal_code: "sw1a 1aa".to_string(),
        }
    }

    #[tokio::test]
    async fn test_manager_creates_location_in_own_company() {
        let f = fixture();
        let location = f
            .service
            .create_location(&ctx(&f.manager), location_request("Harbour Depot"))
            .await
            .unwrap();
        assert_eq!(location.company_id, f.company.id);
        assert_eq!(location.postal_code, "SW1A 1AA");

        let entry = f.store.audit_entries().pop().unwrap();
        assert_eq!(entry.action, AuditAction::LocationCreated);
        assert_eq!(entry.actor_profile_id, Some(f.manager.id));
    }

    #[tokio::test]
    async fn test_admin_cannot_create_location() {
        let f = fixture();
        let err = f
            .service
            .create_location(&ctx(&f.admin), location_request("Harbour Depot"))
            .await
            .unwrap_err();
        assert_eq!(
            err.forbidden_reason(),
            Some(ForbiddenReason::RoleInsufficient)
        );
    }

    #[tokio::test]
    async fn test_delete_location_with_devices_refused() {
        let f = fixture();
        let location = f.store.seed_location(f.company.id, "Depot North");
        let device = f.store.seed_device(&location, Thresholds::default());

        let err = f
            .service
            .delete_location(&ctx(&f.manager), location.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        f.service
            .delete_device(&ctx(&f.manager), device.id)
            .await
            .unwrap();
        f.service
            .delete_location(&ctx(&f.manager), location.id)
            .await
            .unwrap();

        let actions: Vec<_> = f.store.audit_entries().iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![AuditAction::DeviceDeleted, AuditAction::LocationDeleted]
        );
    }

    #[tokio::test]
    async fn test_manager_cannot_touch_foreign_location() {
        let f = fixture();
        let other = f.store.seed_company("Other Foods");
        let foreign = f.store.seed_location(other.id, "Elsewhere");

        let err = f
            .service
            .get_location(&f.manager.to_actor(), foreign.id)
            .await
            .unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::ScopeMismatch));

        let err = f
            .service
            .create_device(
                &ctx(&f.manager),
                CreateDeviceRequest {
                    location_id: foreign.id,
                    name: "Freezer 2".to_string(),
                    device_type: "freezer".to_string(),
                    thresholds: Thresholds::default(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::ScopeMismatch));
    }

    #[tokio::test]
    async fn test_update_device_thresholds_audited() {
        let f = fixture();
        let location = f.store.seed_location(f.company.id, "Depot North");
        let device = f.store.seed_device(&location, Thresholds::default());

        let updated = f
            .service
            .update_device(
                &ctx(&f.manager),
                device.id,
                UpdateDeviceRequest {
                    thresholds: Some(Thresholds {
                        temperature_max: Some(8.0),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.thresholds.temperature_max, Some(8.0));

        let entry = f.store.audit_entries().pop().unwrap();
        assert_eq!(entry.action, AuditAction::DeviceUpdated);
        assert_eq!(entry.entity_id, Some(device.id));
    }

    #[tokio::test]
    async fn test_employee_lists_only_own_location() {
        let f = fixture();
        let mine = f.store.seed_location(f.company.id, "Depot North");
        f.store.seed_location(f.company.id, "Depot South");
        let employee = f.store.seed_profile(
            Role::Employee,
            Some(f.company.id),
            Some(mine.id),
            AccountStatus::Approved,
        );

        let locations = f
            .service
            .list_locations(&employee.to_actor())
            .await
            .unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].id, mine.id);

        let companies = f.service.list_companies(&employee.to_actor()).await;
        assert!(companies.is_err());
    }
}
