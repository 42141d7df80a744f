//! Postgres adapter for the tenant directory port.

use async_trait::async_trait;
use domain::models::{
    AccountStatus, Company, Device, DeviceChanges, Location, LocationChanges, NewDevice,
    NewLocation, NewUserProfile, ProfileChanges, UserProfile,
};
use domain::ports::DirectoryStore;
use domain::services::ScopeFilter;
use domain::StoreError;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CompanyRepository, DeviceRepository, LocationRepository, ProfileRepository};
use crate::error::store_error;

/// Company → Location → Device hierarchy and user profiles.
#[derive(Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
    profiles: ProfileRepository,
    companies: CompanyRepository,
    locations: LocationRepository,
    devices: DeviceRepository,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool.clone()),
            companies: CompanyRepository::new(pool.clone()),
            locations: LocationRepository::new(pool.clone()),
            devices: DeviceRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, StoreError> {
        self.profiles.find_by_id(id).await.map_err(store_error)
    }

    async fn find_profile_by_auth_user(
        &self,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.profiles
            .find_by_auth_user(auth_user_id)
            .await
            .map_err(store_error)
    }

    async fn find_unlinked_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.profiles
            .find_unlinked_by_email(email)
            .await
            .map_err(store_error)
    }

    async fn link_profile(
        &self,
        id: i64,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.profiles.link(id, auth_user_id).await.map_err(store_error)
    }

    async fn list_profiles(&self, scope: &ScopeFilter) -> Result<Vec<UserProfile>, StoreError> {
        self.profiles.list(scope).await.map_err(store_error)
    }

    async fn insert_profile(&self, profile: NewUserProfile) -> Result<UserProfile, StoreError> {
        self.profiles.insert(profile).await.map_err(store_error)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.profiles.update(id, changes).await.map_err(store_error)
    }

    async fn set_profile_status(
        &self,
        id: i64,
        status: AccountStatus,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.profiles.set_status(id, status).await.map_err(store_error)
    }

    async fn find_company(&self, id: i64) -> Result<Option<Company>, StoreError> {
        self.companies.find_by_id(id).await.map_err(store_error)
    }

    async fn list_companies(&self, scope: &ScopeFilter) -> Result<Vec<Company>, StoreError> {
        self.companies.list(scope).await.map_err(store_error)
    }

    async fn insert_company(&self, name: &str) -> Result<Company, StoreError> {
        self.companies.insert(name).await.map_err(store_error)
    }

    async fn find_location(&self, id: i64) -> Result<Option<Location>, StoreError> {
        self.locations.find_by_id(id).await.map_err(store_error)
    }

    async fn list_locations(&self, scope: &ScopeFilter) -> Result<Vec<Location>, StoreError> {
        self.locations.list(scope).await.map_err(store_error)
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        self.locations.insert(location).await.map_err(store_error)
    }

    async fn update_location(
        &self,
        id: i64,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, StoreError> {
        self.locations.update(id, changes).await.map_err(store_error)
    }

    async fn delete_location(&self, id: i64) -> Result<bool, StoreError> {
        // Devices reference locations with ON DELETE RESTRICT.
        self.locations.delete(id).await.map_err(|e| match store_error(e) {
            StoreError::MissingReference(_) => {
                StoreError::Conflict("Location still has devices".to_string())
            }
            other => other,
        })
    }

    async fn find_device(&self, id: i64) -> Result<Option<Device>, StoreError> {
        self.devices.find_by_id(id).await.map_err(store_error)
    }

    async fn list_devices(
        &self,
        scope: &ScopeFilter,
        location_id: Option<i64>,
    ) -> Result<Vec<Device>, StoreError> {
        self.devices
            .list(scope, location_id)
            .await
            .map_err(store_error)
    }

    async fn count_devices(&self, location_id: i64) -> Result<i64, StoreError> {
        self.devices
            .count_by_location(location_id)
            .await
            .map_err(store_error)
    }

    async fn insert_device(&self, device: NewDevice) -> Result<Device, StoreError> {
        self.devices.insert(device).await.map_err(store_error)
    }

    async fn update_device(
        &self,
        id: i64,
        changes: &DeviceChanges,
    ) -> Result<Option<Device>, StoreError> {
        self.devices.update(id, changes).await.map_err(store_error)
    }

    async fn delete_device(&self, id: i64) -> Result<bool, StoreError> {
        self.devices.delete(id).await.map_err(store_error)
    }
}
