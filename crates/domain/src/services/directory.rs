//! Tenant directory.
//!
//! Read-side view of the Company → Location → Device hierarchy used to
//! build target snapshots for authorization, and to resolve a session
//! identity into an actor.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Device, Location, UserProfile};
use crate::ports::DirectoryStore;
use crate::services::authorization::Target;

#[derive(Clone)]
pub struct TenantDirectory {
    store: Arc<dyn DirectoryStore>,
}

impl TenantDirectory {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    /// Finds the profile bound to a session identity.
    ///
    /// A profile pre-created by an administrator is bound on first sight when
    /// the session email matches it.
    pub async fn resolve_profile(
        &self,
        auth_user_id: Uuid,
        email: Option<&str>,
    ) -> Result<Option<UserProfile>, DomainError> {
        if let Some(profile) = self.store.find_profile_by_auth_user(auth_user_id).await? {
            return Ok(Some(profile));
        }

        let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
            return Ok(None);
        };

        match self.store.find_unlinked_profile_by_email(email).await? {
            Some(unlinked) => {
                tracing::info!(
                    profile_id = unlinked.id,
                    "Binding pre-created profile to session identity"
                );
                Ok(self.store.link_profile(unlinked.id, auth_user_id).await?)
            }
            None => Ok(None),
        }
    }

    pub async fn profile(&self, id: i64) -> Result<UserProfile, DomainError> {
        self.store
            .find_profile(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    pub async fn location(&self, id: i64) -> Result<Location, DomainError> {
        self.store
            .find_location(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Location not found"))
    }

    pub async fn device(&self, id: i64) -> Result<Device, DomainError> {
        self.store
            .find_device(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Device not found"))
    }
}

/// Target snapshot of a user account.
pub fn profile_target(profile: &UserProfile) -> Target {
    Target::account(profile.company_id, profile.location_id).with_role(profile.role)
}

pub fn location_target(location: &Location) -> Target {
    Target::location(location.company_id, location.id)
}

pub fn device_target(device: &Device) -> Target {
    Target::location(device.company_id, device.location_id)
}
