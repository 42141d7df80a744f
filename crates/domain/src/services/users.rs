//! User administration and onboarding.

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{DomainError, ForbiddenReason};
use crate::models::{
    AccountStatus, Actor, ApproveUserRequest, CreateUserRequest, Location, NewLocation,
    NewUserProfile, OnboardingRequest, ProfileChanges, RequestContext, Role, UpdateUserRequest,
    UserProfile,
};
use crate::services::audit::{audit_helpers, AuditRecorder};
use crate::services::authorization::{
    authorize, forced_company, Operation, ResourceKind, RoleChangePolicy, Target,
};
use crate::services::directory::{profile_target, TenantDirectory};

/// Identity asserted by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub auth_user_id: Uuid,
    pub email: Option<String>,
}

fn parse_role(value: &str) -> Result<Role, DomainError> {
    value.parse::<Role>().map_err(DomainError::Validation)
}

fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, DomainError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::validation(message))
}

#[derive(Clone)]
pub struct UserAdminService {
    directory: TenantDirectory,
    audit: AuditRecorder,
    role_policy: RoleChangePolicy,
}

impl UserAdminService {
    pub fn new(directory: TenantDirectory, audit: AuditRecorder, role_policy: RoleChangePolicy) -> Self {
        Self {
            directory,
            audit,
            role_policy,
        }
    }

    /// The caller's own profile, whatever its status.
    pub async fn profile(&self, actor: &Actor) -> Result<UserProfile, DomainError> {
        self.directory.profile(actor.profile_id).await
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<UserProfile>, DomainError> {
        let scope = authorize(actor, ResourceKind::User, Operation::List, None)?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.directory.store().list_profiles(&scope).await?)
    }

    /// Checks that `location_id` belongs to `company_id`.
    ///
    /// Managers get a scope denial, admins a validation error.
    async fn check_location(
        &self,
        actor: &Actor,
        location_id: i64,
        company_id: Option<i64>,
    ) -> Result<Location, DomainError> {
        let location = self.directory.location(location_id).await?;
        if company_id == Some(location.company_id) {
            return Ok(location);
        }
        match actor.role {
            Role::Admin => Err(DomainError::validation(
                "Location does not belong to the user's company",
            )),
            Role::Manager | Role::Employee => {
                Err(DomainError::Forbidden(ForbiddenReason::ScopeMismatch))
            }
        }
    }

    /// Creates an approved account.
    ///
    /// The company is forced from the actor before the insert, so a manager
    /// can never file a user under another company.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateUserRequest,
    ) -> Result<UserProfile, DomainError> {
        let actor = &ctx.actor;
        req.validate()?;
        let role = parse_role(&req.role)?;

        let mut company_id = forced_company(actor, req.company_id);
        let target = Target::account(company_id, None).with_role(role);
        authorize(actor, ResourceKind::User, Operation::Create, Some(&target))?;
        self.role_policy.check(actor, role)?;

        if let Some(location_id) = req.location_id {
            if actor.role == Role::Admin && company_id.is_none() {
                company_id = Some(self.directory.location(location_id).await?.company_id);
            }
            self.check_location(actor, location_id, company_id).await?;
        }

        let profile = self
            .directory
            .store()
            .insert_profile(NewUserProfile {
                auth_user_id: None,
                email: req.email.trim().to_lowercase(),
                name: req.name.trim().to_string(),
                role,
                company_id,
                location_id: req.location_id,
                status: AccountStatus::Approved,
            })
            .await?;

        tracing::info!(
            user_id = profile.id,
            role = %profile.role,
            company_id = ?profile.company_id,
            created_by = actor.profile_id,
            "User created"
        );
        self.audit
            .record(audit_helpers::user_created(ctx, &profile))
            .await;

        Ok(profile)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        user_id: i64,
        req: UpdateUserRequest,
    ) -> Result<UserProfile, DomainError> {
        let actor = &ctx.actor;
        req.validate()?;

        let changes = ProfileChanges {
            name: req.name.map(|n| n.trim().to_string()),
            email: req.email.map(|e| e.trim().to_lowercase()),
            role: req.role.as_deref().map(parse_role).transpose()?,
            company_id: req.company_id,
            location_id: req.location_id,
        };
        if changes.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }

        let before = self.directory.profile(user_id).await?;
        let target = profile_target(&before).reassigning_to(changes.company_id);
        authorize(actor, ResourceKind::User, Operation::Update, Some(&target))?;
        if let Some(role) = changes.role {
            self.role_policy.check(actor, role)?;
        }

        // A location never travels across companies with its user.
        let moves_company = changes
            .company_id
            .is_some_and(|company_id| Some(company_id) != before.company_id);
        if moves_company && before.location_id.is_some() && changes.location_id.is_none() {
            return Err(DomainError::validation(
                "locationId is required when moving a user to another company",
            ));
        }

        if let Some(location_id) = changes.location_id {
            let company_id = changes.company_id.or(before.company_id);
            self.check_location(actor, location_id, company_id).await?;
        }

        let updated = self
            .directory
            .store()
            .update_profile(user_id, &changes)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        tracing::info!(
            user_id,
            updated_by = actor.profile_id,
            "User updated"
        );
        self.audit
            .record(audit_helpers::user_updated(ctx, &before, &changes))
            .await;

        Ok(updated)
    }

    /// Approves or suspends an account.
    ///
    /// Not deduplicated: approving twice writes two audit entries.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        req: ApproveUserRequest,
    ) -> Result<UserProfile, DomainError> {
        let actor = &ctx.actor;
        let (Some(user_id), Some(status)) = (req.user_id, req.status.as_deref()) else {
            return Err(DomainError::validation("userId and status are required"));
        };
        let status = match status.parse::<AccountStatus>() {
            Ok(s @ (AccountStatus::Approved | AccountStatus::Suspended)) => s,
            _ => {
                return Err(DomainError::validation(
                    "status must be approved or suspended",
                ))
            }
        };

        let before = self.directory.profile(user_id).await?;
        authorize(
            actor,
            ResourceKind::User,
            Operation::ChangeStatus,
            Some(&profile_target(&before)),
        )?;

        let updated = self
            .directory
            .store()
            .set_profile_status(user_id, status)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        tracing::info!(
            user_id,
            previous = %before.status,
            status = %updated.status,
            changed_by = actor.profile_id,
            "User status changed"
        );
        self.audit
            .record(audit_helpers::user_status_changed(ctx, &updated, before.status))
            .await;

        Ok(updated)
    }

    /// Creates the caller's profile on first sign-in.
    pub async fn onboard(
        &self,
        session: &SessionIdentity,
        req: OnboardingRequest,
        ip_address: Option<String>,
    ) -> Result<UserProfile, DomainError> {
        req.validate()?;

        if self
            .directory
            .resolve_profile(session.auth_user_id, session.email.as_deref())
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict("Profile already exists".to_string()));
        }

        let email = session
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DomainError::validation("Session has no email address"))?
            .to_lowercase();
        let role = parse_role(&req.role)?;
        let name = req.name.trim().to_string();
        let store = self.directory.store();

        let (company_id, location, created_location) = match role {
            Role::Admin => {
                return Err(DomainError::validation(
                    "Administrator accounts cannot be self-selected",
                ))
            }
            Role::Manager => {
                let company_name =
                    required(&req.company_name, "Company name is required for managers")?;
                let location_name =
                    required(&req.location_name, "Location name is required for managers")?;
                let postal_code =
                    required(&req.postal_code, "Postal code is required for managers")?;
                shared::validation::validate_postal_code(postal_code)
                    .map_err(|e| DomainError::validation(e.to_string()))?;

                let company = store.insert_company(company_name).await?;
                let location = store
                    .insert_location(NewLocation {
                        company_id: company.id,
                        name: location_name.to_string(),
                        postal_code: postal_code.to_uppercase(),
                    })
                    .await?;
                (company.id, location, true)
            }
            Role::Employee => {
                let location_id = req
                    .location_id
                    .ok_or_else(|| DomainError::validation("Location is required for employees"))?;
                let location = store
                    .find_location(location_id)
                    .await?
                    .ok_or_else(|| DomainError::validation("Invalid location"))?;
                (location.company_id, location, false)
            }
        };

        let profile = store
            .insert_profile(NewUserProfile {
                auth_user_id: Some(session.auth_user_id),
                email,
                name,
                role,
                company_id: Some(company_id),
                location_id: Some(location.id),
                status: AccountStatus::Pending,
            })
            .await?;

        tracing::info!(
            user_id = profile.id,
            role = %profile.role,
            company_id,
            "User onboarded"
        );

        let ctx = RequestContext::new(profile.to_actor(), ip_address);
        self.audit
            .record(audit_helpers::user_created(&ctx, &profile))
            .await;
        if created_location {
            self.audit
                .record(audit_helpers::location_created(&ctx, &location))
                .await;
        }

        Ok(profile)
    }
}
