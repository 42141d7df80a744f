//! User profile domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::actor::Actor;
use super::role::{AccountStatus, Role};

/// A user's profile and organizational assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    /// Identity at the session provider; unset until the user first signs in.
    pub auth_user_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company_id: Option<i64>,
    pub location_id: Option<i64>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Snapshot used by the authorization engine.
    pub fn to_actor(&self) -> Actor {
        Actor {
            profile_id: self.id,
            role: self.role,
            company_id: self.company_id,
            location_id: self.location_id,
            status: self.status,
        }
    }
}

/// Input for inserting a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserProfile {
    pub auth_user_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company_id: Option<i64>,
    pub location_id: Option<i64>,
    pub status: AccountStatus,
}

/// Partial update of a profile. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.company_id.is_none()
            && self.location_id.is_none()
    }

    /// Applies the changes to a profile in place.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(ref name) = self.name {
            profile.name = name.clone();
        }
        if let Some(ref email) = self.email {
            profile.email = email.clone();
        }
        if let Some(role) = self.role {
            profile.role = role;
        }
        if let Some(company_id) = self.company_id {
            profile.company_id = Some(company_id);
        }
        if let Some(location_id) = self.location_id {
            profile.location_id = Some(location_id);
        }
    }
}

/// Request payload for creating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = 1,
        max = 120,
        message = "Name must be between 1 and 120 characters"
    ))]
    pub name: String,

    /// Role name; legacy aliases are accepted.
    pub role: String,

    /// Ignored for managers, who always create into their own company.
    pub company_id: Option<i64>,

    pub location_id: Option<i64>,
}

/// Request payload for updating a user.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Name must be between 1 and 120 characters"
    ))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub role: Option<String>,
    pub company_id: Option<i64>,
    pub location_id: Option<i64>,
}

/// Request payload for approving or suspending an account.
///
/// Both fields are optional on the wire so their absence can be reported as
/// a validation failure instead of a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveUserRequest {
    pub user_id: Option<i64>,
    pub status: Option<String>,
}

/// Request payload for completing sign-up.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub role: String,

    #[validate(length(
        min = 1,
        max = 120,
        message = "Name must be between 1 and 120 characters"
    ))]
    pub name: String,

    #[validate(length(max = 200, message = "Company name must be at most 200 characters"))]
    pub company_name: Option<String>,

    #[validate(length(max = 200, message = "Location name must be at most 200 characters"))]
    pub location_name: Option<String>,

    #[serde(alias = "pincode")]
    pub postal_code: Option<String>,

    pub location_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 11,
            auth_user_id: None,
            email: "kiran@example.com".to_string(),
            name: "Kiran".to_string(),
            role: Role::Employee,
            company_id: Some(7),
            location_id: Some(70),
            status: AccountStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_actor() {
        let actor = profile().to_actor();
        assert_eq!(actor.profile_id, 11);
        assert_eq!(actor.role, Role::Employee);
        assert_eq!(actor.location_id, Some(70));
    }

    #[test]
    fn test_changes_empty() {
        assert!(ProfileChanges::default().is_empty());
        let changes = ProfileChanges {
            name: Some("K".into()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_changes_apply_only_set_fields() {
        let mut p = profile();
        ProfileChanges {
            role: Some(Role::Manager),
            company_id: Some(9),
            ..Default::default()
        }
        .apply_to(&mut p);
        assert_eq!(p.role, Role::Manager);
        assert_eq!(p.company_id, Some(9));
        assert_eq!(p.name, "Kiran");
        assert_eq!(p.location_id, Some(70));
    }

    #[test]
    fn test_changes_serialize_skip_none() {
        let json = serde_json::to_value(ProfileChanges {
            email: Some("a@b.co".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.co"}));
    }
}
