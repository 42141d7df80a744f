//! User profile entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AccountStatus, Role, UserProfile};
use sqlx::FromRow;
use uuid::Uuid;

db_enum!(RoleDb, "user_role", Role { Admin, Manager, Employee });
db_enum!(AccountStatusDb, "account_status", AccountStatus { Pending, Approved, Suspended });

/// Database row mapping for the user_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileEntity {
    pub id: i64,
    pub auth_user_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: RoleDb,
    pub company_id: Option<i64>,
    pub location_id: Option<i64>,
    pub status: AccountStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfileEntity> for UserProfile {
    fn from(entity: UserProfileEntity) -> Self {
        Self {
            id: entity.id,
            auth_user_id: entity.auth_user_id,
            email: entity.email,
            name: entity.name,
            role: entity.role.into(),
            company_id: entity.company_id,
            location_id: entity.location_id,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_entity_conversion() {
        let now = Utc::now();
        let entity = UserProfileEntity {
            id: 4,
            auth_user_id: None,
            email: "ops@example.com".to_string(),
            name: "Ops".to_string(),
            role: RoleDb::Manager,
            company_id: Some(2),
            location_id: None,
            status: AccountStatusDb::Pending,
            created_at: now,
            updated_at: now,
        };

        let profile: UserProfile = entity.into();
        assert_eq!(profile.role, Role::Manager);
        assert_eq!(profile.status, AccountStatus::Pending);
        assert_eq!(profile.company_id, Some(2));
    }

    #[test]
    fn test_role_db_roundtrip() {
        for role in [Role::Admin, Role::Manager, Role::Employee] {
            assert_eq!(Role::from(RoleDb::from(role)), role);
        }
    }
}
