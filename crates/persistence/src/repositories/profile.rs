//! User profile repository for database operations.

use domain::models::{AccountStatus, NewUserProfile, ProfileChanges, UserProfile};
use domain::services::ScopeFilter;
use sqlx::PgPool;
use uuid::Uuid;

use super::filter::FilterBuilder;
use crate::entities::{AccountStatusDb, RoleDb, UserProfileEntity};
use crate::metrics::QueryTimer;

const PROFILE_COLUMNS: &str = r#"
    id, auth_user_id, email, name, role, company_id, location_id, status, created_at, updated_at
"#;

/// Repository for user profile database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile");
        let entity = sqlx::query_as::<_, UserProfileEntity>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn find_by_auth_user(
        &self,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_auth_user");
        let entity = sqlx::query_as::<_, UserProfileEntity>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE auth_user_id = $1"
        ))
        .bind(auth_user_id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn find_unlinked_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let timer = QueryTimer::new("find_unlinked_profile_by_email");
        let entity = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM user_profiles
            WHERE LOWER(email) = LOWER($1) AND auth_user_id IS NULL
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    /// Binds a session identity. A profile linked concurrently is left alone.
    pub async fn link(
        &self,
        id: i64,
        auth_user_id: Uuid,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let timer = QueryTimer::new("link_profile");
        let entity = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            UPDATE user_profiles SET auth_user_id = $2, updated_at = NOW()
            WHERE id = $1 AND auth_user_id IS NULL
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(auth_user_id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn list(&self, scope: &ScopeFilter) -> Result<Vec<UserProfile>, sqlx::Error> {
        let mut filter = FilterBuilder::new();
        let scope_id = filter.scope(scope, "company_id = {}", "location_id = {}");
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE {} ORDER BY created_at DESC, id DESC",
            filter.where_clause()
        );

        let timer = QueryTimer::new("list_profiles");
        let mut query = sqlx::query_as::<_, UserProfileEntity>(&sql);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }
        let entities = timer.finish(query.fetch_all(&self.pool).await)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    pub async fn insert(&self, profile: NewUserProfile) -> Result<UserProfile, sqlx::Error> {
        let timer = QueryTimer::new("insert_profile");
        let entity = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            INSERT INTO user_profiles (auth_user_id, email, name, role, company_id, location_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile.auth_user_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(RoleDb::from(profile.role))
        .bind(profile.company_id)
        .bind(profile.location_id)
        .bind(AccountStatusDb::from(profile.status))
        .fetch_one(&self.pool)
        .await;
        Ok(timer.finish(entity)?.into())
    }

    pub async fn update(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let timer = QueryTimer::new("update_profile");
        let entity = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            UPDATE user_profiles SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                company_id = COALESCE($5, company_id),
                location_id = COALESCE($6, location_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(changes.role.map(RoleDb::from))
        .bind(changes.company_id)
        .bind(changes.location_id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn set_status(
        &self,
        id: i64,
        status: AccountStatus,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let timer = QueryTimer::new("set_profile_status");
        let entity = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            UPDATE user_profiles SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(AccountStatusDb::from(status))
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }
}
