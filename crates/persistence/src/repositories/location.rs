//! Location repository for database operations.

use domain::models::{Location, LocationChanges, NewLocation};
use domain::services::ScopeFilter;
use sqlx::PgPool;

use super::filter::FilterBuilder;
use crate::entities::LocationEntity;
use crate::metrics::QueryTimer;

const LOCATION_COLUMNS: &str = "id, company_id, name, postal_code, created_at, updated_at";

/// Repository for location database operations.
#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Location>, sqlx::Error> {
        let timer = QueryTimer::new("find_location");
        let entity = sqlx::query_as::<_, LocationEntity>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn list(&self, scope: &ScopeFilter) -> Result<Vec<Location>, sqlx::Error> {
        let mut filter = FilterBuilder::new();
        let scope_id = filter.scope(scope, "company_id = {}", "id = {}");
        let sql = format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE {} ORDER BY name, id",
            filter.where_clause()
        );

        let timer = QueryTimer::new("list_locations");
        let mut query = sqlx::query_as::<_, LocationEntity>(&sql);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }
        let entities = timer.finish(query.fetch_all(&self.pool).await)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    pub async fn insert(&self, location: NewLocation) -> Result<Location, sqlx::Error> {
        let timer = QueryTimer::new("insert_location");
        let entity = sqlx::query_as::<_, LocationEntity>(&format!(
            r#"
            INSERT INTO locations (company_id, name, postal_code)
            VALUES ($1, $2, $3)
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(location.company_id)
        .bind(&location.name)
        .bind(&location.postal_code)
        .fetch_one(&self.pool)
        .await;
        Ok(timer.finish(entity)?.into())
    }

    pub async fn update(
        &self,
        id: i64,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, sqlx::Error> {
        let timer = QueryTimer::new("update_location");
        let entity = sqlx::query_as::<_, LocationEntity>(&format!(
            r#"
            UPDATE locations SET
                name = COALESCE($2, name),
                postal_code = COALESCE($3, postal_code),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.postal_code)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_location");
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        Ok(timer.finish(result)?.rows_affected() > 0)
    }
}
