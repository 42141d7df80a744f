//! Company repository for database operations.

use domain::models::Company;
use domain::services::ScopeFilter;
use sqlx::PgPool;

use super::filter::FilterBuilder;
use crate::entities::CompanyEntity;
use crate::metrics::QueryTimer;

/// Repository for company database operations.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Company>, sqlx::Error> {
        let timer = QueryTimer::new("find_company");
        let entity = sqlx::query_as::<_, CompanyEntity>(
            "SELECT id, name, created_at FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn list(&self, scope: &ScopeFilter) -> Result<Vec<Company>, sqlx::Error> {
        let mut filter = FilterBuilder::new();
        let scope_id = filter.scope(
            scope,
            "id = {}",
            "id IN (SELECT company_id FROM locations WHERE id = {})",
        );
        let sql = format!(
            "SELECT id, name, created_at FROM companies WHERE {} ORDER BY name, id",
            filter.where_clause()
        );

        let timer = QueryTimer::new("list_companies");
        let mut query = sqlx::query_as::<_, CompanyEntity>(&sql);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }
        let entities = timer.finish(query.fetch_all(&self.pool).await)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    pub async fn insert(&self, name: &str) -> Result<Company, sqlx::Error> {
        let timer = QueryTimer::new("insert_company");
        let entity = sqlx::query_as::<_, CompanyEntity>(
            "INSERT INTO companies (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        Ok(timer.finish(entity)?.into())
    }
}
