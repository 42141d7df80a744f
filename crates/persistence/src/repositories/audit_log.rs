//! Audit log repository for database operations.
//!
//! Appends are serialised with a transaction-scoped advisory lock so each
//! entry chains to exactly one predecessor.

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{audit_timestamp, AuditLogEntry, AuditLogFilter, AuditScope, NewAuditEntry};
use domain::ports::AuditStore;
use domain::StoreError;
use shared::crypto::GENESIS_HASH;
use sqlx::PgPool;

use super::filter::FilterBuilder;
use crate::entities::AuditLogEntity;
use crate::error::store_error;
use crate::metrics::QueryTimer;

/// Advisory lock key guarding the head of the chain.
const AUDIT_CHAIN_LOCK: i64 = 0x4155_4449_545f_4c4b;

const AUDIT_COLUMNS: &str = r#"
    id, actor_profile_id, action, taxonomy_version, entity_type, entity_id,
    details, ip_address, created_at, prev_hash, entry_hash
"#;

/// Builds the WHERE clause for an audit query. The scope parameter, if any,
/// comes first, then the filters in field order.
fn audit_filter(scope: &AuditScope, filter: &AuditLogFilter) -> FilterBuilder {
    let mut builder = FilterBuilder::new();
    match scope {
        AuditScope::All => {}
        AuditScope::ActorCompany(_) => {
            builder.param("actor_profile_id IN (SELECT id FROM user_profiles WHERE company_id = {})");
        }
        AuditScope::Nothing => {
            builder.raw("FALSE");
        }
    }
    if filter.action.is_some() {
        builder.param("action = {}");
    }
    if filter.entity_type.is_some() {
        builder.param("entity_type = {}");
    }
    if filter.entity_id.is_some() {
        builder.param("entity_id = {}");
    }
    if filter.actor_profile_id.is_some() {
        builder.param("actor_profile_id = {}");
    }
    if filter.from.is_some() {
        builder.param("created_at >= {}");
    }
    if filter.to.is_some() {
        builder.param("created_at <= {}");
    }
    builder
}

/// Binds the parameters declared by [`audit_filter`], in the same order.
macro_rules! bind_audit_filters {
    ($builder:expr, $scope:expr, $filter:expr) => {{
        let mut b = $builder;
        if let AuditScope::ActorCompany(company_id) = $scope {
            b = b.bind(*company_id);
        }
        if let Some(action) = $filter.action {
            b = b.bind(action.as_str());
        }
        if let Some(entity_type) = $filter.entity_type {
            b = b.bind(entity_type.as_str());
        }
        if let Some(entity_id) = $filter.entity_id {
            b = b.bind(entity_id);
        }
        if let Some(actor_profile_id) = $filter.actor_profile_id {
            b = b.bind(actor_profile_id);
        }
        if let Some(from) = $filter.from {
            b = b.bind(from);
        }
        if let Some(to) = $filter.to {
            b = b.bind(to);
        }
        b
    }};
}

/// Repository for audit log database operations.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an entry chained to the current head.
    pub async fn insert_chained(&self, entry: NewAuditEntry) -> Result<AuditLogEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(AUDIT_CHAIN_LOCK)
            .execute(&mut *tx)
            .await?;

        let prev_hash = sqlx::query_scalar::<_, String>(
            "SELECT entry_hash FROM audit_logs ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or_else(|| GENESIS_HASH.to_string());

        let created_at = audit_timestamp(Utc::now());
        let entry_hash = entry.chain_hash(&prev_hash, created_at);

        let entity = sqlx::query_as::<_, AuditLogEntity>(&format!(
            r#"
            INSERT INTO audit_logs (
                actor_profile_id, action, taxonomy_version, entity_type, entity_id,
                details, ip_address, created_at, prev_hash, entry_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {AUDIT_COLUMNS}
            "#
        ))
        .bind(entry.actor_profile_id)
        .bind(entry.action.as_str())
        .bind(domain::models::AUDIT_TAXONOMY_VERSION)
        .bind(entry.entity_type.as_str())
        .bind(entry.entity_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(created_at)
        .bind(&prev_hash)
        .bind(&entry_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity)
    }

    pub async fn search(
        &self,
        scope: &AuditScope,
        filter: &AuditLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntity>, sqlx::Error> {
        let builder = audit_filter(scope, filter);
        let sql = format!(
            r#"
            SELECT {AUDIT_COLUMNS} FROM audit_logs
            WHERE {}
            ORDER BY created_at DESC, id DESC
            LIMIT ${} OFFSET ${}
            "#,
            builder.where_clause(),
            builder.param_count() + 1,
            builder.param_count() + 2
        );

        let timer = QueryTimer::new("query_audit_logs");
        let query = sqlx::query_as::<_, AuditLogEntity>(&sql);
        let query = bind_audit_filters!(query, scope, filter);
        let entities = query.bind(limit).bind(offset).fetch_all(&self.pool).await;
        timer.finish(entities)
    }

    pub async fn batch_after(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("audit_chain_batch");
        let entities = sqlx::query_as::<_, AuditLogEntity>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE id > $1 ORDER BY id ASC LIMIT $2"
        ))
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(entities)
    }
}

fn into_entries(entities: Vec<AuditLogEntity>) -> Result<Vec<AuditLogEntry>, StoreError> {
    entities.into_iter().map(AuditLogEntry::try_from).collect()
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError> {
        let timer = QueryTimer::new("append_audit_entry");
        let entity = timer.finish(self.insert_chained(entry).await);
        entity.map_err(store_error)?.try_into()
    }

    async fn query(
        &self,
        scope: &AuditScope,
        filter: &AuditLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        into_entries(
            self.search(scope, filter, limit, offset)
                .await
                .map_err(store_error)?,
        )
    }

    async fn chain_batch(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        into_entries(self.batch_after(after_id, limit).await.map_err(store_error)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::models::AuditAction;

    #[test]
    fn test_unfiltered_query_matches_everything() {
        let builder = audit_filter(&AuditScope::All, &AuditLogFilter::default());
        assert_eq!(builder.where_clause(), "TRUE");
        assert_eq!(builder.param_count(), 0);
    }

    #[test]
    fn test_company_scope_comes_first() {
        let filter = AuditLogFilter {
            action: Some(AuditAction::UserApproved),
            from: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let builder = audit_filter(&AuditScope::ActorCompany(4), &filter);
        assert_eq!(
            builder.where_clause(),
            "actor_profile_id IN (SELECT id FROM user_profiles WHERE company_id = $1) \
             AND action = $2 AND created_at >= $3"
        );
        assert_eq!(builder.param_count(), 3);
    }

    #[test]
    fn test_nothing_scope_matches_nothing() {
        let filter = AuditLogFilter {
            entity_id: Some(5),
            ..Default::default()
        };
        let builder = audit_filter(&AuditScope::Nothing, &filter);
        assert_eq!(builder.where_clause(), "FALSE AND entity_id = $1");
    }
}
