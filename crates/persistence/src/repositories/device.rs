//! Device repository for database operations.

use domain::models::{Device, DeviceChanges, NewDevice};
use domain::services::ScopeFilter;
use sqlx::PgPool;

use super::filter::FilterBuilder;
use crate::entities::{DeviceEntity, DeviceStatusDb};
use crate::metrics::QueryTimer;

/// Device columns with the company joined from the owning location. Expects
/// the device relation aliased `d` and locations aliased `l`.
const DEVICE_COLUMNS: &str = r#"
    d.id, d.location_id, l.company_id, d.name, d.device_type,
    d.temperature_min, d.temperature_max, d.humidity_min, d.humidity_max,
    d.status, d.created_at, d.updated_at
"#;

/// Repository for device database operations.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Device>, sqlx::Error> {
        let timer = QueryTimer::new("find_device");
        let entity = sqlx::query_as::<_, DeviceEntity>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM devices d JOIN locations l ON l.id = d.location_id
            WHERE d.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn list(
        &self,
        scope: &ScopeFilter,
        location_id: Option<i64>,
    ) -> Result<Vec<Device>, sqlx::Error> {
        let mut filter = FilterBuilder::new();
        let scope_id = filter.scope(scope, "l.company_id = {}", "d.location_id = {}");
        if location_id.is_some() {
            filter.param("d.location_id = {}");
        }
        let sql = format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM devices d JOIN locations l ON l.id = d.location_id
            WHERE {}
            ORDER BY d.name, d.id
            "#,
            filter.where_clause()
        );

        let timer = QueryTimer::new("list_devices");
        let mut query = sqlx::query_as::<_, DeviceEntity>(&sql);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }
        if let Some(id) = location_id {
            query = query.bind(id);
        }
        let entities = timer.finish(query.fetch_all(&self.pool).await)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    pub async fn count_by_location(&self, location_id: i64) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_devices");
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM devices WHERE location_id = $1",
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(count)
    }

    pub async fn insert(&self, device: NewDevice) -> Result<Device, sqlx::Error> {
        let timer = QueryTimer::new("insert_device");
        let entity = sqlx::query_as::<_, DeviceEntity>(&format!(
            r#"
            WITH d AS (
                INSERT INTO devices (
                    location_id, name, device_type,
                    temperature_min, temperature_max, humidity_min, humidity_max
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT {DEVICE_COLUMNS} FROM d JOIN locations l ON l.id = d.location_id
            "#
        ))
        .bind(device.location_id)
        .bind(&device.name)
        .bind(&device.device_type)
        .bind(device.thresholds.temperature_min)
        .bind(device.thresholds.temperature_max)
        .bind(device.thresholds.humidity_min)
        .bind(device.thresholds.humidity_max)
        .fetch_one(&self.pool)
        .await;
        Ok(timer.finish(entity)?.into())
    }

    /// Applies a partial update. Thresholds are replaced as a whole when
    /// given, so a bound can be cleared.
    pub async fn update(
        &self,
        id: i64,
        changes: &DeviceChanges,
    ) -> Result<Option<Device>, sqlx::Error> {
        let thresholds = changes.thresholds.unwrap_or_default();
        let timer = QueryTimer::new("update_device");
        let entity = sqlx::query_as::<_, DeviceEntity>(&format!(
            r#"
            WITH d AS (
                UPDATE devices SET
                    name = COALESCE($2, name),
                    device_type = COALESCE($3, device_type),
                    status = COALESCE($4, status),
                    temperature_min = CASE WHEN $5 THEN $6 ELSE temperature_min END,
                    temperature_max = CASE WHEN $5 THEN $7 ELSE temperature_max END,
                    humidity_min = CASE WHEN $5 THEN $8 ELSE humidity_min END,
                    humidity_max = CASE WHEN $5 THEN $9 ELSE humidity_max END,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {DEVICE_COLUMNS} FROM d JOIN locations l ON l.id = d.location_id
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.device_type)
        .bind(changes.status.map(DeviceStatusDb::from))
        .bind(changes.thresholds.is_some())
        .bind(thresholds.temperature_min)
        .bind(thresholds.temperature_max)
        .bind(thresholds.humidity_min)
        .bind(thresholds.humidity_max)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    /// Deletes a device. Readings and alerts go with it; tickets keep their
    /// row with the device reference cleared.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_device");
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        Ok(timer.finish(result)?.rows_affected() > 0)
    }
}
