//! Sensor reading repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{NewReading, SensorReading};
use domain::ports::ReadingStore;
use domain::StoreError;
use shared::pagination::KeysetCursor;
use sqlx::PgPool;

use crate::entities::{DoorStatusDb, SensorReadingEntity};
use crate::error::store_error;
use crate::metrics::QueryTimer;

const READING_COLUMNS: &str = "id, device_id, temperature, humidity, door_status, recorded_at";

/// Repository for sensor reading database operations.
#[derive(Clone)]
pub struct ReadingRepository {
    pool: PgPool,
}

impl ReadingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, reading: NewReading) -> Result<SensorReading, sqlx::Error> {
        let timer = QueryTimer::new("append_reading");
        let entity = sqlx::query_as::<_, SensorReadingEntity>(&format!(
            r#"
            INSERT INTO sensor_readings (device_id, temperature, humidity, door_status, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {READING_COLUMNS}
            "#
        ))
        .bind(reading.device_id)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.door_status.map(DoorStatusDb::from))
        .bind(reading.recorded_at)
        .fetch_one(&self.pool)
        .await;
        Ok(timer.finish(entity)?.into())
    }

    pub async fn between(
        &self,
        device_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, sqlx::Error> {
        let timer = QueryTimer::new("readings_between");
        let entities = sqlx::query_as::<_, SensorReadingEntity>(&format!(
            r#"
            SELECT {READING_COLUMNS} FROM sensor_readings
            WHERE device_id = $1 AND recorded_at BETWEEN $2 AND $3
            ORDER BY recorded_at ASC, id ASC
            "#
        ))
        .bind(device_id)
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await;
        Ok(timer
            .finish(entities)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Keyset page over `(recorded_at, id)` descending.
    pub async fn page(
        &self,
        device_id: i64,
        before: Option<KeysetCursor>,
        limit: i64,
    ) -> Result<Vec<SensorReading>, sqlx::Error> {
        let timer = QueryTimer::new("list_readings");
        let entities = sqlx::query_as::<_, SensorReadingEntity>(&format!(
            r#"
            SELECT {READING_COLUMNS} FROM sensor_readings
            WHERE device_id = $1
              AND ($2::timestamptz IS NULL OR (recorded_at, id) < ($2, $3))
            ORDER BY recorded_at DESC, id DESC
            LIMIT $4
            "#
        ))
        .bind(device_id)
        .bind(before.map(|c| c.at))
        .bind(before.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        Ok(timer
            .finish(entities)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[async_trait]
impl ReadingStore for ReadingRepository {
    async fn append_reading(&self, reading: NewReading) -> Result<SensorReading, StoreError> {
        self.insert(reading).await.map_err(store_error)
    }

    async fn readings_between(
        &self,
        device_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, StoreError> {
        self.between(device_id, since, until)
            .await
            .map_err(store_error)
    }

    async fn list_readings(
        &self,
        device_id: i64,
        before: Option<KeysetCursor>,
        limit: i64,
    ) -> Result<Vec<SensorReading>, StoreError> {
        self.page(device_id, before, limit)
            .await
            .map_err(store_error)
    }
}
