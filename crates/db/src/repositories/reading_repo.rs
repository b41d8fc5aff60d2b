//! Repository for the `readings` table (append-only time-series).

use guardian_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::reading::{CreateReading, Reading};

/// Column list for `readings` SELECT queries.
const COLUMNS: &str = "id, device_id, temp_c, recorded_at, received_at";

/// Provides append and windowed query operations for readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Append a reading, returning the generated ID.
    pub async fn insert(pool: &PgPool, reading: &CreateReading) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO readings (device_id, temp_c, recorded_at, received_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(reading.device_id)
        .bind(reading.temp_c)
        .bind(reading.recorded_at)
        .bind(reading.received_at)
        .fetch_one(pool)
        .await
    }

    /// All readings for a device recorded at or after `since`, oldest first.
    pub async fn list_since(
        pool: &PgPool,
        device_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM readings \
             WHERE device_id = $1 AND recorded_at >= $2 \
             ORDER BY recorded_at ASC, id ASC"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(device_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// The newest `limit` readings recorded at or after `since`, returned
    /// oldest first.
    pub async fn list_recent_since(
        pool: &PgPool,
        device_id: DbId,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM (\
                SELECT {COLUMNS} FROM readings \
                WHERE device_id = $1 AND recorded_at >= $2 \
                ORDER BY recorded_at DESC, id DESC \
                LIMIT $3\
             ) recent \
             ORDER BY recorded_at ASC, id ASC"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(device_id)
            .bind(since)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete readings recorded before the cutoff.
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM readings WHERE recorded_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
