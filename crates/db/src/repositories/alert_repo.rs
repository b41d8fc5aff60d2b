//! Repository for the `alerts` table.
//!
//! Bulk operations are single statements, so each one sees a consistent
//! snapshot: an alert inserted concurrently is either fully part of the
//! returned count or untouched.

use guardian_core::alert::NewAlert;
use guardian_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::{Alert, AlertFilter};

/// Column list for `alerts` queries.
const COLUMNS: &str = "\
    id, device_id, rule_id, temp_c, alert_type, message, \
    triggered_at, is_acknowledged, acknowledged_at";

/// Provides append, acknowledge and purge operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Persist an alert produced by the rule engine, returning the new ID.
    pub async fn insert(pool: &PgPool, alert: &NewAlert) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO alerts (device_id, rule_id, temp_c, alert_type, message, triggered_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(alert.device_id)
        .bind(alert.rule_id)
        .bind(alert.temp_c)
        .bind(alert.alert_type.as_str())
        .bind(&alert.message)
        .bind(alert.triggered_at)
        .fetch_one(pool)
        .await
    }

    /// Get a single alert by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List alerts newest first.
    pub async fn list(pool: &PgPool, filter: &AlertFilter) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE ($1 = false OR is_acknowledged = false) \
               AND ($2::BIGINT IS NULL OR device_id = $2) \
             ORDER BY triggered_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(filter.unacknowledged_only)
            .bind(filter.device_id)
            .bind(filter.limit)
            .fetch_all(pool)
            .await
    }

    /// Acknowledge an alert.
    ///
    /// Idempotent: an alert that is already acknowledged keeps its original
    /// `acknowledged_at`. Returns `None` if no alert has this ID.
    pub async fn acknowledge(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts \
             SET is_acknowledged = true, \
                 acknowledged_at = COALESCE(acknowledged_at, NOW()) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Acknowledge every unacknowledged alert, optionally only for one device.
    ///
    /// Returns the number of alerts that changed state.
    pub async fn acknowledge_all(
        pool: &PgPool,
        device_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE alerts \
             SET is_acknowledged = true, acknowledged_at = NOW() \
             WHERE is_acknowledged = false \
               AND ($1::BIGINT IS NULL OR device_id = $1)",
        )
        .bind(device_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete all acknowledged alerts. Returns the number deleted.
    pub async fn clear_acknowledged(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alerts WHERE is_acknowledged = true")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every alert regardless of state. Returns the number deleted.
    pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alerts").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
