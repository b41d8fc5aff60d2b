//! Repository for the `alert_rules` table.

use guardian_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert_rule::{AlertRule, CreateAlertRule};

/// Column list for `alert_rules` queries.
const COLUMNS: &str = "id, device_id, temp_min, temp_max, is_active, created_at";

/// Provides CRUD operations for alert rules.
pub struct AlertRuleRepo;

impl AlertRuleRepo {
    /// List every rule for a device, active or not.
    pub async fn list_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Vec<AlertRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules WHERE device_id = $1 ORDER BY id");
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }

    /// List the rules the engine evaluates for a device.
    pub async fn list_active_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Vec<AlertRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_rules \
             WHERE device_id = $1 AND is_active = true \
             ORDER BY id"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }

    /// Create a rule. The `ck_alert_rules_bounds` constraint rejects
    /// `temp_min >= temp_max`.
    pub async fn create(
        pool: &PgPool,
        device_id: DbId,
        dto: &CreateAlertRule,
    ) -> Result<AlertRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO alert_rules (device_id, temp_min, temp_max) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(device_id)
            .bind(dto.temp_min)
            .bind(dto.temp_max)
            .fetch_one(pool)
            .await
    }

    /// Delete a rule owned by `device_id`. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, device_id: DbId, rule_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alert_rules WHERE id = $1 AND device_id = $2")
            .bind(rule_id)
            .bind(device_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
