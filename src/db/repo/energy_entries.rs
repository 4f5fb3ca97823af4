//! Energy entry history, aggregation, and retention for the repository.

use crate::domain::{EnergyEntry, NewEnergyEntry};
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::{entry_from_row, Repository};

impl Repository {
    /// Query all entries of an appliance, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_entries(&self, appliance_id: i64) -> Result<Vec<EnergyEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, appliance_id, timestamp_ms, energy_kwh
            FROM energy_entries
            WHERE appliance_id = ?
            ORDER BY timestamp_ms ASC, id ASC
            "#,
        )
        .bind(appliance_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    /// Query entries of an appliance with `start <= timestamp <= end`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_entries_in_range(
        &self,
        appliance_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EnergyEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, appliance_id, timestamp_ms, energy_kwh
            FROM energy_entries
            WHERE appliance_id = ? AND timestamp_ms >= ? AND timestamp_ms <= ?
            ORDER BY timestamp_ms ASC, id ASC
            "#,
        )
        .bind(appliance_id)
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    /// Query every entry, ordered by appliance then time.
    ///
    /// Used to attach histories when listing all appliances in one pass.
    pub async fn query_all_entries(&self) -> Result<Vec<EnergyEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, appliance_id, timestamp_ms, energy_kwh
            FROM energy_entries
            ORDER BY appliance_id ASC, timestamp_ms ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    /// Insert an entry for an appliance, guarded by the appliance's existence.
    ///
    /// Returns None, writing nothing, if the appliance does not exist.
    pub async fn insert_entry(
        &self,
        appliance_id: i64,
        entry: &NewEnergyEntry,
    ) -> Result<Option<EnergyEntry>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO energy_entries (appliance_id, timestamp_ms, energy_kwh)
            SELECT id, ?, ?
            FROM appliances
            WHERE id = ?
            "#,
        )
        .bind(entry.timestamp.timestamp_millis())
        .bind(entry.energy_kwh)
        .bind(appliance_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(EnergyEntry {
            id: result.last_insert_rowid(),
            appliance_id,
            timestamp: entry.timestamp,
            energy_kwh: entry.energy_kwh,
        }))
    }

    /// Sum energy across all appliances with `start <= timestamp <= end`.
    ///
    /// Returns 0.0 when no entries fall in the window.
    pub async fn sum_energy_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(energy_kwh), 0.0) AS total
            FROM energy_entries
            WHERE timestamp_ms >= ? AND timestamp_ms <= ?
            "#,
        )
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<f64, _>("total"))
    }

    /// Delete every entry strictly older than `cutoff`.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_entries_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM energy_entries WHERE timestamp_ms < ?")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
