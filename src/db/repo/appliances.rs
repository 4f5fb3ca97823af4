//! Appliance operations for the repository.

use crate::domain::{Appliance, EnergyEntry, NewAppliance, NewEnergyEntry};

use super::{appliance_from_row, Repository};

impl Repository {
    /// List all appliances ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_appliances(&self) -> Result<Vec<Appliance>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, icon, current_power_kw
            FROM appliances
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(appliance_from_row).collect())
    }

    /// Fetch one appliance by id.
    ///
    /// Returns None if the appliance does not exist.
    pub async fn get_appliance(&self, id: i64) -> Result<Option<Appliance>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, icon, current_power_kw
            FROM appliances
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(appliance_from_row))
    }

    /// Insert a new appliance and return it with its assigned id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_appliance(&self, new: &NewAppliance) -> Result<Appliance, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO appliances (name, icon, current_power_kw)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.icon)
        .bind(new.current_power_kw)
        .execute(&self.pool)
        .await?;

        Ok(Appliance {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            icon: new.icon.clone(),
            current_power_kw: new.current_power_kw,
        })
    }

    /// Replace every field of an existing appliance.
    ///
    /// Returns None if no appliance has this id.
    pub async fn replace_appliance(
        &self,
        id: i64,
        fields: &NewAppliance,
    ) -> Result<Option<Appliance>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE appliances
            SET name = ?, icon = ?, current_power_kw = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.icon)
        .bind(fields.current_power_kw)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Appliance {
            id,
            name: fields.name.clone(),
            icon: fields.icon.clone(),
            current_power_kw: fields.current_power_kw,
        }))
    }

    /// Delete an appliance; its energy entries cascade.
    ///
    /// Returns whether a row was removed.
    pub async fn delete_appliance(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appliances WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set an appliance's power and append the matching energy entry in one transaction.
    ///
    /// Returns None, writing nothing, if the appliance does not exist.
    pub async fn set_power_and_log(
        &self,
        id: i64,
        power_kw: f64,
        entry: &NewEnergyEntry,
    ) -> Result<Option<EnergyEntry>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE appliances SET current_power_kw = ? WHERE id = ?")
            .bind(power_kw)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO energy_entries (appliance_id, timestamp_ms, energy_kwh)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(entry.timestamp.timestamp_millis())
        .bind(entry.energy_kwh)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(EnergyEntry {
            id: inserted.last_insert_rowid(),
            appliance_id: id,
            timestamp: entry.timestamp,
            energy_kwh: entry.energy_kwh,
        }))
    }

    /// Insert the given appliances only if the table is empty.
    ///
    /// The emptiness check and the inserts share a transaction. Returns the
    /// number of appliances inserted (0 when the table already had rows).
    pub async fn seed_appliances_if_empty(
        &self,
        appliances: &[NewAppliance],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM appliances")
            .fetch_one(&mut *tx)
            .await?;

        if existing > 0 {
            tx.rollback().await?;
            return Ok(0);
        }

        for appliance in appliances {
            sqlx::query(
                r#"
                INSERT INTO appliances (name, icon, current_power_kw)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&appliance.name)
            .bind(&appliance.icon)
            .bind(appliance.current_power_kw)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(appliances.len())
    }
}
