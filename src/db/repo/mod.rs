//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by table:
//! - `appliances.rs` - Appliance CRUD, power updates, and default seeding
//! - `budgets.rs` - Budget lookup, upsert, and replacement
//! - `energy_entries.rs` - Entry history, range queries, sums, and retention

mod appliances;
mod budgets;
mod energy_entries;

use crate::domain::energy::from_ms;
use crate::domain::{Appliance, Budget, EnergyEntry};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Round-trip a trivial query to confirm the pool can serve requests.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn appliance_from_row(row: &SqliteRow) -> Appliance {
    Appliance {
        id: row.get("id"),
        name: row.get("name"),
        icon: row.get("icon"),
        current_power_kw: row.get("current_power_kw"),
    }
}

fn entry_from_row(row: &SqliteRow) -> EnergyEntry {
    EnergyEntry {
        id: row.get("id"),
        appliance_id: row.get("appliance_id"),
        timestamp: from_ms(row.get::<i64, _>("timestamp_ms")),
        energy_kwh: row.get("energy_kwh"),
    }
}

fn budget_from_row(row: &SqliteRow) -> Budget {
    Budget {
        id: row.get("id"),
        user_id: row.get("user_id"),
        daily_budget_kwh: row.get("daily_budget_kwh"),
    }
}
