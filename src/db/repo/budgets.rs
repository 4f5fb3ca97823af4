//! Budget operations for the repository.

use crate::domain::Budget;

use super::{budget_from_row, Repository};

impl Repository {
    /// Fetch the budget of a user.
    ///
    /// Returns None if the user has no budget.
    pub async fn get_budget_by_user(&self, user_id: &str) -> Result<Option<Budget>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, daily_budget_kwh
            FROM budgets
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(budget_from_row))
    }

    /// Create the user's budget or overwrite its daily value if one exists.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_budget(
        &self,
        user_id: &str,
        daily_budget_kwh: f64,
    ) -> Result<Budget, sqlx::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO budgets (user_id, daily_budget_kwh)
            VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET daily_budget_kwh = excluded.daily_budget_kwh
            RETURNING id, user_id, daily_budget_kwh
            "#,
        )
        .bind(user_id)
        .bind(daily_budget_kwh)
        .fetch_one(&self.pool)
        .await?;

        Ok(budget_from_row(&row))
    }

    /// Replace every field of an existing budget.
    ///
    /// Returns None if no budget has this id. Moving the budget to a user who
    /// already has one fails with a unique-constraint violation.
    pub async fn replace_budget(
        &self,
        id: i64,
        user_id: &str,
        daily_budget_kwh: f64,
    ) -> Result<Option<Budget>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET user_id = ?, daily_budget_kwh = ?
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .bind(daily_budget_kwh)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Budget {
            id,
            user_id: user_id.to_string(),
            daily_budget_kwh,
        }))
    }

    /// Delete a budget by id.
    ///
    /// Returns whether a row was removed.
    pub async fn delete_budget(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
