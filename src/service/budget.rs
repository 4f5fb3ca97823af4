use crate::db::Repository;
use crate::domain::budget::validate_daily_budget;
use crate::domain::Budget;
use std::sync::Arc;
use tracing::info;

use super::ServiceError;

/// Per-user daily budgets; at most one per user id.
#[derive(Clone)]
pub struct BudgetService {
    repo: Arc<Repository>,
}

impl BudgetService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<Budget>, ServiceError> {
        Ok(self.repo.get_budget_by_user(user_id).await?)
    }

    /// Create the user's budget, or overwrite the daily value of the existing one.
    pub async fn set_user_budget(
        &self,
        user_id: &str,
        daily_budget_kwh: f64,
    ) -> Result<Budget, ServiceError> {
        validate_user_id(user_id)?;
        validate_daily_budget(daily_budget_kwh).map_err(ServiceError::Validation)?;

        let budget = self.repo.upsert_budget(user_id, daily_budget_kwh).await?;
        info!(user_id, id = budget.id, daily_budget_kwh, "Budget set");
        Ok(budget)
    }

    /// Replace user id and daily value of an existing budget.
    pub async fn update(
        &self,
        id: i64,
        user_id: &str,
        daily_budget_kwh: f64,
    ) -> Result<Option<Budget>, ServiceError> {
        validate_user_id(user_id)?;
        validate_daily_budget(daily_budget_kwh).map_err(ServiceError::Validation)?;
        Ok(self.repo.replace_budget(id, user_id, daily_budget_kwh).await?)
    }

    /// Delete a budget. Absent ids are ignored.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if self.repo.delete_budget(id).await? {
            info!(id, "Budget deleted");
        }
        Ok(())
    }
}

fn validate_user_id(user_id: &str) -> Result<(), ServiceError> {
    if user_id.trim().is_empty() {
        return Err(ServiceError::Validation(
            "user id must not be empty".to_string(),
        ));
    }
    Ok(())
}
