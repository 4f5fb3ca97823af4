use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::Budget;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SetBudgetQuery {
    pub budget: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    pub user_id: String,
    pub daily_budget_kwh: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDto {
    pub id: i64,
    pub user_id: String,
    pub daily_budget_kwh: f64,
}

impl From<Budget> for BudgetDto {
    fn from(b: Budget) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            daily_budget_kwh: b.daily_budget_kwh,
        }
    }
}

pub async fn get_budget(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BudgetDto>, AppError> {
    state
        .budgets
        .get_by_user(&user_id)
        .await?
        .map(|b| Json(BudgetDto::from(b)))
        .ok_or_else(|| AppError::NotFound(format!("No budget for user {}", user_id)))
}

pub async fn set_user_budget(
    Path(user_id): Path<String>,
    Query(params): Query<SetBudgetQuery>,
    State(state): State<AppState>,
) -> Result<Json<BudgetDto>, AppError> {
    let budget = state
        .budgets
        .set_user_budget(&user_id, params.budget)
        .await?;
    Ok(Json(budget.into()))
}

pub async fn update_budget(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<BudgetRequest>,
) -> Result<Json<BudgetDto>, AppError> {
    state
        .budgets
        .update(id, &req.user_id, req.daily_budget_kwh)
        .await?
        .map(|b| Json(BudgetDto::from(b)))
        .ok_or_else(|| AppError::NotFound(format!("Budget {} not found", id)))
}

pub async fn delete_budget(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.budgets.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
