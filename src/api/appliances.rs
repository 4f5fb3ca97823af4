use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::energy::EnergyEntryDto;
use crate::api::AppState;
use crate::domain::{Appliance, NewAppliance};
use crate::error::AppError;
use crate::service::appliance::ApplianceWithHistory;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceRequest {
    pub name: String,
    pub icon: String,
    pub current_power_kw: f64,
}

impl From<ApplianceRequest> for NewAppliance {
    fn from(req: ApplianceRequest) -> Self {
        NewAppliance::new(req.name, req.icon, req.current_power_kw)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceDto {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub current_power_kw: f64,
    pub history: Vec<EnergyEntryDto>,
}

impl ApplianceDto {
    fn without_history(a: Appliance) -> Self {
        Self {
            id: a.id,
            name: a.name,
            icon: a.icon,
            current_power_kw: a.current_power_kw,
            history: Vec::new(),
        }
    }
}

impl From<ApplianceWithHistory> for ApplianceDto {
    fn from(a: ApplianceWithHistory) -> Self {
        let mut dto = Self::without_history(a.appliance);
        dto.history = a.history.into_iter().map(EnergyEntryDto::from).collect();
        dto
    }
}

#[derive(Debug, Deserialize)]
pub struct PowerQuery {
    pub power: f64,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub updated: usize,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub created: usize,
}

pub async fn list_appliances(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplianceDto>>, AppError> {
    let appliances = state.appliances.list_with_history().await?;
    Ok(Json(appliances.into_iter().map(ApplianceDto::from).collect()))
}

pub async fn get_appliance(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApplianceDto>, AppError> {
    state
        .appliances
        .get_with_history(id)
        .await?
        .map(|a| Json(ApplianceDto::from(a)))
        .ok_or_else(|| appliance_not_found(id))
}

pub async fn create_appliance(
    State(state): State<AppState>,
    Json(req): Json<ApplianceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let appliance = state.appliances.create(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplianceDto::without_history(appliance)),
    ))
}

pub async fn update_appliance(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<ApplianceRequest>,
) -> Result<Json<ApplianceDto>, AppError> {
    state
        .appliances
        .update(id, req.into())
        .await?
        .ok_or_else(|| appliance_not_found(id))?;

    // History is untouched by a replace; return the stored view.
    state
        .appliances
        .get_with_history(id)
        .await?
        .map(|a| Json(ApplianceDto::from(a)))
        .ok_or_else(|| appliance_not_found(id))
}

pub async fn delete_appliance(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.appliances.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_power(
    Path(id): Path<i64>,
    Query(params): Query<PowerQuery>,
    State(state): State<AppState>,
) -> Result<Json<EnergyEntryDto>, AppError> {
    state
        .appliances
        .update_power(id, params.power)
        .await?
        .map(|entry| Json(EnergyEntryDto::from(entry)))
        .ok_or_else(|| appliance_not_found(id))
}

pub async fn simulate(State(state): State<AppState>) -> Result<Json<SimulateResponse>, AppError> {
    let updated = state.appliances.simulate().await?;
    Ok(Json(SimulateResponse { updated }))
}

pub async fn initialize_defaults(
    State(state): State<AppState>,
) -> Result<Json<InitializeResponse>, AppError> {
    let created = state.appliances.initialize_defaults().await?;
    Ok(Json(InitializeResponse { created }))
}

fn appliance_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Appliance {} not found", id))
}
