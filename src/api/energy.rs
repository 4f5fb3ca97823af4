//! Energy history, entry submission, usage, and retention handlers.
//!
//! `GET /energy/usage/{userId}` answers with an object rather than a bare
//! number: `totalKwh` comes first, followed by the window bounds and, when
//! the user has one, the daily budget and what remains of it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::energy::now_ms;
use crate::domain::{EnergyEntry, NewEnergyEntry};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyEntryDto {
    pub id: i64,
    pub appliance_id: i64,
    pub timestamp: DateTime<Utc>,
    pub energy_kwh: f64,
}

impl From<EnergyEntry> for EnergyEntryDto {
    fn from(e: EnergyEntry) -> Self {
        Self {
            id: e.id,
            appliance_id: e.appliance_id,
            timestamp: e.timestamp,
            energy_kwh: e.energy_kwh,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    /// Defaults to the time of the request.
    pub timestamp: Option<String>,
    pub energy_kwh: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub total_kwh: f64,
    pub user_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_budget_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_kwh: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub deleted: u64,
}

pub async fn get_history(
    Path(appliance_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnergyEntryDto>>, AppError> {
    let history = state.energy.history(appliance_id).await?;
    Ok(Json(history.into_iter().map(EnergyEntryDto::from).collect()))
}

pub async fn get_history_range(
    Path(appliance_id): Path<i64>,
    Query(params): Query<RangeQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnergyEntryDto>>, AppError> {
    let start = parse_datetime("start", &params.start)?;
    let end = parse_datetime("end", &params.end)?;

    let history = state
        .energy
        .history_in_range(appliance_id, start, end)
        .await?;
    Ok(Json(history.into_iter().map(EnergyEntryDto::from).collect()))
}

pub async fn add_entry(
    Path(appliance_id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<EntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let timestamp = match req.timestamp.as_deref() {
        Some(ts) => parse_datetime("timestamp", ts)?,
        None => now_ms(),
    };

    let entry = state
        .energy
        .add_entry(
            appliance_id,
            NewEnergyEntry {
                timestamp,
                energy_kwh: req.energy_kwh,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appliance {} not found", appliance_id)))?;

    Ok((StatusCode::CREATED, Json(EnergyEntryDto::from(entry))))
}

pub async fn get_usage(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UsageResponse>, AppError> {
    let usage = state.energy.total_usage(&user_id).await?;
    Ok(Json(UsageResponse {
        total_kwh: usage.total_kwh,
        user_id: usage.user_id,
        from: usage.window_start,
        to: usage.window_end,
        daily_budget_kwh: usage.daily_budget_kwh,
        remaining_kwh: usage.remaining_kwh,
    }))
}

pub async fn cleanup(State(state): State<AppState>) -> Result<Json<CleanupResponse>, AppError> {
    let deleted = state.energy.cleanup().await?;
    Ok(Json(CleanupResponse { deleted }))
}

/// Parse an ISO-8601 date-time: RFC 3339 with an offset, or a local
/// date-time without one, which is taken as UTC. Truncated to milliseconds.
fn parse_datetime(field: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    // An unencoded '+' offset arrives as a space after query decoding.
    let value = raw.trim().replace(' ', "+");

    let parsed = DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M"))
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .map_err(|_| {
            AppError::BadRequest(format!(
                "{} must be an ISO-8601 date-time, got {:?}",
                field, raw
            ))
        })?;

    Utc.timestamp_millis_opt(parsed.timestamp_millis())
        .single()
        .ok_or_else(|| AppError::BadRequest(format!("{} is out of range", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_datetime("start", "2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_unencoded_plus_offset() {
        let dt = parse_datetime("start", "2024-05-01T12:00:00 02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_local_datetime_as_utc() {
        let dt = parse_datetime("end", "2024-05-01T10:00:00.250").unwrap();
        assert_eq!(dt.timestamp_millis() % 1000, 250);
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-05-01 10:00:00");

        let no_seconds = parse_datetime("end", "2024-05-01T10:00").unwrap();
        assert_eq!(no_seconds.timestamp(), dt.timestamp());
    }

    #[test]
    fn test_parse_truncates_to_millis() {
        let dt = parse_datetime("start", "2024-05-01T10:00:00.123456789Z").unwrap();
        assert_eq!(dt.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_usage_response_leads_with_total() {
        let now = now_ms();
        let body = serde_json::to_string(&UsageResponse {
            total_kwh: 1.5,
            user_id: "alice".to_string(),
            from: now,
            to: now,
            daily_budget_kwh: None,
            remaining_kwh: None,
        })
        .unwrap();
        assert!(body.starts_with("{\"totalKwh\":1.5,"), "{}", body);
        assert!(!body.contains("dailyBudgetKwh"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        match parse_datetime("start", "yesterday") {
            Err(AppError::BadRequest(msg)) => assert!(msg.starts_with("start")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }
}
