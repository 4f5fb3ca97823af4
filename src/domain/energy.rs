//! Energy entries and usage aggregation.

use chrono::{DateTime, Duration, Utc};

/// Interval each power reading is assumed to cover, in hours (15 minutes).
pub const READING_INTERVAL_HOURS: f64 = 0.25;

/// Energy consumed over one reading interval at a constant power draw.
pub fn energy_for_interval(power_kw: f64) -> f64 {
    power_kw * READING_INTERVAL_HOURS
}

/// Trailing window summed by the usage report.
pub fn usage_window() -> Duration {
    Duration::hours(24)
}

/// A timestamped record of energy consumed by one appliance.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyEntry {
    pub id: i64,
    pub appliance_id: i64,
    pub timestamp: DateTime<Utc>,
    pub energy_kwh: f64,
}

/// An entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnergyEntry {
    pub timestamp: DateTime<Utc>,
    pub energy_kwh: f64,
}

impl NewEnergyEntry {
    pub fn validate(&self) -> Result<(), String> {
        if !self.energy_kwh.is_finite() || self.energy_kwh < 0.0 {
            return Err(format!(
                "energy must be a finite value >= 0, got {}",
                self.energy_kwh
            ));
        }
        Ok(())
    }
}

/// Total consumption over the trailing usage window.
///
/// `total_kwh` covers every appliance: appliances carry no owner, so
/// `user_id` only selects the budget shown alongside the total.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub user_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_kwh: f64,
    pub daily_budget_kwh: Option<f64>,
    pub remaining_kwh: Option<f64>,
}

/// Current time truncated to the millisecond precision stored in the database.
pub fn now_ms() -> DateTime<Utc> {
    from_ms(Utc::now().timestamp_millis())
}

/// Convert stored milliseconds back into a timestamp, clamping out-of-range values.
pub fn from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_else(|| {
        tracing::warn!(ms, "timestamp out of range, using epoch");
        DateTime::<Utc>::default()
    })
}
