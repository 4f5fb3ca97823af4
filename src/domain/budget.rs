//! Per-user daily energy budgets.

/// A user's daily consumption ceiling. Informational only; nothing enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: i64,
    /// Unique across budgets.
    pub user_id: String,
    pub daily_budget_kwh: f64,
}

pub fn validate_daily_budget(kwh: f64) -> Result<(), String> {
    if !kwh.is_finite() || kwh < 0.0 {
        return Err(format!("daily budget must be a finite value >= 0, got {}", kwh));
    }
    Ok(())
}
