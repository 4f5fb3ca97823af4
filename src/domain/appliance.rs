//! Appliances and the power arithmetic applied to them.

/// Lower bound for simulated power draw, in kW.
pub const MIN_SIMULATED_POWER_KW: f64 = 0.05;

/// Largest power draw accepted or produced, in kW.
pub const MAX_POWER_KW: f64 = 10_000.0;

/// Half-open range `[low, high)` of the simulated fluctuation factor.
pub const FLUCTUATION_RANGE: std::ops::Range<f64> = 0.5..1.5;

/// A monitored device and its current power draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Appliance {
    pub id: i64,
    pub name: String,
    /// Icon tag understood by the frontend (e.g. `"tv"`, `"fan"`).
    pub icon: String,
    pub current_power_kw: f64,
}

/// Fields of an appliance before it has an id; also used for full replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppliance {
    pub name: String,
    pub icon: String,
    pub current_power_kw: f64,
}

impl NewAppliance {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, current_power_kw: f64) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            current_power_kw,
        }
    }

    /// Check the invariants a stored appliance must hold.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        validate_power(self.current_power_kw)
    }
}

pub fn validate_power(power_kw: f64) -> Result<(), String> {
    if !(0.0..=MAX_POWER_KW).contains(&power_kw) {
        return Err(format!(
            "power must be between 0 and {} kW, got {}",
            MAX_POWER_KW, power_kw
        ));
    }
    Ok(())
}

/// Apply a fluctuation factor to a power reading.
///
/// The result is floored at [`MIN_SIMULATED_POWER_KW`] and capped at
/// [`MAX_POWER_KW`], so it always passes [`validate_power`].
pub fn fluctuate(power_kw: f64, factor: f64) -> f64 {
    let scaled = power_kw * factor;
    if scaled.is_nan() {
        return MIN_SIMULATED_POWER_KW;
    }
    scaled.clamp(MIN_SIMULATED_POWER_KW, MAX_POWER_KW)
}

/// A default appliance seeded into an empty store, with its power range in kW.
#[derive(Debug, Clone, Copy)]
pub struct DefaultAppliance {
    pub name: &'static str,
    pub icon: &'static str,
    pub min_kw: f64,
    pub max_kw: f64,
}

pub const DEFAULT_APPLIANCES: [DefaultAppliance; 6] = [
    DefaultAppliance {
        name: "Refrigerator",
        icon: "refrigerator",
        min_kw: 0.1,
        max_kw: 0.5,
    },
    DefaultAppliance {
        name: "Television",
        icon: "tv",
        min_kw: 0.05,
        max_kw: 0.3,
    },
    DefaultAppliance {
        name: "Heater",
        icon: "flame",
        min_kw: 0.5,
        max_kw: 1.5,
    },
    DefaultAppliance {
        name: "Washing Machine",
        icon: "washing-machine",
        min_kw: 0.4,
        max_kw: 1.2,
    },
    DefaultAppliance {
        name: "Dishwasher",
        icon: "utensils",
        min_kw: 0.3,
        max_kw: 1.0,
    },
    DefaultAppliance {
        name: "Air Conditioner",
        icon: "fan",
        min_kw: 0.8,
        max_kw: 2.0,
    },
];
