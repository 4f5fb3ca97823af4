//! Domain types for the energy monitor.
//!
//! - Appliances and the simulated power fluctuation
//! - Energy entries, the fixed reading interval, and usage summaries
//! - Per-user daily budgets

pub mod appliance;
pub mod budget;
pub mod energy;

pub use appliance::{Appliance, DefaultAppliance, NewAppliance, DEFAULT_APPLIANCES};
pub use budget::Budget;
pub use energy::{EnergyEntry, NewEnergyEntry, UsageSummary};
