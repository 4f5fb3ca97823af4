pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod service;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{Appliance, Budget, EnergyEntry, NewAppliance, NewEnergyEntry, UsageSummary};
pub use error::AppError;
pub use service::{ApplianceService, BudgetService, EnergyService, ServiceError};
