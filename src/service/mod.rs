//! Domain services between the HTTP layer and the repository.
//!
//! Each service owns an `Arc<Repository>` passed in at construction; the
//! services are bundled into [`crate::api::AppState`] by `main`.

pub mod appliance;
pub mod budget;
pub mod energy;

pub use appliance::ApplianceService;
pub use budget::BudgetService;
pub use energy::EnergyService;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
