pub mod appliances;
pub mod budgets;
pub mod energy;
pub mod health;

use crate::config::Config;
use crate::db::Repository;
use crate::service::{ApplianceService, BudgetService, EnergyService};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub appliances: Arc<ApplianceService>,
    pub budgets: Arc<BudgetService>,
    pub energy: Arc<EnergyService>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: &Config) -> Self {
        Self {
            appliances: Arc::new(ApplianceService::new(repo.clone(), config.simulation_seed)),
            budgets: Arc::new(BudgetService::new(repo.clone())),
            energy: Arc::new(EnergyService::new(repo.clone(), config.retention_days)),
            repo,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // `/budgets/:id` carries a user id for GET/POST and a budget id for PUT/DELETE.
    let api = Router::new()
        .route(
            "/appliances",
            get(appliances::list_appliances).post(appliances::create_appliance),
        )
        .route("/appliances/simulate", post(appliances::simulate))
        .route("/appliances/initialize", post(appliances::initialize_defaults))
        .route(
            "/appliances/:id",
            get(appliances::get_appliance)
                .put(appliances::update_appliance)
                .delete(appliances::delete_appliance),
        )
        .route("/appliances/:id/power", put(appliances::update_power))
        .route(
            "/budgets/:id",
            get(budgets::get_budget)
                .post(budgets::set_user_budget)
                .put(budgets::update_budget)
                .delete(budgets::delete_budget),
        )
        .route("/energy/appliance/:id/history", get(energy::get_history))
        .route(
            "/energy/appliance/:id/history/range",
            get(energy::get_history_range),
        )
        .route("/energy/appliance/:id/entry", post(energy::add_entry))
        .route("/energy/usage/:user_id", get(energy::get_usage))
        .route("/energy/cleanup", post(energy::cleanup));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
