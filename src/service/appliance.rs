use crate::db::Repository;
use crate::domain::appliance::{fluctuate, validate_power, FLUCTUATION_RANGE};
use crate::domain::energy::{energy_for_interval, now_ms};
use crate::domain::{Appliance, EnergyEntry, NewAppliance, NewEnergyEntry, DEFAULT_APPLIANCES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::ServiceError;

/// Appliance with its energy history, oldest entry first.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceWithHistory {
    pub appliance: Appliance,
    pub history: Vec<EnergyEntry>,
}

/// Appliance CRUD, power updates, simulation, and default seeding.
pub struct ApplianceService {
    repo: Arc<Repository>,
    rng: Mutex<StdRng>,
}

impl ApplianceService {
    /// Create the service; `seed` fixes the RNG, otherwise it is seeded from entropy.
    pub fn new(repo: Arc<Repository>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            repo,
            rng: Mutex::new(rng),
        }
    }

    #[cfg(test)]
    async fn list(&self) -> Result<Vec<Appliance>, ServiceError> {
        Ok(self.repo.list_appliances().await?)
    }

    /// List every appliance with its history attached.
    pub async fn list_with_history(&self) -> Result<Vec<ApplianceWithHistory>, ServiceError> {
        let appliances = self.repo.list_appliances().await?;
        let mut by_appliance: HashMap<i64, Vec<EnergyEntry>> = HashMap::new();
        for entry in self.repo.query_all_entries().await? {
            by_appliance.entry(entry.appliance_id).or_default().push(entry);
        }

        Ok(appliances
            .into_iter()
            .map(|appliance| {
                let history = by_appliance.remove(&appliance.id).unwrap_or_default();
                ApplianceWithHistory { appliance, history }
            })
            .collect())
    }

    pub async fn get_with_history(
        &self,
        id: i64,
    ) -> Result<Option<ApplianceWithHistory>, ServiceError> {
        let Some(appliance) = self.repo.get_appliance(id).await? else {
            return Ok(None);
        };
        let history = self.repo.query_entries(id).await?;
        Ok(Some(ApplianceWithHistory { appliance, history }))
    }

    pub async fn create(&self, new: NewAppliance) -> Result<Appliance, ServiceError> {
        new.validate().map_err(ServiceError::Validation)?;
        let appliance = self.repo.insert_appliance(&new).await?;
        info!(id = appliance.id, name = %appliance.name, "Appliance created");
        Ok(appliance)
    }

    /// Replace name, icon, and power of an existing appliance. No entry is logged.
    pub async fn update(
        &self,
        id: i64,
        fields: NewAppliance,
    ) -> Result<Option<Appliance>, ServiceError> {
        fields.validate().map_err(ServiceError::Validation)?;
        Ok(self.repo.replace_appliance(id, &fields).await?)
    }

    /// Delete an appliance and its history. Absent ids are ignored.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if self.repo.delete_appliance(id).await? {
            info!(id, "Appliance deleted");
        }
        Ok(())
    }

    /// Set a new power draw and log the energy of one reading interval at that power.
    ///
    /// Returns the logged entry, or None (nothing written) if the appliance is absent.
    pub async fn update_power(
        &self,
        id: i64,
        power_kw: f64,
    ) -> Result<Option<EnergyEntry>, ServiceError> {
        validate_power(power_kw).map_err(ServiceError::Validation)?;
        self.log_power(id, power_kw).await
    }

    async fn log_power(
        &self,
        id: i64,
        power_kw: f64,
    ) -> Result<Option<EnergyEntry>, ServiceError> {
        let entry = NewEnergyEntry {
            timestamp: now_ms(),
            energy_kwh: energy_for_interval(power_kw),
        };
        let logged = self.repo.set_power_and_log(id, power_kw, &entry).await?;

        match &logged {
            Some(e) => debug!(id, power_kw, energy_kwh = e.energy_kwh, "Appliance power updated"),
            None => debug!(id, "Power update skipped: appliance not found"),
        }
        Ok(logged)
    }

    /// Randomly fluctuate every appliance's power and log each new reading.
    ///
    /// Fluctuated values are always within the accepted power range, so rows
    /// stored before the ceiling existed are pulled back inside it rather
    /// than failing the run. Returns the number of appliances updated.
    pub async fn simulate(&self) -> Result<usize, ServiceError> {
        let appliances = self.repo.list_appliances().await?;
        let mut updated = 0;

        for appliance in appliances {
            let factor = self.fluctuation_factor();
            let new_power = fluctuate(appliance.current_power_kw, factor);
            if self.log_power(appliance.id, new_power).await?.is_some() {
                updated += 1;
            }
        }

        info!(updated, "Simulated power fluctuation");
        Ok(updated)
    }

    /// Seed the default appliances if none exist.
    ///
    /// Returns the number created; 0 when appliances already exist.
    pub async fn initialize_defaults(&self) -> Result<usize, ServiceError> {
        let defaults: Vec<NewAppliance> = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            DEFAULT_APPLIANCES
                .iter()
                .map(|d| NewAppliance::new(d.name, d.icon, rng.gen_range(d.min_kw..d.max_kw)))
                .collect()
        };

        let created = self.repo.seed_appliances_if_empty(&defaults).await?;
        if created > 0 {
            info!(created, "Seeded default appliances");
        } else {
            debug!("Appliances already present, skipping default seeding");
        }
        Ok(created)
    }

    fn fluctuation_factor(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(FLUCTUATION_RANGE)
    }
}
