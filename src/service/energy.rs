use crate::db::Repository;
use crate::domain::energy::{now_ms, usage_window};
use crate::domain::{EnergyEntry, NewEnergyEntry, UsageSummary};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::ServiceError;

/// Energy history, usage totals, and retention.
#[derive(Clone)]
pub struct EnergyService {
    repo: Arc<Repository>,
    /// None when the horizon is too large to represent; nothing is ever old enough then.
    retention: Option<TimeDelta>,
}

impl EnergyService {
    pub fn new(repo: Arc<Repository>, retention_days: i64) -> Self {
        Self {
            repo,
            retention: TimeDelta::try_days(retention_days),
        }
    }

    pub async fn history(&self, appliance_id: i64) -> Result<Vec<EnergyEntry>, ServiceError> {
        Ok(self.repo.query_entries(appliance_id).await?)
    }

    /// Entries with `start <= timestamp <= end`, oldest first.
    pub async fn history_in_range(
        &self,
        appliance_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EnergyEntry>, ServiceError> {
        if start > end {
            return Err(ServiceError::Validation(
                "start must be <= end".to_string(),
            ));
        }
        Ok(self
            .repo
            .query_entries_in_range(appliance_id, start, end)
            .await?)
    }

    /// Store an entry for an existing appliance.
    ///
    /// Returns None, writing nothing, if the appliance is absent.
    pub async fn add_entry(
        &self,
        appliance_id: i64,
        entry: NewEnergyEntry,
    ) -> Result<Option<EnergyEntry>, ServiceError> {
        entry.validate().map_err(ServiceError::Validation)?;
        let stored = self.repo.insert_entry(appliance_id, &entry).await?;
        if stored.is_none() {
            debug!(appliance_id, "Entry skipped: appliance not found");
        }
        Ok(stored)
    }

    /// Total energy over the trailing 24 hours.
    ///
    /// Appliances have no owner, so the total spans every appliance; `user_id`
    /// only selects the budget reported next to it.
    pub async fn total_usage(&self, user_id: &str) -> Result<UsageSummary, ServiceError> {
        let window_end = now_ms();
        let window_start = window_end - usage_window();

        let total_kwh = self
            .repo
            .sum_energy_between(window_start, window_end)
            .await?;
        let daily_budget_kwh = self
            .repo
            .get_budget_by_user(user_id)
            .await?
            .map(|b| b.daily_budget_kwh);

        debug!(user_id, total_kwh, "Computed trailing usage across all appliances");

        Ok(UsageSummary {
            user_id: user_id.to_string(),
            window_start,
            window_end,
            total_kwh,
            daily_budget_kwh,
            remaining_kwh: daily_budget_kwh.map(|budget| budget - total_kwh),
        })
    }

    /// Delete entries older than the retention horizon.
    ///
    /// Returns the number of deleted entries.
    pub async fn cleanup(&self) -> Result<u64, ServiceError> {
        let Some(cutoff) = self
            .retention
            .and_then(|retention| now_ms().checked_sub_signed(retention))
        else {
            debug!("Retention horizon predates representable time, nothing to purge");
            return Ok(0);
        };
        let deleted = self.repo.delete_entries_before(cutoff).await?;
        info!(deleted, cutoff = %cutoff, "Purged old energy entries");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::test_support::temp_repo;
    use crate::domain::NewAppliance;
    use chrono::Duration;

    async fn setup() -> (EnergyService, Arc<Repository>, i64, tempfile::TempDir) {
        let (repo, temp) = temp_repo().await;
        let repo = Arc::new(repo);
        let appliance = repo
            .insert_appliance(&NewAppliance::new("Heater", "flame", 1.0))
            .await
            .unwrap();
        (EnergyService::new(repo.clone(), 7), repo, appliance.id, temp)
    }

    fn at(timestamp: DateTime<Utc>, energy_kwh: f64) -> NewEnergyEntry {
        NewEnergyEntry {
            timestamp,
            energy_kwh,
        }
    }

    #[tokio::test]
    async fn test_add_entry_requires_appliance() {
        let (svc, _repo, id, _temp) = setup().await;

        assert!(svc.add_entry(id, at(now_ms(), 0.3)).await.unwrap().is_some());
        assert!(svc.add_entry(id + 100, at(now_ms(), 0.3)).await.unwrap().is_none());
        assert_eq!(svc.history(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_entry_rejects_negative_energy() {
        let (svc, _repo, id, _temp) = setup().await;
        let err = svc.add_entry(id, at(now_ms(), -0.1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_range_rejects_inverted_bounds() {
        let (svc, _repo, id, _temp) = setup().await;
        let now = now_ms();
        let err = svc
            .history_in_range(id, now, now - Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_total_usage_counts_only_trailing_day() {
        let (svc, repo, id, _temp) = setup().await;
        let other = repo
            .insert_appliance(&NewAppliance::new("Fan", "fan", 1.0))
            .await
            .unwrap();
        let now = now_ms();

        svc.add_entry(id, at(now - Duration::hours(1), 1.5)).await.unwrap();
        svc.add_entry(other.id, at(now - Duration::hours(23), 0.5)).await.unwrap();
        svc.add_entry(id, at(now - Duration::hours(25), 9.0)).await.unwrap();

        let usage = svc.total_usage("anyone").await.unwrap();
        assert!((usage.total_kwh - 2.0).abs() < 1e-12);
        assert_eq!(usage.daily_budget_kwh, None);
        assert_eq!(usage.remaining_kwh, None);
    }

    #[tokio::test]
    async fn test_total_usage_reports_budget() {
        let (svc, repo, id, _temp) = setup().await;
        repo.upsert_budget("u1", 5.0).await.unwrap();
        svc.add_entry(id, at(now_ms() - Duration::minutes(5), 1.25))
            .await
            .unwrap();

        let usage = svc.total_usage("u1").await.unwrap();
        assert_eq!(usage.daily_budget_kwh, Some(5.0));
        assert_eq!(usage.remaining_kwh, Some(3.75));
    }

    #[tokio::test]
    async fn test_cleanup_removes_entries_past_retention() {
        let (svc, _repo, id, _temp) = setup().await;
        let now = now_ms();

        svc.add_entry(id, at(now - Duration::days(8), 1.0)).await.unwrap();
        svc.add_entry(id, at(now - Duration::days(7) - Duration::minutes(1), 1.0))
            .await
            .unwrap();
        svc.add_entry(id, at(now - Duration::days(6), 1.0)).await.unwrap();
        svc.add_entry(id, at(now, 1.0)).await.unwrap();

        assert_eq!(svc.cleanup().await.unwrap(), 2);

        let remaining = svc.history(id).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining
            .iter()
            .all(|e| e.timestamp >= now - Duration::days(7)));
    }

    #[tokio::test]
    async fn test_cleanup_with_huge_retention_keeps_everything() {
        let (repo, _temp) = temp_repo().await;
        let repo = Arc::new(repo);
        let appliance = repo
            .insert_appliance(&NewAppliance::new("Heater", "flame", 1.0))
            .await
            .unwrap();

        for days in [100_000_000, i64::MAX] {
            let svc = EnergyService::new(repo.clone(), days);
            svc.add_entry(appliance.id, at(now_ms() - Duration::days(400), 1.0))
                .await
                .unwrap();
            assert_eq!(svc.cleanup().await.unwrap(), 0);
        }

        assert_eq!(repo.query_entries(appliance.id).await.unwrap().len(), 2);
    }
}
