//! Collaborators assembled from configuration.

use chrono::{NaiveDate, Utc};
use log::{info, warn};
use std::path::PathBuf;

use crate::config::schema::{CacheKind, Config, PlanningConfig};
use crate::data::Dataset;
use crate::db::{default_database_path, Database};
use crate::error::{ConfigError, DataError, Result};
use crate::geocode::{
    CachePolicy, GeocodeCache, Geocoder, MemoryGeocodeCache, NominatimGeocoder,
    SqliteGeocodeCache,
};
use crate::itinerary::{CallPolicy, CancellationFlag, Collaborators};
use crate::navigation::{GoogleMapsUrlBuilder, NavigationUrlBuilder};
use crate::plan::{plan_week, WeekPlan, WeekPlanRequest};
use crate::travel::{StraightLineEstimator, TravelEstimator};

/// Owns the geocoder, cache, travel estimator and link builder used for
/// planning.
pub struct Planner {
    geocoder: Box<dyn Geocoder>,
    cache: Box<dyn GeocodeCache>,
    travel: Box<dyn TravelEstimator>,
    navigation: Box<dyn NavigationUrlBuilder>,
    policy: CallPolicy,
    planning: PlanningConfig,
}

impl Planner {
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = build_cache(config)?;
        let geocoder = NominatimGeocoder::new(&config.geocoding)?;

        Ok(Self {
            geocoder: Box::new(geocoder),
            cache,
            travel: Box::new(StraightLineEstimator::from_config(&config.travel)),
            navigation: Box::new(GoogleMapsUrlBuilder),
            policy: CallPolicy::from_config(&config.calls),
            planning: config.planning.clone(),
        })
    }

    /// Planner with caller-supplied collaborators and default settings.
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        cache: Box<dyn GeocodeCache>,
        travel: Box<dyn TravelEstimator>,
        navigation: Box<dyn NavigationUrlBuilder>,
    ) -> Self {
        Self {
            geocoder,
            cache,
            travel,
            navigation,
            policy: CallPolicy::default(),
            planning: PlanningConfig::default(),
        }
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_planning(mut self, planning: PlanningConfig) -> Self {
        self.planning = planning;
        self
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            geocoder: self.geocoder.as_ref(),
            cache: self.cache.as_ref(),
            travel: self.travel.as_ref(),
            navigation: self.navigation.as_ref(),
            policy: self.policy.clone(),
        }
    }

    /// Plans the week containing `week_of` for one employee of the dataset.
    pub async fn plan_week(
        &self,
        dataset: &Dataset,
        employee_id: &str,
        week_of: NaiveDate,
        cancel: &CancellationFlag,
    ) -> Result<WeekPlan> {
        let employee = dataset
            .employee(employee_id)
            .ok_or_else(|| DataError::InvalidRecord {
                kind: "employee",
                id: employee_id.to_string(),
                reason: "not found in dataset".to_string(),
            })?;

        let request = WeekPlanRequest {
            employee,
            week_of,
            week_start: self.planning.week_start,
            jobs: &dataset.jobs,
            templates: &dataset.templates,
            profiles: &dataset.profiles,
            origin_label: &self.planning.origin_label,
        };

        Ok(plan_week(&request, &self.collaborators(), cancel).await)
    }
}

fn build_cache(config: &Config) -> Result<Box<dyn GeocodeCache>> {
    let policy = CachePolicy::from_ttl_days(config.cache.ttl_days);

    match config.cache.kind {
        CacheKind::Memory => Ok(Box::new(MemoryGeocodeCache::new(
            config.cache.max_entries,
            policy,
        ))),
        CacheKind::Sqlite => {
            let path = match &config.cache.path {
                Some(path) => PathBuf::from(path),
                None => default_database_path().ok_or_else(|| ConfigError::Validation {
                    message: "cache.path is required when no home directory is available"
                        .to_string(),
                })?,
            };
            let db = Database::open(&path)?;
            let cache = SqliteGeocodeCache::new(db, policy);
            if let Err(e) = cache.purge_expired(Utc::now()) {
                warn!("Failed to purge expired geocode entries: {}", e);
            }
            info!("Using SQLite geocode cache at {}", path.display());
            Ok(Box::new(cache))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_with_sqlite_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cache.kind = CacheKind::Sqlite;
        config.cache.path = Some(
            dir.path()
                .join("nested/geocode.db")
                .to_string_lossy()
                .into_owned(),
        );
        config.calls.max_retries = 0;

        let planner = Planner::from_config(&config).unwrap();
        assert_eq!(planner.collaborators().policy.max_retries, 0);
        assert!(dir.path().join("nested/geocode.db").exists());
    }

    #[tokio::test]
    async fn test_unknown_employee_is_an_error() {
        let planner = Planner::from_config(&Config::default()).unwrap();
        let result = planner
            .plan_week(
                &Dataset::default(),
                "E404",
                NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                &CancellationFlag::new(),
            )
            .await;
        assert!(result.is_err());
    }
}
