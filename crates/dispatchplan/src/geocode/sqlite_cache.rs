//! Geocode cache persisted in SQLite.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};

use crate::db::geocode_repo::{self, GeocodeRow};
use crate::db::Database;
use crate::error::CacheError;

use super::cache::{CachePolicy, CachedPoint, GeocodeCache};

pub struct SqliteGeocodeCache {
    db: Database,
    policy: CachePolicy,
}

impl SqliteGeocodeCache {
    pub fn new(db: Database, policy: CachePolicy) -> Self {
        Self { db, policy }
    }

    /// Removes entries older than the TTL. Returns the number removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let Some(cutoff) = self.policy.cutoff(now) else {
            return Ok(0);
        };
        let removed = geocode_repo::delete_older_than(&self.db, &format_timestamp(cutoff))?;
        if removed > 0 {
            info!("Purged {} expired geocode cache entries", removed);
        }
        Ok(removed)
    }

    pub fn len(&self) -> Result<u64, CacheError> {
        Ok(geocode_repo::count(&self.db)?)
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl GeocodeCache for SqliteGeocodeCache {
    fn get(&self, key: &str) -> Result<Option<CachedPoint>, CacheError> {
        let Some(row) = geocode_repo::find(&self.db, key)? else {
            return Ok(None);
        };

        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at)
            .map_err(|e| CacheError::CorruptEntry {
                key: key.to_string(),
                reason: format!("invalid updated_at '{}': {}", row.updated_at, e),
            })?
            .with_timezone(&Utc);

        let entry = CachedPoint {
            lat: row.lat,
            lng: row.lng,
            updated_at,
        };

        if self.policy.is_fresh(&entry, Utc::now()) {
            Ok(Some(entry))
        } else {
            debug!("Geocode cache entry is stale, ignoring");
            Ok(None)
        }
    }

    fn set(&self, key: &str, entry: CachedPoint) -> Result<(), CacheError> {
        geocode_repo::upsert(
            &self.db,
            &GeocodeRow {
                address_key: key.to_string(),
                lat: entry.lat,
                lng: entry.lng,
                updated_at: format_timestamp(entry.updated_at),
            },
        )?;
        Ok(())
    }
}
