//! Geocode cache abstraction with an explicit freshness policy.

use chrono::{DateTime, Duration, Utc};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::model::GeoPoint;

/// A cached geocoding result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPoint {
    pub lat: f64,
    pub lng: f64,
    pub updated_at: DateTime<Utc>,
}

impl CachedPoint {
    pub fn new(point: GeoPoint, updated_at: DateTime<Utc>) -> Self {
        Self {
            lat: point.latitude,
            lng: point.longitude,
            updated_at,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Longest supported TTL (about 100 years).
pub const MAX_TTL_DAYS: u32 = 36_500;

/// Decides whether a cached entry may still be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// `None` keeps entries forever.
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    pub fn from_ttl_days(days: u32) -> Self {
        Self {
            ttl: (days > 0).then(|| Duration::days(i64::from(days))),
        }
    }

    pub fn never_expire() -> Self {
        Self { ttl: None }
    }

    pub fn is_fresh(&self, entry: &CachedPoint, now: DateTime<Utc>) -> bool {
        match self.ttl {
            Some(ttl) => now.signed_duration_since(entry.updated_at) <= ttl,
            None => true,
        }
    }

    /// Entries last updated before this instant are stale.
    ///
    /// `None` when nothing expires, including a TTL reaching past the
    /// earliest representable time.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.ttl.and_then(|ttl| now.checked_sub_signed(ttl))
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_ttl_days(90)
    }
}

/// Key-value store of geocoded addresses keyed by [`cache_key`].
///
/// Implementations return only entries that are fresh under their policy.
pub trait GeocodeCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CachedPoint>, CacheError>;

    fn set(&self, key: &str, entry: CachedPoint) -> Result<(), CacheError>;
}

/// Cache key for an address: lowercased, trimmed, single-spaced.
pub fn cache_key(address: &str) -> String {
    address
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// In-process cache backed by `moka`.
#[derive(Clone)]
pub struct MemoryGeocodeCache {
    entries: Cache<String, CachedPoint>,
    policy: CachePolicy,
}

impl MemoryGeocodeCache {
    pub fn new(max_entries: u64, policy: CachePolicy) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);
        // Longer TTLs rely on the freshness check in `get` alone.
        let eviction_ttl = policy
            .ttl
            .filter(|ttl| *ttl <= Duration::days(i64::from(MAX_TTL_DAYS)))
            .and_then(|ttl| ttl.to_std().ok());
        if let Some(ttl) = eviction_ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            entries: builder.build(),
            policy,
        }
    }
}

impl Default for MemoryGeocodeCache {
    fn default() -> Self {
        Self::new(10_000, CachePolicy::default())
    }
}

impl GeocodeCache for MemoryGeocodeCache {
    fn get(&self, key: &str) -> Result<Option<CachedPoint>, CacheError> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if self.policy.is_fresh(&entry, Utc::now()) {
            Ok(Some(entry))
        } else {
            self.entries.invalidate(key);
            Ok(None)
        }
    }

    fn set(&self, key: &str, entry: CachedPoint) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }
}
