//! Address geocoding and the geocode cache.

pub mod cache;
pub mod nominatim;
pub mod sqlite_cache;

use async_trait::async_trait;

use crate::error::GeocodeError;
use crate::model::GeoPoint;

pub use cache::{
    cache_key, CachePolicy, CachedPoint, GeocodeCache, MemoryGeocodeCache, MAX_TTL_DAYS,
};
pub use nominatim::NominatimGeocoder;
pub use sqlite_cache::SqliteGeocodeCache;

/// Resolves free-text addresses to coordinates.
///
/// `Ok(None)` means the service answered but found nothing for the address.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError>;
}
