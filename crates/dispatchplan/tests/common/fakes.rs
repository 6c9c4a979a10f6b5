//! Scripted collaborators for route computations.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use dispatchplan::error::{CacheError, GeocodeError, TravelError};
use dispatchplan::geocode::{CachePolicy, CachedPoint, GeocodeCache, Geocoder, MemoryGeocodeCache};
use dispatchplan::itinerary::{CallPolicy, CancellationFlag, Collaborators};
use dispatchplan::model::GeoPoint;
use dispatchplan::navigation::GoogleMapsUrlBuilder;
use dispatchplan::travel::{TravelEstimate, TravelEstimator};

/// Geocoder answering from a fixed address table.
#[derive(Default)]
pub struct FakeGeocoder {
    points: HashMap<String, GeoPoint>,
    failing: HashSet<String>,
    transient_failures: AtomicU32,
    delay: Option<Duration>,
    cancel_on_call: Option<CancellationFlag>,
    calls: AtomicUsize,
    queried: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_point(mut self, address: &str, point: GeoPoint) -> Self {
        self.points.insert(address.to_string(), point);
        self
    }

    /// The address fails with a non-retryable error.
    pub fn failing(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    /// The first `count` calls fail with a retryable error.
    pub fn flaky(self, count: u32) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Raises `flag` whenever the geocoder is called.
    pub fn cancelling(mut self, flag: CancellationFlag) -> Self {
        self.cancel_on_call = Some(flag);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queried.lock().unwrap().push(address.to_string());

        if let Some(flag) = &self.cancel_on_call {
            flag.cancel();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(GeocodeError::Status {
                status: 503,
                body: "busy".to_string(),
            });
        }

        if self.failing.contains(address) {
            return Err(GeocodeError::Parse("unexpected payload".to_string()));
        }
        Ok(self.points.get(address).copied())
    }
}

/// Every leg is 10 km and 15 minutes.
#[derive(Default)]
pub struct FixedEstimator {
    calls: AtomicUsize,
}

impl FixedEstimator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TravelEstimator for FixedEstimator {
    async fn estimate(&self, _from: GeoPoint, _to: GeoPoint) -> Result<TravelEstimate, TravelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TravelEstimate::new(10.0, 15.0))
    }
}

/// Cache whose backend is always down.
pub struct BrokenCache;

impl GeocodeCache for BrokenCache {
    fn get(&self, _key: &str) -> Result<Option<CachedPoint>, CacheError> {
        Err(CacheError::Backend("disk full".to_string()))
    }

    fn set(&self, _key: &str, _entry: CachedPoint) -> Result<(), CacheError> {
        Err(CacheError::Backend("disk full".to_string()))
    }
}

/// Policy with millisecond timings so retries do not slow tests down.
pub fn fast_policy() -> CallPolicy {
    CallPolicy {
        timeout: Duration::from_millis(200),
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    }
}

/// Owns one set of collaborators for a test.
pub struct Fixture<C: GeocodeCache = MemoryGeocodeCache> {
    pub geocoder: FakeGeocoder,
    pub cache: C,
    pub travel: FixedEstimator,
    pub navigation: GoogleMapsUrlBuilder,
    pub policy: CallPolicy,
}

impl Fixture {
    pub fn new(geocoder: FakeGeocoder) -> Self {
        Self::with_cache(
            geocoder,
            MemoryGeocodeCache::new(100, CachePolicy::never_expire()),
        )
    }
}

impl<C: GeocodeCache> Fixture<C> {
    pub fn with_cache(geocoder: FakeGeocoder, cache: C) -> Self {
        Self {
            geocoder,
            cache,
            travel: FixedEstimator::default(),
            navigation: GoogleMapsUrlBuilder,
            policy: fast_policy(),
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            geocoder: &self.geocoder,
            cache: &self.cache,
            travel: &self.travel,
            navigation: &self.navigation,
            policy: self.policy.clone(),
        }
    }
}
