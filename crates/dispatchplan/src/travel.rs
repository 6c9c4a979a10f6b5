//! Travel estimates between two points.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::schema::TravelConfig;
use crate::error::TravelError;
use crate::model::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance and duration of a single leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
    pub distance_text: String,
    pub duration_text: String,
}

impl TravelEstimate {
    /// Builds an estimate with display texts derived from the raw values.
    pub fn new(distance_km: f64, duration_min: f64) -> Self {
        Self {
            distance_km,
            duration_min,
            distance_text: format_distance(distance_km),
            duration_text: format_duration(duration_min),
        }
    }
}

#[async_trait]
pub trait TravelEstimator: Send + Sync {
    async fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, TravelError>;
}

/// Offline estimator: great-circle distance scaled by a road factor, driven
/// at a constant average speed.
#[derive(Debug, Clone)]
pub struct StraightLineEstimator {
    road_factor: f64,
    average_speed_kmh: f64,
}

impl StraightLineEstimator {
    pub fn new(road_factor: f64, average_speed_kmh: f64) -> Self {
        Self {
            road_factor,
            average_speed_kmh,
        }
    }

    pub fn from_config(config: &TravelConfig) -> Self {
        Self::new(config.road_factor, config.average_speed_kmh)
    }

    pub fn estimate_now(&self, from: GeoPoint, to: GeoPoint) -> TravelEstimate {
        let distance_km = haversine_km(from, to) * self.road_factor;
        let duration_min = distance_km / self.average_speed_kmh * 60.0;
        TravelEstimate::new(distance_km, duration_min)
    }
}

impl Default for StraightLineEstimator {
    fn default() -> Self {
        let config = TravelConfig::default();
        Self::from_config(&config)
    }
}

#[async_trait]
impl TravelEstimator for StraightLineEstimator {
    async fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, TravelError> {
        if !from.is_valid() || !to.is_valid() {
            return Err(TravelError::NoRoute(format!("invalid coordinates {} -> {}", from, to)));
        }
        Ok(self.estimate_now(from, to))
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// `"850 m"` below one kilometre, otherwise `"12.3 km"`.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1} km", km)
    }
}

/// `"1 min"`, `"25 mins"`, `"1 hr"`, `"2 hrs 5 mins"`.
pub fn format_duration(minutes: f64) -> String {
    let total = minutes.round().max(0.0) as i64;
    let hours = total / 60;
    let mins = total % 60;

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("{} {}", n, unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };

    match (hours, mins) {
        (0, m) => plural(m, "min"),
        (h, 0) => plural(h, "hr"),
        (h, m) => format!("{} {}", plural(h, "hr"), plural(m, "min")),
    }
}
