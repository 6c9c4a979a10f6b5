//! Ordered day route for one employee.

use chrono::Utc;
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::geocode::{cache_key, CachedPoint};
use crate::itinerary::{CancellationFlag, Collaborators};
use crate::model::{GeoPoint, Job};
use crate::sanitize::redact_address;
use crate::travel::{format_distance, format_duration};

/// One leg of a day route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub job_id: String,
    pub customer_name: String,
    pub from_label: String,
    pub to_label: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub distance_text: String,
    pub duration_text: String,
    pub navigation_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub steps: Vec<RouteStep>,
    pub total_distance_km: f64,
    pub total_duration_min: f64,
    pub total_distance_text: String,
    pub total_duration_text: String,
    /// Commute to the first job of the day.
    pub next_commute_distance_text: String,
    pub next_commute_duration_text: String,
    pub overview_url: String,
}

/// Why a day could not be routed. `Display` is the text shown for that date.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DayRouteError {
    #[error("Job {job_id} ({customer_name}) has no customer address")]
    MissingAddress {
        job_id: String,
        customer_name: String,
    },

    #[error("Could not geocode address '{address}' for job {job_id}: {reason}")]
    GeocodeFailed {
        job_id: String,
        address: String,
        reason: String,
    },

    #[error("Address '{address}' for job {job_id} could not be found")]
    AddressNotFound { job_id: String, address: String },

    #[error("Could not estimate travel to job {job_id}: {reason}")]
    TravelFailed { job_id: String, reason: String },

    #[error("No route steps could be computed")]
    NoSteps,

    #[error("Final stop of the day has no location")]
    MissingFinalPoint,

    #[error("Route computation was cancelled")]
    Cancelled,
}

struct ResolvedStop<'a> {
    job: &'a Job,
    address: &'a str,
    point: GeoPoint,
}

fn ensure_active(cancel: &CancellationFlag) -> Result<(), DayRouteError> {
    if cancel.is_cancelled() {
        return Err(DayRouteError::Cancelled);
    }
    Ok(())
}

/// Builds the route for `jobs` in the given order, starting at `origin`.
///
/// The first failing job aborts the whole day; no partial route is returned.
pub async fn build_day_route(
    origin: GeoPoint,
    origin_label: &str,
    jobs: &[&Job],
    collaborators: &Collaborators<'_>,
    cancel: &CancellationFlag,
) -> Result<RouteResult, DayRouteError> {
    ensure_active(cancel)?;

    let mut stops = Vec::with_capacity(jobs.len());
    for job in jobs {
        let address = job.address().ok_or_else(|| DayRouteError::MissingAddress {
            job_id: job.id.clone(),
            customer_name: job.customer_name.clone(),
        })?;
        let point = resolve_point(job, address, collaborators, cancel).await?;
        stops.push(ResolvedStop {
            job,
            address,
            point,
        });
    }

    let mut steps = Vec::with_capacity(stops.len());
    let mut total_distance_km = 0.0;
    let mut total_duration_min = 0.0;
    let mut current = origin;
    let mut from_label = origin_label;

    for stop in &stops {
        let to = stop.point;
        let estimate = collaborators
            .policy
            .call("travel estimate", || collaborators.travel.estimate(current, to))
            .await
            .map_err(|e| DayRouteError::TravelFailed {
                job_id: stop.job.id.clone(),
                reason: e.to_string(),
            })?;
        ensure_active(cancel)?;

        total_distance_km += estimate.distance_km;
        total_duration_min += estimate.duration_min;

        steps.push(RouteStep {
            job_id: stop.job.id.clone(),
            customer_name: stop.job.customer_name.clone(),
            from_label: from_label.to_string(),
            to_label: stop.address.to_string(),
            distance_km: estimate.distance_km,
            duration_min: estimate.duration_min,
            distance_text: estimate.distance_text,
            duration_text: estimate.duration_text,
            navigation_url: collaborators.navigation.build(current, to, &[]),
        });

        current = to;
        from_label = stop.address;
    }

    let first = steps.first().ok_or(DayRouteError::NoSteps)?;
    let next_commute_distance_text = first.distance_text.clone();
    let next_commute_duration_text = first.duration_text.clone();

    let (last, earlier) = stops.split_last().ok_or(DayRouteError::MissingFinalPoint)?;
    let waypoints: Vec<GeoPoint> = earlier.iter().map(|s| s.point).collect();
    let overview_url = collaborators.navigation.build(origin, last.point, &waypoints);

    Ok(RouteResult {
        steps,
        total_distance_km,
        total_duration_min,
        total_distance_text: format_distance(total_distance_km),
        total_duration_text: format_duration(total_duration_min),
        next_commute_distance_text,
        next_commute_duration_text,
        overview_url,
    })
}

/// Cache first, then the geocoder with write-back. Cache failures count as misses.
async fn resolve_point(
    job: &Job,
    address: &str,
    collaborators: &Collaborators<'_>,
    cancel: &CancellationFlag,
) -> Result<GeoPoint, DayRouteError> {
    let key = cache_key(address);

    match collaborators.cache.get(&key) {
        Ok(Some(entry)) => {
            debug!("Geocode cache hit for {}", redact_address(address));
            return Ok(entry.point());
        }
        Ok(None) => {}
        Err(e) => warn!(
            "Geocode cache read failed for {}: {}",
            redact_address(address),
            e
        ),
    }

    let result = collaborators
        .policy
        .call("geocode", || collaborators.geocoder.geocode(address))
        .await;
    ensure_active(cancel)?;

    let point = match result {
        Ok(Some(point)) => point,
        Ok(None) => {
            return Err(DayRouteError::AddressNotFound {
                job_id: job.id.clone(),
                address: address.to_string(),
            })
        }
        Err(e) => {
            return Err(DayRouteError::GeocodeFailed {
                job_id: job.id.clone(),
                address: address.to_string(),
                reason: e.to_string(),
            })
        }
    };

    if let Err(e) = collaborators
        .cache
        .set(&key, CachedPoint::new(point, Utc::now()))
    {
        warn!(
            "Geocode cache write failed for {}: {}",
            redact_address(address),
            e
        );
    }

    Ok(point)
}
