//! Read-only records supplied by the dispatch system.
//!
//! Field names serialize as camelCase to match the records the dispatch
//! front-end already stores.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Completed and cancelled jobs take no part in routing.
    pub fn is_active(&self) -> bool {
        !matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }
}

/// A scheduled service visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub service_type: String,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub assigned_employee_ids: Vec<String>,
    #[serde(default)]
    pub customer_profile_id: Option<String>,
}

impl Job {
    /// Returns the customer address if it contains anything besides whitespace.
    pub fn address(&self) -> Option<&str> {
        self.customer_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    pub fn is_assigned_to(&self, employee_id: &str) -> bool {
        self.assigned_employee_ids.iter().any(|id| id == employee_id)
    }
}

/// Customer record optionally linked from a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Recurring service, which is what makes a customer eligible for
    /// template-based inspections.
    #[serde(default)]
    pub recurring_enabled: bool,
}

/// Reusable property definition used for inspection checklists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Field employee whose day is being routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    /// Last reported location; routing starts here.
    #[serde(default)]
    pub current_location: Option<GeoPoint>,
    #[serde(default)]
    pub location_label: Option<String>,
}

impl Employee {
    pub fn origin_label<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.location_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(fallback)
    }
}
