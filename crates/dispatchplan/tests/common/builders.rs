//! Builder patterns for creating test records programmatically.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};

use dispatchplan::model::{
    CustomerProfile, Employee, GeoPoint, Job, JobStatus, PropertyTemplate,
};

pub const BRISBANE_CBD: GeoPoint = GeoPoint {
    latitude: -27.4698,
    longitude: 153.0251,
};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

/// Builder for creating `Job` instances.
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    /// A scheduled job for employee `E1` on 2024-03-04 (a Monday).
    pub fn new(id: &str) -> Self {
        Self {
            job: Job {
                id: id.to_string(),
                customer_name: format!("Customer {}", id),
                customer_address: None,
                service_type: "Office clean".to_string(),
                scheduled_date: date("2024-03-04"),
                start_time: None,
                end_time: None,
                status: JobStatus::Scheduled,
                assigned_employee_ids: vec!["E1".to_string()],
                customer_profile_id: None,
            },
        }
    }

    pub fn customer(mut self, name: &str) -> Self {
        self.job.customer_name = name.to_string();
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.job.customer_address = Some(address.to_string());
        self
    }

    pub fn on(mut self, day: &str) -> Self {
        self.job.scheduled_date = date(day);
        self
    }

    pub fn at(mut self, start: &str) -> Self {
        self.job.start_time = Some(time(start));
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.job.status = status;
        self
    }

    pub fn assigned_to(mut self, employee_ids: &[&str]) -> Self {
        self.job.assigned_employee_ids = employee_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn profile(mut self, profile_id: &str) -> Self {
        self.job.customer_profile_id = Some(profile_id.to_string());
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

pub fn employee(id: &str, location: Option<GeoPoint>) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {}", id),
        current_location: location,
        location_label: None,
    }
}

pub fn template(id: &str, name: &str, address: Option<&str>) -> PropertyTemplate {
    PropertyTemplate {
        id: id.to_string(),
        name: name.to_string(),
        address: address.map(str::to_string),
    }
}

pub fn profile(id: &str, name: &str, address: Option<&str>, recurring: bool) -> CustomerProfile {
    CustomerProfile {
        id: id.to_string(),
        name: name.to_string(),
        address: address.map(str::to_string),
        recurring_enabled: recurring,
    }
}
