//! Weekly itinerary for one employee.
//!
//! Jobs are grouped by day, each day is routed independently, and every
//! job is matched against the template catalog. A failing day is recorded
//! under its date and never blocks the others. A missing employee location
//! fails the whole week with a single general error.

use chrono::{Datelike, Duration, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info_span, Instrument};

use crate::config::schema::WeekStart;
use crate::itinerary::{
    build_day_route, CancellationFlag, Collaborators, DayRouteError, RouteResult,
};
use crate::matcher::{inspection_request, InspectionRequest, TemplateMatch, TemplateMatcher};
use crate::model::{CustomerProfile, Employee, Job, PropertyTemplate};
use crate::sanitize::hash_text;

#[derive(Debug, Clone)]
pub struct WeekPlanRequest<'a> {
    pub employee: &'a Employee,
    /// Any date inside the week to plan.
    pub week_of: NaiveDate,
    pub week_start: WeekStart,
    pub jobs: &'a [Job],
    pub templates: &'a [PropertyTemplate],
    pub profiles: &'a [CustomerProfile],
    /// Label for the first leg when the employee has none of their own.
    pub origin_label: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPlan {
    pub employee_id: String,
    pub week_start: Option<NaiveDate>,
    pub week_end: Option<NaiveDate>,
    /// Job ids per day, in visiting order.
    pub jobs_by_date: BTreeMap<NaiveDate, Vec<String>>,
    pub route_result_by_date: BTreeMap<NaiveDate, RouteResult>,
    pub route_error_by_date: BTreeMap<NaiveDate, String>,
    pub general_error: Option<String>,
    /// Template match per job id.
    pub matches: BTreeMap<String, TemplateMatch>,
    pub inspections: Vec<InspectionRequest>,
    pub cancelled: bool,
}

impl WeekPlan {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.general_error.is_none() && self.route_error_by_date.is_empty()
    }
}

/// First and last day of the week containing `date`.
pub fn week_bounds(date: NaiveDate, start: WeekStart) -> (NaiveDate, NaiveDate) {
    let offset = match start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    let first = date - Duration::days(i64::from(offset));
    (first, first + Duration::days(6))
}

/// Active jobs assigned to `employee_id` within `[first, last]`, grouped by
/// date and ordered by start time (untimed jobs last), then id.
pub fn group_jobs_by_date<'a>(
    jobs: &'a [Job],
    employee_id: &str,
    first: NaiveDate,
    last: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<&'a Job>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Job>> = BTreeMap::new();
    for job in jobs {
        if job.status.is_active()
            && job.is_assigned_to(employee_id)
            && (first..=last).contains(&job.scheduled_date)
        {
            by_date.entry(job.scheduled_date).or_default().push(job);
        }
    }
    for day in by_date.values_mut() {
        day.sort_by(|a, b| {
            (a.start_time.is_none(), a.start_time, &a.id).cmp(&(
                b.start_time.is_none(),
                b.start_time,
                &b.id,
            ))
        });
    }
    by_date
}

/// Matches jobs to templates and routes every day of the requested week.
pub async fn plan_week(
    request: &WeekPlanRequest<'_>,
    collaborators: &Collaborators<'_>,
    cancel: &CancellationFlag,
) -> WeekPlan {
    let employee = request.employee;
    let (first, last) = week_bounds(request.week_of, request.week_start);
    let span = info_span!(
        "plan_week",
        employee = %hash_text(&employee.id),
        week_start = %first
    );

    async {
        let by_date = group_jobs_by_date(request.jobs, &employee.id, first, last);

        let mut plan = WeekPlan {
            employee_id: employee.id.clone(),
            week_start: Some(first),
            week_end: Some(last),
            jobs_by_date: by_date
                .iter()
                .map(|(date, jobs)| (*date, jobs.iter().map(|j| j.id.clone()).collect()))
                .collect(),
            ..WeekPlan::default()
        };

        match_week(request, &by_date, &mut plan);

        let Some(origin) = employee.current_location else {
            warn!("No location for employee {}; skipping routes", employee.id);
            plan.general_error = Some(format!(
                "{} has no current location; routes cannot be calculated",
                employee.name
            ));
            return plan;
        };
        let origin_label = employee.origin_label(request.origin_label);

        for (date, jobs) in &by_date {
            if cancel.is_cancelled() {
                return cancelled(plan);
            }

            let result = build_day_route(origin, origin_label, jobs, collaborators, cancel)
                .instrument(info_span!("day_route", date = %date, jobs = jobs.len()))
                .await;

            match result {
                Ok(route) => {
                    plan.route_result_by_date.insert(*date, route);
                }
                Err(DayRouteError::Cancelled) => return cancelled(plan),
                Err(e) => {
                    warn!("Route for {} failed: {}", date, e);
                    plan.route_error_by_date.insert(*date, e.to_string());
                }
            }
        }

        info!(
            "Planned week of {}: {} days routed, {} failed",
            first,
            plan.route_result_by_date.len(),
            plan.route_error_by_date.len()
        );
        plan
    }
    .instrument(span)
    .await
}

fn match_week(
    request: &WeekPlanRequest<'_>,
    by_date: &BTreeMap<NaiveDate, Vec<&Job>>,
    plan: &mut WeekPlan,
) {
    if request.templates.is_empty() {
        return;
    }

    let matcher = TemplateMatcher::new(request.templates);
    let profiles: HashMap<&str, &CustomerProfile> =
        request.profiles.iter().map(|p| (p.id.as_str(), p)).collect();

    for job in by_date.values().flatten() {
        let profile = job
            .customer_profile_id
            .as_deref()
            .and_then(|id| profiles.get(id).copied());
        let matched = matcher.match_job(job, profile);
        if let Some(inspection) = inspection_request(job, &matched, request.employee, profile) {
            plan.inspections.push(inspection);
        }
        plan.matches.insert(job.id.clone(), matched);
    }
}

/// Results computed before cancellation are discarded.
fn cancelled(mut plan: WeekPlan) -> WeekPlan {
    info!("Week plan for {} cancelled", plan.employee_id);
    plan.route_result_by_date.clear();
    plan.route_error_by_date.clear();
    plan.cancelled = true;
    plan
}
