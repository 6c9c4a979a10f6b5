//! Weekly planning: per-day failure isolation, matching and cancellation.

mod common;

use common::{
    date, employee, profile, template, FakeGeocoder, Fixture, JobBuilder, BRISBANE_CBD,
};
use dispatchplan::config::schema::WeekStart;
use dispatchplan::itinerary::CancellationFlag;
use dispatchplan::matcher::MatchStrategy;
use dispatchplan::model::{CustomerProfile, Employee, GeoPoint, Job, JobStatus, PropertyTemplate};
use dispatchplan::plan::{plan_week, WeekPlanRequest};

const WHARF: &str = "12 Wharf St, Brisbane QLD 4000";
const GEORGE: &str = "45 George St, Brisbane";
const ANN: &str = "300 Ann Street, Brisbane";
const EAGLE: &str = "1 Eagle St, Brisbane";
const BROKEN: &str = "99 Broken Rd, Brisbane";

fn geocoder() -> FakeGeocoder {
    FakeGeocoder::new()
        .with_point(WHARF, GeoPoint::new(-27.4650, 153.0300))
        .with_point(GEORGE, GeoPoint::new(-27.4720, 153.0270))
        .with_point(ANN, GeoPoint::new(-27.4640, 153.0290))
        .with_point(EAGLE, GeoPoint::new(-27.4670, 153.0310))
        .failing(BROKEN)
}

/// Monday and Wednesday route cleanly; Tuesday's second job cannot be geocoded.
fn week_jobs() -> Vec<Job> {
    vec![
        JobBuilder::new("MON-1").on("2024-03-04").at("08:00").address(WHARF).build(),
        JobBuilder::new("MON-2").on("2024-03-04").at("10:00").address(GEORGE).build(),
        JobBuilder::new("TUE-1").on("2024-03-05").at("08:00").address(ANN).build(),
        JobBuilder::new("TUE-2").on("2024-03-05").at("09:00").address(BROKEN).build(),
        JobBuilder::new("TUE-3").on("2024-03-05").at("11:00").address(EAGLE).build(),
        JobBuilder::new("WED-1").on("2024-03-06").address(EAGLE).build(),
    ]
}

fn request<'a>(
    employee: &'a Employee,
    jobs: &'a [Job],
    templates: &'a [PropertyTemplate],
    profiles: &'a [CustomerProfile],
) -> WeekPlanRequest<'a> {
    WeekPlanRequest {
        employee,
        week_of: date("2024-03-06"),
        week_start: WeekStart::Monday,
        jobs,
        templates,
        profiles,
        origin_label: "Current location",
    }
}

#[tokio::test]
async fn test_failed_day_does_not_block_other_days() {
    let fixture = Fixture::new(geocoder());
    let employee = employee("E1", Some(BRISBANE_CBD));
    let jobs = week_jobs();

    let plan = plan_week(
        &request(&employee, &jobs, &[], &[]),
        &fixture.collaborators(),
        &CancellationFlag::new(),
    )
    .await;

    assert!(plan.general_error.is_none());
    assert!(!plan.cancelled);
    assert!(!plan.is_complete());

    let tuesday = date("2024-03-05");
    assert!(!plan.route_result_by_date.contains_key(&tuesday));
    let error = &plan.route_error_by_date[&tuesday];
    assert!(error.contains("TUE-2"), "unexpected error: {}", error);
    assert!(error.contains(BROKEN));

    assert_eq!(plan.route_result_by_date.len(), 2);
    assert_eq!(plan.route_result_by_date[&date("2024-03-04")].steps.len(), 2);
    assert_eq!(plan.route_result_by_date[&date("2024-03-06")].steps.len(), 1);

    // TUE-3 was never geocoded for Tuesday; Wednesday geocoded the same address.
    assert_eq!(
        fixture.geocoder.queried(),
        vec![WHARF, GEORGE, ANN, BROKEN, EAGLE]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_days_are_ordered_by_start_time() {
    let fixture = Fixture::new(geocoder());
    let employee = employee("E1", Some(BRISBANE_CBD));
    let jobs = vec![
        JobBuilder::new("late").at("14:00").address(WHARF).build(),
        JobBuilder::new("untimed").address(ANN).build(),
        JobBuilder::new("early").at("07:30").address(GEORGE).build(),
    ];

    let plan = plan_week(
        &request(&employee, &jobs, &[], &[]),
        &fixture.collaborators(),
        &CancellationFlag::new(),
    )
    .await;

    let monday = date("2024-03-04");
    assert_eq!(plan.jobs_by_date[&monday], vec!["early", "late", "untimed"]);
    let step_ids: Vec<&str> = plan.route_result_by_date[&monday]
        .steps
        .iter()
        .map(|s| s.job_id.as_str())
        .collect();
    assert_eq!(step_ids, vec!["early", "late", "untimed"]);
}

#[tokio::test]
async fn test_missing_location_is_general_error() {
    let fixture = Fixture::new(geocoder());
    let employee = employee("E1", None);
    let jobs = week_jobs();

    let plan = plan_week(
        &request(&employee, &jobs, &[], &[]),
        &fixture.collaborators(),
        &CancellationFlag::new(),
    )
    .await;

    let message = plan.general_error.as_deref().unwrap();
    assert!(message.contains("Employee E1"));
    assert!(plan.route_result_by_date.is_empty());
    assert!(plan.route_error_by_date.is_empty());
    assert_eq!(fixture.geocoder.calls(), 0);
    // Days are still listed for display.
    assert_eq!(plan.jobs_by_date.len(), 3);
}

#[tokio::test]
async fn test_only_active_assigned_jobs_in_week_are_planned() {
    let fixture = Fixture::new(geocoder());
    let employee = employee("E1", Some(BRISBANE_CBD));
    let jobs = vec![
        JobBuilder::new("keep").address(WHARF).build(),
        JobBuilder::new("done")
            .address(GEORGE)
            .status(JobStatus::Completed)
            .build(),
        JobBuilder::new("cancelled")
            .address(GEORGE)
            .status(JobStatus::Cancelled)
            .build(),
        JobBuilder::new("other-crew")
            .address(ANN)
            .assigned_to(&["E2"])
            .build(),
        JobBuilder::new("next-week").on("2024-03-11").address(EAGLE).build(),
        JobBuilder::new("in-progress")
            .on("2024-03-10")
            .address(EAGLE)
            .status(JobStatus::InProgress)
            .build(),
    ];

    let plan = plan_week(
        &request(&employee, &jobs, &[], &[]),
        &fixture.collaborators(),
        &CancellationFlag::new(),
    )
    .await;

    let planned: Vec<&String> = plan.jobs_by_date.values().flatten().collect();
    assert_eq!(planned, vec!["keep", "in-progress"]);
    assert_eq!(plan.week_start, Some(date("2024-03-04")));
    assert_eq!(plan.week_end, Some(date("2024-03-10")));
    assert!(plan.is_complete());
}

#[tokio::test]
async fn test_sunday_week_start() {
    let fixture = Fixture::new(geocoder());
    let employee = employee("E1", Some(BRISBANE_CBD));
    let jobs = vec![
        JobBuilder::new("sun").on("2024-03-03").address(WHARF).build(),
        JobBuilder::new("next-sun").on("2024-03-10").address(ANN).build(),
    ];
    let mut req = request(&employee, &jobs, &[], &[]);
    req.week_start = WeekStart::Sunday;

    let plan = plan_week(&req, &fixture.collaborators(), &CancellationFlag::new()).await;

    assert_eq!(plan.week_start, Some(date("2024-03-03")));
    assert_eq!(plan.jobs_by_date.len(), 1);
    assert!(plan.route_result_by_date.contains_key(&date("2024-03-03")));
}

#[tokio::test]
async fn test_jobs_are_matched_and_inspections_collected() {
    let fixture = Fixture::new(geocoder());
    let employee = employee("E1", Some(BRISBANE_CBD));
    let templates = vec![
        template("T-WHARF", "Harbour Cafe", Some("12 Wharf Street, Brisbane City")),
        template("T-ANN", "Ann St Offices", Some("300 Ann St")),
    ];
    let profiles = vec![
        profile("P-CAFE", "Harbour Cafe", Some(WHARF), true),
        profile("P-ANN", "Ann St Offices", Some(ANN), false),
    ];
    let jobs = vec![
        JobBuilder::new("J1")
            .customer("Harbour Cafe")
            .address(WHARF)
            .profile("P-CAFE")
            .build(),
        JobBuilder::new("J2")
            .customer("Ann St Offices")
            .address(ANN)
            .profile("P-ANN")
            .build(),
        JobBuilder::new("J3").customer("Walk-in").address(GEORGE).build(),
    ];

    let plan = plan_week(
        &request(&employee, &jobs, &templates, &profiles),
        &fixture.collaborators(),
        &CancellationFlag::new(),
    )
    .await;

    assert_eq!(plan.matches.len(), 3);
    assert_eq!(plan.matches["J1"].strategy, MatchStrategy::AddressCore);
    assert_eq!(plan.matches["J2"].strategy, MatchStrategy::AddressCore);
    assert_eq!(plan.matches["J3"].strategy, MatchStrategy::Unmatched);

    // J2's profile has recurring service disabled.
    let inspected: Vec<&str> = plan.inspections.iter().map(|i| i.job.id.as_str()).collect();
    assert_eq!(inspected, vec!["J1"]);
    assert_eq!(plan.inspections[0].template.id, "T-WHARF");
    assert_eq!(plan.inspections[0].employee.id, "E1");
}

#[tokio::test]
async fn test_cancelled_plan_records_nothing() {
    let cancel = CancellationFlag::new();
    let fixture = Fixture::new(geocoder().cancelling(cancel.clone()));
    let employee = employee("E1", Some(BRISBANE_CBD));
    let jobs = week_jobs();

    let plan = plan_week(
        &request(&employee, &jobs, &[], &[]),
        &fixture.collaborators(),
        &cancel,
    )
    .await;

    assert!(plan.cancelled);
    assert!(plan.route_result_by_date.is_empty());
    assert!(plan.route_error_by_date.is_empty());
    assert_eq!(fixture.geocoder.calls(), 1);
}

#[tokio::test]
async fn test_plan_serializes_with_date_keys() {
    let fixture = Fixture::new(geocoder());
    let employee = employee("E1", Some(BRISBANE_CBD));
    let jobs = week_jobs();

    let plan = plan_week(
        &request(&employee, &jobs, &[], &[]),
        &fixture.collaborators(),
        &CancellationFlag::new(),
    )
    .await;

    let json = serde_json::to_value(&plan).unwrap();
    assert!(json["routeResultByDate"]["2024-03-04"]["steps"].is_array());
    assert!(json["routeErrorByDate"]["2024-03-05"].is_string());
    assert_eq!(json["cancelled"], false);
}
