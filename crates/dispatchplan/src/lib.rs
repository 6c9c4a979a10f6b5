pub mod address;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod geocode;
pub mod itinerary;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod navigation;
pub mod plan;
pub mod planner;
pub mod sanitize;
pub mod travel;

pub use address::{extract_address_core, format_address_core, normalize_address_text, AddressCore};
pub use config::{load_config, Config};
pub use data::{load_dataset, Dataset};
pub use error::{
    CacheError, ConfigError, DataError, DispatchError, GeocodeError, Result, TravelError,
};
pub use geocode::{
    GeocodeCache, Geocoder, MemoryGeocodeCache, NominatimGeocoder, SqliteGeocodeCache,
};
pub use itinerary::{
    build_day_route, CallPolicy, CancellationFlag, Collaborators, DayRouteError, RouteResult,
    RouteStep,
};
pub use matcher::{
    find_matching_template, inspection_request, score_address_match, score_name_match,
    InspectionRequest, MatchStrategy, TemplateMatch, TemplateMatcher,
};
pub use model::{CustomerProfile, Employee, GeoPoint, Job, JobStatus, PropertyTemplate};
pub use navigation::{GoogleMapsUrlBuilder, NavigationUrlBuilder};
pub use plan::{plan_week, WeekPlan, WeekPlanRequest};
pub use planner::Planner;
pub use travel::{StraightLineEstimator, TravelEstimate, TravelEstimator};
