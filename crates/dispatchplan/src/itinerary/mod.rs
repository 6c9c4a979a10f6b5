pub mod builder;
pub mod cancel;
pub mod policy;

pub use builder::{build_day_route, DayRouteError, RouteResult, RouteStep};
pub use cancel::CancellationFlag;
pub use policy::{CallPolicy, RetryableError};

use crate::geocode::{GeocodeCache, Geocoder};
use crate::navigation::NavigationUrlBuilder;
use crate::travel::TravelEstimator;

/// External services a route computation depends on.
pub struct Collaborators<'a> {
    pub geocoder: &'a dyn Geocoder,
    pub cache: &'a dyn GeocodeCache,
    pub travel: &'a dyn TravelEstimator,
    pub navigation: &'a dyn NavigationUrlBuilder,
    pub policy: CallPolicy,
}
