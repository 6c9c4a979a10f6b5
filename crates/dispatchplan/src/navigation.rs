//! Driving-directions deep links.

use reqwest::Url;

use crate::model::GeoPoint;

const GOOGLE_MAPS_DIRECTIONS: &str = "https://www.google.com/maps/dir/";

pub trait NavigationUrlBuilder: Send + Sync {
    fn build(&self, from: GeoPoint, to: GeoPoint, waypoints: &[GeoPoint]) -> String;
}

/// Builds Google Maps "directions" links (`api=1` URL scheme).
#[derive(Debug, Clone, Default)]
pub struct GoogleMapsUrlBuilder;

impl NavigationUrlBuilder for GoogleMapsUrlBuilder {
    fn build(&self, from: GeoPoint, to: GeoPoint, waypoints: &[GeoPoint]) -> String {
        let mut params: Vec<(&str, String)> = vec![
            ("api", "1".to_string()),
            ("origin", from.to_string()),
            ("destination", to.to_string()),
        ];
        if !waypoints.is_empty() {
            let joined: Vec<String> = waypoints.iter().map(GeoPoint::to_string).collect();
            params.push(("waypoints", joined.join("|")));
        }
        params.push(("travelmode", "driving".to_string()));

        match Url::parse_with_params(GOOGLE_MAPS_DIRECTIONS, &params) {
            Ok(url) => url.to_string(),
            // Base URL is a valid constant.
            Err(_) => GOOGLE_MAPS_DIRECTIONS.to_string(),
        }
    }
}
