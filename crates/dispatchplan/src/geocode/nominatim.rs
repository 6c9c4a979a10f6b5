//! Geocoder for OpenStreetMap Nominatim-compatible search endpoints.

use async_trait::async_trait;
use log::debug;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;

use crate::config::schema::GeocodingConfig;
use crate::error::GeocodeError;
use crate::model::GeoPoint;

use super::Geocoder;

/// Maximum length for error bodies kept in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 200;

#[derive(Debug, Deserialize)]
struct SearchPlace {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    user_agent: String,
    country_codes: Vec<String>,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            country_codes: config.country_codes.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let mut query: Vec<(&str, String)> = vec![
            ("q", address.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", "1".to_string()),
        ];
        if !self.country_codes.is_empty() {
            query.push(("countrycodes", self.country_codes.join(",")));
        }

        let response = self
            .client
            .get(self.search_url())
            .header(USER_AGENT, &self.user_agent)
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = response.text().await?;
        let point = parse_search_response(&body)?;
        debug!("Nominatim returned {} result", if point.is_some() { "a" } else { "no" });
        Ok(point)
    }
}

/// Parses a Nominatim `search` JSON body, taking the first place.
pub(crate) fn parse_search_response(body: &str) -> Result<Option<GeoPoint>, GeocodeError> {
    let places: Vec<SearchPlace> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let latitude: f64 = place
        .lat
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("invalid latitude '{}'", place.lat)))?;
    let longitude: f64 = place
        .lon
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("invalid longitude '{}'", place.lon)))?;

    let point = GeoPoint::new(latitude, longitude);
    if !point.is_valid() {
        return Err(GeocodeError::Parse(format!("coordinate out of range: {}", point)));
    }
    Ok(Some(point))
}

fn truncate_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}
