//! Google Maps Geocoding and Directions adapters over blocking HTTP.
//!
//! # Invariants
//! - The API key is sent as a query parameter and never logged.
//! - Any status other than `OK` (or `ZERO_RESULTS` for geocoding) is an error.

use crate::config::EngineConfig;
use crate::model::stop::Coordinates;
use crate::provider::{Geocoder, ProviderError, RoutingProvider, TravelMode};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

pub const GOOGLE_PROVIDER_NAME: &str = "google";
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Shared client for both Google Maps endpoints.
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    geocode_url: String,
    directions_url: String,
}

impl GoogleMapsClient {
    /// Builds a client with a per-request timeout.
    ///
    /// # Errors
    /// Returns `ProviderError::Transport` when the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        geocode_url: impl Into<String>,
        directions_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            geocode_url: geocode_url.into(),
            directions_url: directions_url.into(),
        })
    }

    /// Builds a client from configuration; `Ok(None)` when no API key is set.
    pub fn from_config(config: &EngineConfig) -> Result<Option<Self>, ProviderError> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };
        Self::new(
            api_key,
            config.geocode_url.as_str(),
            config.directions_url.as_str(),
            config.request_timeout(),
        )
        .map(Some)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .map_err(|err| ProviderError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("http status {status}")));
        }

        response
            .json::<T>()
            .map_err(|err| ProviderError::Malformed(err.without_url().to_string()))
    }
}

impl Geocoder for GoogleMapsClient {
    fn provider_name(&self) -> &str {
        GOOGLE_PROVIDER_NAME
    }

    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ProviderError> {
        let body: GeocodeResponse = self.get_json(&self.geocode_url, &[("address", address)])?;
        parse_geocode_response(body)
    }
}

impl RoutingProvider for GoogleMapsClient {
    fn provider_name(&self) -> &str {
        GOOGLE_PROVIDER_NAME
    }

    fn optimize_waypoints(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        waypoints: &[Coordinates],
        mode: TravelMode,
    ) -> Result<Vec<usize>, ProviderError> {
        let origin = format_lat_lng(origin);
        let destination = format_lat_lng(destination);
        let waypoints_param = format_waypoints(waypoints);

        let mut query = vec![
            ("origin", origin.as_str()),
            ("destination", destination.as_str()),
            ("mode", mode.as_str()),
        ];
        if let Some(waypoints_param) = waypoints_param.as_deref() {
            query.push(("waypoints", waypoints_param));
        }

        debug!(
            "event=directions_request module=provider provider=google waypoints={} mode={}",
            waypoints.len(),
            mode.as_str()
        );
        let body: DirectionsResponse = self.get_json(&self.directions_url, &query)?;
        parse_directions_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    waypoint_order: Vec<usize>,
}

fn parse_geocode_response(body: GeocodeResponse) -> Result<Option<Coordinates>, ProviderError> {
    match body.status.as_str() {
        STATUS_OK => Ok(body
            .results
            .first()
            .map(|result| Coordinates::new(result.geometry.location.lat, result.geometry.location.lng))),
        STATUS_ZERO_RESULTS => Ok(None),
        _ => Err(ProviderError::Status(body.status)),
    }
}

fn parse_directions_response(body: DirectionsResponse) -> Result<Vec<usize>, ProviderError> {
    if body.status != STATUS_OK {
        return Err(ProviderError::Status(body.status));
    }
    body.routes
        .into_iter()
        .next()
        .map(|route| route.waypoint_order)
        .ok_or_else(|| ProviderError::Malformed("directions response has no routes".to_string()))
}

fn format_lat_lng(coordinates: Coordinates) -> String {
    format!("{},{}", coordinates.latitude, coordinates.longitude)
}

fn format_waypoints(waypoints: &[Coordinates]) -> Option<String> {
    if waypoints.is_empty() {
        return None;
    }
    let joined = waypoints
        .iter()
        .map(|point| format_lat_lng(*point))
        .collect::<Vec<_>>()
        .join("|");
    Some(format!("optimize:true|{joined}"))
}

#[cfg(test)]
mod tests {
    use super::{
        format_waypoints, parse_directions_response, parse_geocode_response, DirectionsResponse,
        GeocodeResponse,
    };
    use crate::model::stop::Coordinates;
    use crate::provider::ProviderError;

    fn geocode(json: &str) -> Result<Option<Coordinates>, ProviderError> {
        let body: GeocodeResponse = serde_json::from_str(json).expect("fixture should parse");
        parse_geocode_response(body)
    }

    fn directions(json: &str) -> Result<Vec<usize>, ProviderError> {
        let body: DirectionsResponse = serde_json::from_str(json).expect("fixture should parse");
        parse_directions_response(body)
    }

    #[test]
    fn geocode_takes_first_result() {
        let coords = geocode(
            r#"{"status":"OK","results":[
                {"geometry":{"location":{"lat":40.1,"lng":-73.2}},"formatted_address":"a"},
                {"geometry":{"location":{"lat":1.0,"lng":2.0}}}
            ]}"#,
        )
        .expect("OK should parse");
        assert_eq!(coords, Some(Coordinates::new(40.1, -73.2)));
    }

    #[test]
    fn geocode_zero_results_is_no_match() {
        assert_eq!(geocode(r#"{"status":"ZERO_RESULTS","results":[]}"#), Ok(None));
    }

    #[test]
    fn geocode_denied_is_status_error() {
        let err = geocode(r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#)
            .expect_err("denied should fail");
        assert_eq!(err, ProviderError::Status("REQUEST_DENIED".to_string()));
    }

    #[test]
    fn directions_reads_waypoint_order() {
        let order = directions(r#"{"status":"OK","routes":[{"waypoint_order":[2,0,1]}]}"#)
            .expect("OK should parse");
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn directions_without_routes_is_malformed() {
        let err = directions(r#"{"status":"OK","routes":[]}"#).expect_err("should fail");
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn directions_not_found_is_status_error() {
        let err = directions(r#"{"status":"NOT_FOUND"}"#).expect_err("should fail");
        assert_eq!(err.code(), "status");
    }

    #[test]
    fn waypoints_param_requests_optimization() {
        let param = format_waypoints(&[Coordinates::new(1.5, 2.0), Coordinates::new(-3.0, 4.25)]);
        assert_eq!(param.as_deref(), Some("optimize:true|1.5,2|-3,4.25"));
        assert_eq!(format_waypoints(&[]), None);
    }
}
