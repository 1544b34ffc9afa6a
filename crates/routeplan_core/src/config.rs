//! Engine configuration.
//!
//! # Responsibility
//! - Carry provider credentials, endpoints and limits into the engine.
//! - Load overrides from the process environment.
//!
//! # Invariants
//! - A blank API key is treated as "not configured".
//! - `max_waypoints` never exceeds the provider's 25-waypoint ceiling.

use crate::provider::google::{DEFAULT_DIRECTIONS_URL, DEFAULT_GEOCODE_URL};
use crate::provider::TravelMode;
use serde::Deserialize;
use std::time::Duration;

pub const ENV_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const ENV_GEOCODE_URL: &str = "ROUTEPLAN_GEOCODE_URL";
pub const ENV_DIRECTIONS_URL: &str = "ROUTEPLAN_DIRECTIONS_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "ROUTEPLAN_REQUEST_TIMEOUT_SECS";

/// Origin + destination + 23 intermediate stops.
pub const PROVIDER_WAYPOINT_LIMIT: usize = 25;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the sequencing engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub google_maps_api_key: Option<String>,
    pub geocode_url: String,
    pub directions_url: String,
    pub request_timeout_secs: u64,
    /// Largest stop count (including origin and destination) sent to the
    /// routing provider.
    pub max_waypoints: usize,
    pub travel_mode: TravelMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            google_maps_api_key: None,
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_waypoints: PROVIDER_WAYPOINT_LIMIT,
            travel_mode: TravelMode::Walking,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a JSON document, then overlays environment variables.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: Self = serde_json::from_str(json)?;
        Ok(parsed.with_overrides(|key| std::env::var(key).ok()))
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.google_maps_api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_GEOCODE_URL).filter(|v| !v.trim().is_empty()) {
            self.geocode_url = url;
        }
        if let Some(url) = lookup(ENV_DIRECTIONS_URL).filter(|v| !v.trim().is_empty()) {
            self.directions_url = url;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS).and_then(|v| v.trim().parse().ok()) {
            self.request_timeout_secs = secs;
        }
        self.max_waypoints = self.max_waypoints.min(PROVIDER_WAYPOINT_LIMIT);
        self
    }

    /// Returns the API key when it is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.google_maps_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
