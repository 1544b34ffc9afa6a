//! External mapping provider contracts.
//!
//! # Responsibility
//! - Define the geocoding and waypoint-optimization seams used by the engine.
//! - Host concrete HTTP adapters.
//!
//! # Invariants
//! - Provider failures are values (`ProviderError`), never panics.
//! - Callers treat every provider error as a soft failure.

use crate::model::stop::Coordinates;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod google;

/// Failure reported by an external mapping provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Connection, timeout, or HTTP-level failure.
    Transport(String),
    /// Provider answered with a non-success status code.
    Status(String),
    /// Response body did not have the expected shape.
    Malformed(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "provider transport error: {message}"),
            Self::Status(status) => write!(f, "provider returned status `{status}`"),
            Self::Malformed(message) => write!(f, "malformed provider response: {message}"),
        }
    }
}

impl Error for ProviderError {}

impl ProviderError {
    /// Stable short label for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// Travel mode requested from a routing provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Walking,
    Bicycling,
    Driving,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Driving => "driving",
        }
    }
}

/// Resolves free-text addresses to coordinates.
pub trait Geocoder: Send + Sync {
    /// Name persisted as `geocode_provider` on resolved stops.
    fn provider_name(&self) -> &str;
    /// Returns the first candidate's coordinates, or `Ok(None)` for no match.
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ProviderError>;
}

/// Reorders intermediate waypoints between a fixed origin and destination.
pub trait RoutingProvider: Send + Sync {
    fn provider_name(&self) -> &str;
    /// Returns the visiting order of `waypoints` as indices into that slice.
    fn optimize_waypoints(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        waypoints: &[Coordinates],
        mode: TravelMode,
    ) -> Result<Vec<usize>, ProviderError>;
}
