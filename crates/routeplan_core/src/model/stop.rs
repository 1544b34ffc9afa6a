//! Stop domain model.
//!
//! # Responsibility
//! - Define the persisted stop record and the engine-only geocoded view.
//! - Validate address, coordinate and ordering fields.
//!
//! # Invariants
//! - `coordinates` holds latitude and longitude as one unit.
//! - `sort_order` is non-negative.
//! - `completed_at` is set only when `status != Pending`.

use crate::model::route::RouteId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a stop.
pub type StopId = Uuid;

/// Visit state of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    Pending,
    Finished,
    Skipped,
}

impl StopStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Finished => "finished",
            Self::Skipped => "skipped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "finished" => Some(Self::Finished),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns whether both components are finite and inside WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Validation failures for stop records.
#[derive(Debug, Clone, PartialEq)]
pub enum StopValidationError {
    EmptyAddress,
    NegativeSortOrder(i64),
    CoordinatesOutOfRange(Coordinates),
    CompletedAtOnPendingStop,
}

impl Display for StopValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAddress => write!(f, "stop address must not be blank"),
            Self::NegativeSortOrder(value) => {
                write!(f, "sort_order must be non-negative, got {value}")
            }
            Self::CoordinatesOutOfRange(coords) => write!(
                f,
                "coordinates out of range: ({}, {})",
                coords.latitude, coords.longitude
            ),
            Self::CompletedAtOnPendingStop => {
                write!(f, "pending stop must not carry completed_at")
            }
        }
    }
}

impl Error for StopValidationError {}

/// Persisted stop record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub uuid: StopId,
    pub route_uuid: RouteId,
    /// Free-text address; the only geocoding input.
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    /// `None` until the first successful geocode.
    pub coordinates: Option<Coordinates>,
    /// Name of the provider that resolved `coordinates`.
    pub geocode_provider: Option<String>,
    /// Unix epoch milliseconds of the geocode.
    pub geocoded_at: Option<i64>,
    pub sort_order: i64,
    pub status: StopStatus,
    /// Unix epoch milliseconds when the stop left `Pending`.
    pub completed_at: Option<i64>,
}

impl Stop {
    /// Creates a pending, ungeocoded stop with a generated ID.
    pub fn new(route_uuid: RouteId, address: impl Into<String>, sort_order: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            route_uuid,
            address: address.into(),
            phone: None,
            email: None,
            notes: None,
            coordinates: None,
            geocode_provider: None,
            geocoded_at: None,
            sort_order,
            status: StopStatus::Pending,
            completed_at: None,
        }
    }

    /// Returns a copy carrying already-resolved coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn is_geocoded(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Checks record-level invariants before persistence and after read-back.
    pub fn validate(&self) -> Result<(), StopValidationError> {
        if self.address.trim().is_empty() {
            return Err(StopValidationError::EmptyAddress);
        }
        if self.sort_order < 0 {
            return Err(StopValidationError::NegativeSortOrder(self.sort_order));
        }
        if let Some(coords) = self.coordinates {
            if !coords.is_valid() {
                return Err(StopValidationError::CoordinatesOutOfRange(coords));
            }
        }
        if self.status == StopStatus::Pending && self.completed_at.is_some() {
            return Err(StopValidationError::CompletedAtOnPendingStop);
        }
        Ok(())
    }

    /// Narrows this stop to the engine view, if coordinates are known.
    pub fn to_geocoded(&self) -> Option<GeocodedStop> {
        self.coordinates.map(|coordinates| GeocodedStop {
            id: self.uuid,
            address: self.address.clone(),
            coordinates,
            sort_order: self.sort_order,
        })
    }
}

/// Engine-only view of a stop whose coordinates are known. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedStop {
    pub id: StopId,
    pub address: String,
    pub coordinates: Coordinates,
    pub sort_order: i64,
}
