//! Route optimization use-case.
//!
//! # Responsibility
//! - Run one sequencing pass: load, resolve, gate, sequence, commit, report.
//! - Pick between the external optimizer and the nearest-neighbor fallback.
//!
//! # Invariants
//! - Load and gate failures happen before any `sort_order` write.
//! - Coordinates are persisted per stop as soon as they resolve.
//! - Stops that stay ungeocoded keep their previous `sort_order`.
//! - Commit failures are not rolled back; earlier writes stay committed.
//!
//! Runs on the same route are not locked against each other; callers must
//! serialize them.

use crate::clock::now_epoch_ms;
use crate::geo::heuristic::{nearest_neighbor_order, SequencePoint};
use crate::geocode::resolver::CoordinateResolver;
use crate::model::route::RouteId;
use crate::model::stop::{GeocodedStop, Stop, StopId};
use crate::repo::route_repo::RouteStore;
use crate::repo::stop_repo::{RepoError, StopStore};
use crate::routing::external::{ExternalOrder, ExternalRouteOptimizer};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Fewest geocoded stops worth sequencing.
const MIN_SEQUENCED_STOPS: usize = 2;

/// Which sequencer produced the committed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMethod {
    External,
    Heuristic,
}

impl OptimizeMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Successful optimization report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizeOutcome {
    pub method: OptimizeMethod,
    pub stops_reordered: usize,
    /// Stops left out because they could not be geocoded.
    pub stops_skipped: usize,
    pub message: String,
}

/// Fatal optimization failures.
#[derive(Debug)]
pub enum OptimizeError {
    /// Route has no stops at all.
    NotFound(RouteId),
    /// Fewer than two stops have coordinates.
    InsufficientData { route_id: RouteId, geocoded: usize },
    /// A store read or commit write failed.
    Persistence(RepoError),
}

impl OptimizeError {
    /// Stable error kind for callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::Persistence(_) => "persistence_failure",
        }
    }
}

impl Display for OptimizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(route_id) => write!(f, "no stops found for route {route_id}"),
            Self::InsufficientData { geocoded, .. } => write!(
                f,
                "not enough geocoded stops to optimize ({geocoded} of {MIN_SEQUENCED_STOPS} needed); check the stop addresses"
            ),
            Self::Persistence(err) => write!(f, "failed to persist route order: {err}"),
        }
    }
}

impl Error for OptimizeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for OptimizeError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Route sequencing orchestrator.
pub struct OptimizeService<S: StopStore, R: RouteStore> {
    stops: S,
    routes: R,
    resolver: CoordinateResolver,
    optimizer: ExternalRouteOptimizer,
    clock: fn() -> i64,
}

impl<S: StopStore, R: RouteStore> OptimizeService<S, R> {
    /// Creates a service with no providers; every run uses the heuristic.
    pub fn new(stops: S, routes: R) -> Self {
        Self {
            stops,
            routes,
            resolver: CoordinateResolver::disabled(),
            optimizer: ExternalRouteOptimizer::disabled(),
            clock: now_epoch_ms,
        }
    }

    pub fn with_resolver(mut self, resolver: CoordinateResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_optimizer(mut self, optimizer: ExternalRouteOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Overrides the timestamp source used for `geocoded_at` and
    /// `last_optimized_at`.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Runs one full optimization pass for `route_id`.
    pub fn optimize_route(&self, route_id: RouteId) -> Result<OptimizeOutcome, OptimizeError> {
        let started_at = Instant::now();
        let result = self.run(route_id);
        match &result {
            Ok(outcome) => info!(
                "event=route_optimize module=service status=ok route={} method={} reordered={} skipped={} duration_ms={}",
                route_id,
                outcome.method.as_str(),
                outcome.stops_reordered,
                outcome.stops_skipped,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=route_optimize module=service status=error route={} error_code={} duration_ms={} error={}",
                route_id,
                err.kind(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn run(&self, route_id: RouteId) -> Result<OptimizeOutcome, OptimizeError> {
        let stops = self.stops.list_stops(route_id)?;
        if stops.is_empty() {
            return Err(OptimizeError::NotFound(route_id));
        }

        let total = stops.len();
        let geocoded = self.resolve_missing(stops);
        if geocoded.len() < MIN_SEQUENCED_STOPS {
            return Err(OptimizeError::InsufficientData {
                route_id,
                geocoded: geocoded.len(),
            });
        }

        let (method, order) = self.sequence(&geocoded);
        self.commit(route_id, &order)?;

        Ok(OptimizeOutcome {
            method,
            stops_reordered: order.len(),
            stops_skipped: total - geocoded.len(),
            message: summary_message(method, order.len(), total - geocoded.len()),
        })
    }

    /// Geocodes stops lacking coordinates, one at a time, and returns every
    /// stop that ends up with coordinates in load order.
    fn resolve_missing(&self, stops: Vec<Stop>) -> Vec<GeocodedStop> {
        let mut geocoded = Vec::with_capacity(stops.len());
        for mut stop in stops {
            if !stop.is_geocoded() {
                self.resolve_stop(&mut stop);
            }
            if let Some(view) = stop.to_geocoded() {
                geocoded.push(view);
            }
        }
        geocoded
    }

    fn resolve_stop(&self, stop: &mut Stop) {
        let (Some(coordinates), Some(provider)) =
            (self.resolver.resolve(&stop.address), self.resolver.provider_name())
        else {
            warn!(
                "event=stop_geocode module=service status=unresolved stop={}",
                stop.uuid
            );
            return;
        };

        let geocoded_at = (self.clock)();
        match self
            .stops
            .update_stop_coordinates(stop.uuid, coordinates, provider, geocoded_at)
        {
            Ok(()) => {
                stop.coordinates = Some(coordinates);
                stop.geocode_provider = Some(provider.to_string());
                stop.geocoded_at = Some(geocoded_at);
            }
            Err(err) => warn!(
                "event=stop_geocode module=service status=error stop={} error_code=persist_failed error={}",
                stop.uuid, err
            ),
        }
    }

    fn sequence(&self, geocoded: &[GeocodedStop]) -> (OptimizeMethod, Vec<StopId>) {
        if let ExternalOrder::Optimized(order) = self.optimizer.optimize(geocoded) {
            return (OptimizeMethod::External, order);
        }

        let points: Vec<SequencePoint> = geocoded
            .iter()
            .map(|stop| SequencePoint {
                id: stop.id,
                coordinates: stop.coordinates,
            })
            .collect();
        (OptimizeMethod::Heuristic, nearest_neighbor_order(&points))
    }

    fn commit(&self, route_id: RouteId, order: &[StopId]) -> Result<(), OptimizeError> {
        for (position, stop_id) in order.iter().enumerate() {
            let sort_order = i64::try_from(position).unwrap_or(i64::MAX);
            if let Err(err) = self.stops.update_stop_order(*stop_id, sort_order) {
                error!(
                    "event=route_commit module=service status=error route={} stop={} committed={} error={}",
                    route_id, stop_id, position, err
                );
                return Err(err.into());
            }
        }
        self.routes.update_last_optimized(route_id, (self.clock)())?;
        Ok(())
    }
}

fn summary_message(method: OptimizeMethod, reordered: usize, skipped: usize) -> String {
    let base = match method {
        OptimizeMethod::External => {
            format!("Route optimized with the mapping provider ({reordered} stops)")
        }
        OptimizeMethod::Heuristic => format!(
            "Route optimized with the nearest-neighbor fallback ({reordered} stops; provider not configured or unavailable)"
        ),
    };
    if skipped == 0 {
        base
    } else {
        format!("{base}; {skipped} stop(s) could not be geocoded and kept their position")
    }
}
