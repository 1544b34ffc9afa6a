//! Route sequencing core.
//!
//! Turns a route's stops into a walking-efficient visiting order: missing
//! coordinates are geocoded, an external routing provider is tried when it
//! is configured and the route fits its waypoint limit, and a nearest-neighbor
//! heuristic is used otherwise. The result is committed as each stop's
//! `sort_order`.

pub mod clock;
pub mod config;
pub mod db;
pub mod geo;
pub mod geocode;
pub mod logging;
pub mod model;
pub mod provider;
pub mod repo;
pub mod routing;
pub mod service;

pub use config::EngineConfig;
pub use geo::distance::haversine_km;
pub use geo::heuristic::{nearest_neighbor_order, SequencePoint};
pub use geocode::resolver::CoordinateResolver;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::route::{Route, RouteId, RouteProgress};
pub use model::stop::{Coordinates, GeocodedStop, Stop, StopId, StopStatus, StopValidationError};
pub use provider::google::GoogleMapsClient;
pub use provider::{Geocoder, ProviderError, RoutingProvider, TravelMode};
pub use repo::route_repo::{RouteStore, SqliteRouteRepository};
pub use repo::stop_repo::{RepoError, RepoResult, SqliteStopRepository, StopStore};
pub use routing::external::{ExternalOrder, ExternalRouteOptimizer, UnavailableReason};
pub use service::optimize_service::{
    OptimizeError, OptimizeMethod, OptimizeOutcome, OptimizeService,
};
pub use service::stop_service::{NewStop, StopService, StopServiceError};

use std::sync::Arc;

/// Builds an optimization service wired to the providers `config` enables.
///
/// Without an API key the service geocodes nothing and always sequences with
/// the heuristic.
///
/// # Errors
/// Returns `ProviderError::Transport` if the HTTP client cannot be created.
pub fn optimize_service_from_config<S: StopStore, R: RouteStore>(
    stops: S,
    routes: R,
    config: &EngineConfig,
) -> Result<OptimizeService<S, R>, ProviderError> {
    let service = OptimizeService::new(stops, routes);
    let Some(client) = GoogleMapsClient::from_config(config)? else {
        return Ok(service);
    };

    let client = Arc::new(client);
    let optimizer = ExternalRouteOptimizer::new(client.clone())
        .with_max_waypoints(config.max_waypoints)
        .with_travel_mode(config.travel_mode);
    Ok(service
        .with_resolver(CoordinateResolver::new(client))
        .with_optimizer(optimizer))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
