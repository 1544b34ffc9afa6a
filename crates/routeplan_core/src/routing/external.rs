//! External route optimizer.
//!
//! # Responsibility
//! - Ask a `RoutingProvider` to reorder the interior stops of a route.
//! - Rebuild the full stop order from the provider's waypoint permutation.
//!
//! # Invariants
//! - The first stop stays the origin and the last stop stays the destination.
//! - Routes above the waypoint limit never reach the provider.
//! - Every failure becomes `ExternalOrder::Unavailable`; nothing is raised.

use crate::config::PROVIDER_WAYPOINT_LIMIT;
use crate::model::stop::{Coordinates, GeocodedStop, StopId};
use crate::provider::{ProviderError, RoutingProvider, TravelMode};
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Result of one external optimization attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalOrder {
    /// Full visiting order: origin, reordered interior, destination.
    Optimized(Vec<StopId>),
    Unavailable(UnavailableReason),
}

/// Why the provider path was not taken.
#[derive(Debug, Clone, PartialEq)]
pub enum UnavailableReason {
    NotConfigured,
    TooFewStops(usize),
    WaypointLimitExceeded { stops: usize, limit: usize },
    Provider(ProviderError),
    /// Returned order is not a permutation of the interior indices.
    InvalidOrder(Vec<usize>),
}

impl Display for UnavailableReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "routing provider not configured"),
            Self::TooFewStops(count) => write!(f, "need at least 2 stops, got {count}"),
            Self::WaypointLimitExceeded { stops, limit } => {
                write!(f, "{stops} stops exceed the provider limit of {limit}")
            }
            Self::Provider(err) => write!(f, "{err}"),
            Self::InvalidOrder(order) => write!(f, "provider returned invalid order {order:?}"),
        }
    }
}

impl UnavailableReason {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::TooFewStops(_) => "too_few_stops",
            Self::WaypointLimitExceeded { .. } => "waypoint_limit",
            Self::Provider(err) => err.code(),
            Self::InvalidOrder(_) => "invalid_order",
        }
    }
}

/// Optional routing provider plus its request limits.
#[derive(Clone)]
pub struct ExternalRouteOptimizer {
    provider: Option<Arc<dyn RoutingProvider>>,
    max_waypoints: usize,
    mode: TravelMode,
}

impl Default for ExternalRouteOptimizer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ExternalRouteOptimizer {
    pub fn new(provider: Arc<dyn RoutingProvider>) -> Self {
        Self {
            provider: Some(provider),
            max_waypoints: PROVIDER_WAYPOINT_LIMIT,
            mode: TravelMode::Walking,
        }
    }

    /// An optimizer that always reports `NotConfigured`.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            max_waypoints: PROVIDER_WAYPOINT_LIMIT,
            mode: TravelMode::Walking,
        }
    }

    /// Caps the total stop count; values above the provider limit are clamped.
    pub fn with_max_waypoints(mut self, max_waypoints: usize) -> Self {
        self.max_waypoints = max_waypoints.min(PROVIDER_WAYPOINT_LIMIT);
        self
    }

    pub fn with_travel_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Attempts a provider-optimized order for `stops`.
    pub fn optimize(&self, stops: &[GeocodedStop]) -> ExternalOrder {
        let outcome = self.try_optimize(stops);
        match &outcome {
            ExternalOrder::Optimized(order) => info!(
                "event=external_optimize module=routing status=ok stops={}",
                order.len()
            ),
            ExternalOrder::Unavailable(reason) => warn!(
                "event=external_optimize module=routing status=unavailable stops={} reason={} detail={}",
                stops.len(),
                reason.code(),
                reason
            ),
        }
        outcome
    }

    fn try_optimize(&self, stops: &[GeocodedStop]) -> ExternalOrder {
        let Some(provider) = self.provider.as_deref() else {
            return ExternalOrder::Unavailable(UnavailableReason::NotConfigured);
        };
        let (origin, destination, interior) = match stops {
            [origin, interior @ .., destination] => (origin, destination, interior),
            _ => return ExternalOrder::Unavailable(UnavailableReason::TooFewStops(stops.len())),
        };
        if stops.len() > self.max_waypoints {
            return ExternalOrder::Unavailable(UnavailableReason::WaypointLimitExceeded {
                stops: stops.len(),
                limit: self.max_waypoints,
            });
        }

        let waypoints: Vec<Coordinates> = interior.iter().map(|stop| stop.coordinates).collect();
        let order = match provider.optimize_waypoints(
            origin.coordinates,
            destination.coordinates,
            &waypoints,
            self.mode,
        ) {
            Ok(order) => order,
            Err(err) => return ExternalOrder::Unavailable(UnavailableReason::Provider(err)),
        };

        if !is_permutation(&order, interior.len()) {
            return ExternalOrder::Unavailable(UnavailableReason::InvalidOrder(order));
        }

        let mut ids = Vec::with_capacity(stops.len());
        ids.push(origin.id);
        ids.extend(order.iter().map(|&index| interior[index].id));
        ids.push(destination.id);
        ExternalOrder::Optimized(ids)
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
