//! Stop management use-cases around the sequencing engine.
//!
//! # Responsibility
//! - Append stops at the end of a route's current order.
//! - Record visit status transitions and report route progress.
//!
//! # Invariants
//! - A new stop's `sort_order` is one past the route's current maximum.
//! - `completed_at` is stamped when leaving `pending` and cleared on return.

use crate::clock::now_epoch_ms;
use crate::model::route::{Route, RouteId, RouteProgress};
use crate::model::stop::{Stop, StopId, StopStatus};
use crate::repo::route_repo::RouteStore;
use crate::repo::stop_repo::{RepoError, StopStore};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for stop use-cases.
#[derive(Debug)]
pub enum StopServiceError {
    /// Address is blank after trim.
    EmptyAddress,
    RouteNotFound(RouteId),
    StopNotFound(StopId),
    Repo(RepoError),
}

impl Display for StopServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAddress => write!(f, "stop address must not be blank"),
            Self::RouteNotFound(id) => write!(f, "route not found: {id}"),
            Self::StopNotFound(id) => write!(f, "stop not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StopServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StopServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StopNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Optional contact details captured with a new stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStop {
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl NewStop {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

/// Stop/route facade over store implementations.
pub struct StopService<S: StopStore, R: RouteStore> {
    stops: S,
    routes: R,
}

impl<S: StopStore, R: RouteStore> StopService<S, R> {
    pub fn new(stops: S, routes: R) -> Self {
        Self { stops, routes }
    }

    pub fn create_route(
        &self,
        rep_id: impl Into<String>,
        route_date: impl Into<String>,
        title: Option<String>,
    ) -> Result<Route, StopServiceError> {
        let mut route = Route::new(rep_id, route_date);
        route.title = trim_optional(title);
        self.routes.create_route(&route)?;
        info!(
            "event=route_create module=service status=ok route={}",
            route.uuid
        );
        Ok(route)
    }

    /// Appends a stop after the route's current last position.
    pub fn add_stop(&self, route_id: RouteId, input: NewStop) -> Result<Stop, StopServiceError> {
        let address = input.address.trim();
        if address.is_empty() {
            return Err(StopServiceError::EmptyAddress);
        }
        if self.routes.get_route(route_id)?.is_none() {
            return Err(StopServiceError::RouteNotFound(route_id));
        }

        let next_sort_order = self
            .stops
            .max_sort_order(route_id)?
            .map_or(0, |max| max + 1);
        let mut stop = Stop::new(route_id, address, next_sort_order);
        stop.phone = trim_optional(input.phone);
        stop.email = trim_optional(input.email);
        stop.notes = trim_optional(input.notes);

        self.stops.create_stop(&stop)?;
        info!(
            "event=stop_add module=service status=ok route={} stop={} sort_order={}",
            route_id, stop.uuid, next_sort_order
        );
        Ok(stop)
    }

    /// Lists a route's stops in visiting order.
    pub fn list_stops(&self, route_id: RouteId) -> Result<Vec<Stop>, StopServiceError> {
        Ok(self.stops.list_stops(route_id)?)
    }

    /// Moves a stop to `status`, stamping or clearing `completed_at`.
    pub fn set_status(
        &self,
        stop_id: StopId,
        status: StopStatus,
    ) -> Result<Stop, StopServiceError> {
        let completed_at = match status {
            StopStatus::Pending => None,
            StopStatus::Finished | StopStatus::Skipped => Some(now_epoch_ms()),
        };
        self.stops.set_stop_status(stop_id, status, completed_at)?;
        self.stops
            .get_stop(stop_id)?
            .ok_or(StopServiceError::StopNotFound(stop_id))
    }

    pub fn delete_stop(&self, stop_id: StopId) -> Result<(), StopServiceError> {
        Ok(self.stops.delete_stop(stop_id)?)
    }

    pub fn route_progress(&self, route_id: RouteId) -> Result<RouteProgress, StopServiceError> {
        if self.routes.get_route(route_id)?.is_none() {
            return Err(StopServiceError::RouteNotFound(route_id));
        }
        Ok(self.routes.route_progress(route_id)?)
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::trim_optional;

    #[test]
    fn trim_optional_drops_blank_values() {
        assert_eq!(trim_optional(Some("  ".to_string())), None);
        assert_eq!(trim_optional(Some(" 555 ".to_string())), Some("555".to_string()));
        assert_eq!(trim_optional(None), None);
    }
}
