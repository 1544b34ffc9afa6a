#![allow(dead_code)]

use routeplan_core::{
    Coordinates, Geocoder, ProviderError, Route, RouteStore, RoutingProvider, SqliteRouteRepository,
    SqliteStopRepository, Stop, StopId, StopStore, TravelMode,
};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const FIXED_NOW_MS: i64 = 1_700_000_000_000;

pub fn fixed_clock() -> i64 {
    FIXED_NOW_MS
}

pub fn seed_route(conn: &Connection) -> Route {
    let route = Route::new("rep-1", "2024-05-01");
    SqliteRouteRepository::new(conn)
        .create_route(&route)
        .unwrap();
    route
}

pub fn seed_stop(
    conn: &Connection,
    route: &Route,
    address: &str,
    sort_order: i64,
    coordinates: Option<Coordinates>,
) -> Stop {
    let mut stop = Stop::new(route.uuid, address, sort_order);
    if let Some(coordinates) = coordinates {
        stop = stop.with_coordinates(coordinates);
        stop.geocode_provider = Some("seed".to_string());
        stop.geocoded_at = Some(1);
    }
    SqliteStopRepository::new(conn).create_stop(&stop).unwrap();
    stop
}

pub fn sort_order_of(conn: &Connection, stop_id: StopId) -> i64 {
    SqliteStopRepository::new(conn)
        .get_stop(stop_id)
        .unwrap()
        .unwrap()
        .sort_order
}

/// Stop ids of a route in committed visiting order.
pub fn committed_order(conn: &Connection, route: &Route) -> Vec<StopId> {
    SqliteStopRepository::new(conn)
        .list_stops(route.uuid)
        .unwrap()
        .into_iter()
        .map(|stop| stop.uuid)
        .collect()
}

/// Geocoder backed by a fixed address table; unknown addresses fail.
pub struct TableGeocoder {
    known: HashMap<String, Coordinates>,
    calls: Mutex<Vec<String>>,
}

impl TableGeocoder {
    pub fn new(entries: &[(&str, Coordinates)]) -> Self {
        Self {
            known: entries
                .iter()
                .map(|(address, coords)| ((*address).to_string(), *coords))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Geocoder for TableGeocoder {
    fn provider_name(&self) -> &str {
        "table"
    }

    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ProviderError> {
        self.calls.lock().unwrap().push(address.to_string());
        match self.known.get(address) {
            Some(coords) => Ok(Some(*coords)),
            None => Err(ProviderError::Transport("connection reset".to_string())),
        }
    }
}

/// Routing provider returning a scripted answer and counting calls.
pub struct ScriptedRouter {
    answer: Result<Vec<usize>, ProviderError>,
    calls: AtomicUsize,
    last_waypoint_count: AtomicUsize,
}

impl ScriptedRouter {
    pub fn new(answer: Result<Vec<usize>, ProviderError>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            last_waypoint_count: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_waypoint_count(&self) -> usize {
        self.last_waypoint_count.load(Ordering::SeqCst)
    }
}

impl RoutingProvider for ScriptedRouter {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn optimize_waypoints(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
        waypoints: &[Coordinates],
        mode: TravelMode,
    ) -> Result<Vec<usize>, ProviderError> {
        assert_eq!(mode, TravelMode::Walking);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_waypoint_count
            .store(waypoints.len(), Ordering::SeqCst);
        self.answer.clone()
    }
}
