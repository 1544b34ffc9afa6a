mod common;

use common::{seed_route, seed_stop};
use routeplan_core::db::open_db_in_memory;
use routeplan_core::{
    Coordinates, RepoError, Route, RouteStore, SqliteRouteRepository, SqliteStopRepository,
    StopStatus, StopStore,
};
use uuid::Uuid;

#[test]
fn list_stops_orders_by_sort_order() {
    let conn = open_db_in_memory().unwrap();
    let route = seed_route(&conn);
    let third = seed_stop(&conn, &route, "3 Main St", 7, None);
    let first = seed_stop(&conn, &route, "1 Main St", 0, None);
    let second = seed_stop(&conn, &route, "2 Main St", 2, None);

    let other_route = seed_route(&conn);
    seed_stop(&conn, &other_route, "elsewhere", 1, None);

    let ids: Vec<Uuid> = SqliteStopRepository::new(&conn)
        .list_stops(route.uuid)
        .unwrap()
        .into_iter()
        .map(|stop| stop.uuid)
        .collect();
    assert_eq!(ids, vec![first.uuid, second.uuid, third.uuid]);
}

#[test]
fn update_coordinates_persists_provenance() {
    let conn = open_db_in_memory().unwrap();
    let route = seed_route(&conn);
    let stop = seed_stop(&conn, &route, "1 Main St", 0, None);
    let repo = SqliteStopRepository::new(&conn);

    repo.update_stop_coordinates(stop.uuid, Coordinates::new(45.5, -122.6), "google", 42)
        .unwrap();

    let loaded = repo.get_stop(stop.uuid).unwrap().unwrap();
    assert_eq!(loaded.coordinates, Some(Coordinates::new(45.5, -122.6)));
    assert_eq!(loaded.geocode_provider.as_deref(), Some("google"));
    assert_eq!(loaded.geocoded_at, Some(42));
    assert_eq!(loaded.sort_order, 0);
}

#[test]
fn update_coordinates_rejects_out_of_range() {
    let conn = open_db_in_memory().unwrap();
    let route = seed_route(&conn);
    let stop = seed_stop(&conn, &route, "1 Main St", 0, None);

    let err = SqliteStopRepository::new(&conn)
        .update_stop_coordinates(stop.uuid, Coordinates::new(0.0, 200.0), "google", 1)
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn updates_on_missing_rows_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let stops = SqliteStopRepository::new(&conn);
    let routes = SqliteRouteRepository::new(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        stops.update_stop_order(missing, 1).unwrap_err(),
        RepoError::NotFound(id) if id == missing
    ));
    assert!(matches!(
        stops
            .update_stop_coordinates(missing, Coordinates::new(1.0, 1.0), "google", 1)
            .unwrap_err(),
        RepoError::NotFound(_)
    ));
    assert!(matches!(
        routes.update_last_optimized(missing, 1).unwrap_err(),
        RepoError::NotFound(_)
    ));
    assert!(matches!(
        stops.delete_stop(missing).unwrap_err(),
        RepoError::NotFound(_)
    ));
}

#[test]
fn update_order_rejects_negative_values() {
    let conn = open_db_in_memory().unwrap();
    let route = seed_route(&conn);
    let stop = seed_stop(&conn, &route, "1 Main St", 0, None);

    let err = SqliteStopRepository::new(&conn)
        .update_stop_order(stop.uuid, -1)
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn status_updates_track_completion_time() {
    let conn = open_db_in_memory().unwrap();
    let route = seed_route(&conn);
    let stop = seed_stop(&conn, &route, "1 Main St", 0, None);
    let repo = SqliteStopRepository::new(&conn);

    repo.set_stop_status(stop.uuid, StopStatus::Finished, Some(99))
        .unwrap();
    let loaded = repo.get_stop(stop.uuid).unwrap().unwrap();
    assert_eq!(loaded.status, StopStatus::Finished);
    assert_eq!(loaded.completed_at, Some(99));

    let err = repo
        .set_stop_status(stop.uuid, StopStatus::Pending, Some(5))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn max_sort_order_reports_empty_route_as_none() {
    let conn = open_db_in_memory().unwrap();
    let route = seed_route(&conn);
    let repo = SqliteStopRepository::new(&conn);

    assert_eq!(repo.max_sort_order(route.uuid).unwrap(), None);
    seed_stop(&conn, &route, "1 Main St", 4, None);
    seed_stop(&conn, &route, "2 Main St", 9, None);
    assert_eq!(repo.max_sort_order(route.uuid).unwrap(), Some(9));
}

#[test]
fn route_roundtrip_and_last_optimized() {
    let conn = open_db_in_memory().unwrap();
    let routes = SqliteRouteRepository::new(&conn);

    let mut route = Route::new("rep-7", "2024-06-02");
    route.title = Some("North side".to_string());
    routes.create_route(&route).unwrap();

    routes.update_last_optimized(route.uuid, 1234).unwrap();
    let loaded = routes.get_route(route.uuid).unwrap().unwrap();
    assert_eq!(loaded.title.as_deref(), Some("North side"));
    assert_eq!(loaded.last_optimized_at, Some(1234));
    assert!(routes.get_route(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn route_progress_counts_statuses() {
    let conn = open_db_in_memory().unwrap();
    let route = seed_route(&conn);
    let stops = SqliteStopRepository::new(&conn);
    let a = seed_stop(&conn, &route, "1 Main St", 0, None);
    let b = seed_stop(&conn, &route, "2 Main St", 1, None);
    seed_stop(&conn, &route, "3 Main St", 2, None);
    stops
        .set_stop_status(a.uuid, StopStatus::Finished, Some(1))
        .unwrap();
    stops
        .set_stop_status(b.uuid, StopStatus::Skipped, Some(2))
        .unwrap();

    let progress = SqliteRouteRepository::new(&conn)
        .route_progress(route.uuid)
        .unwrap();
    assert_eq!(progress.total, 3);
    assert_eq!(progress.finished, 1);
    assert_eq!(progress.skipped, 1);
    assert_eq!(progress.pending, 1);
    assert_eq!(progress.completed(), 2);

    let empty = SqliteRouteRepository::new(&conn)
        .route_progress(Uuid::new_v4())
        .unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.finished, 0);
}
