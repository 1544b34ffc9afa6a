mod common;

use common::ScriptedRouter;
use routeplan_core::{
    Coordinates, ExternalOrder, ExternalRouteOptimizer, GeocodedStop, ProviderError,
    UnavailableReason,
};
use std::sync::Arc;
use uuid::Uuid;

fn stops(count: usize) -> Vec<GeocodedStop> {
    (0..count)
        .map(|i| GeocodedStop {
            id: Uuid::new_v4(),
            address: format!("{i} Main St"),
            coordinates: Coordinates::new(0.0, i as f64 * 0.001),
            sort_order: i as i64,
        })
        .collect()
}

fn identity_router(interior: usize) -> Arc<ScriptedRouter> {
    Arc::new(ScriptedRouter::new(Ok((0..interior).collect())))
}

#[test]
fn more_than_25_stops_never_reach_provider() {
    let router = identity_router(24);
    let optimizer = ExternalRouteOptimizer::new(router.clone());

    let outcome = optimizer.optimize(&stops(26));
    assert_eq!(
        outcome,
        ExternalOrder::Unavailable(UnavailableReason::WaypointLimitExceeded {
            stops: 26,
            limit: 25
        })
    );
    assert_eq!(router.calls(), 0);
}

#[test]
fn exactly_25_stops_are_sent_with_23_waypoints() {
    let router = identity_router(23);
    let optimizer = ExternalRouteOptimizer::new(router.clone());
    let input = stops(25);

    let outcome = optimizer.optimize(&input);
    let expected: Vec<Uuid> = input.iter().map(|stop| stop.id).collect();
    assert_eq!(outcome, ExternalOrder::Optimized(expected));
    assert_eq!(router.calls(), 1);
    assert_eq!(router.last_waypoint_count(), 23);
}

#[test]
fn lower_configured_limit_is_honoured() {
    let router = identity_router(3);
    let optimizer = ExternalRouteOptimizer::new(router.clone()).with_max_waypoints(4);

    assert!(matches!(
        optimizer.optimize(&stops(5)),
        ExternalOrder::Unavailable(UnavailableReason::WaypointLimitExceeded { limit: 4, .. })
    ));
    assert_eq!(router.calls(), 0);
}

#[test]
fn two_stops_keep_origin_and_destination() {
    let router = identity_router(0);
    let optimizer = ExternalRouteOptimizer::new(router.clone());
    let input = stops(2);

    assert_eq!(
        optimizer.optimize(&input),
        ExternalOrder::Optimized(vec![input[0].id, input[1].id])
    );
    assert_eq!(router.last_waypoint_count(), 0);
}

#[test]
fn unconfigured_or_tiny_input_is_unavailable() {
    assert_eq!(
        ExternalRouteOptimizer::disabled().optimize(&stops(3)),
        ExternalOrder::Unavailable(UnavailableReason::NotConfigured)
    );

    let router = identity_router(0);
    let optimizer = ExternalRouteOptimizer::new(router.clone());
    assert_eq!(
        optimizer.optimize(&stops(1)),
        ExternalOrder::Unavailable(UnavailableReason::TooFewStops(1))
    );
    assert_eq!(router.calls(), 0);
}

#[test]
fn provider_errors_and_bad_orders_are_unavailable() {
    let failing = Arc::new(ScriptedRouter::new(Err(ProviderError::Transport(
        "timed out".to_string(),
    ))));
    assert!(matches!(
        ExternalRouteOptimizer::new(failing).optimize(&stops(4)),
        ExternalOrder::Unavailable(UnavailableReason::Provider(ProviderError::Transport(_)))
    ));

    let out_of_range = Arc::new(ScriptedRouter::new(Ok(vec![0, 5])));
    assert!(matches!(
        ExternalRouteOptimizer::new(out_of_range).optimize(&stops(4)),
        ExternalOrder::Unavailable(UnavailableReason::InvalidOrder(_))
    ));
}
