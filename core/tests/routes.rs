//! Route purchases: distance limits, duplicate pairs, budget, removal.

use transit_core::{
    challenge::ChallengeKind,
    engine::SimEngine,
    map::{PointKind, PointOfInterest, WorldMap},
    network::{RouteRejection, TransportType},
    state::SimulationState,
};

fn point(id: &str, x: i32, y: i32, kind: PointKind) -> PointOfInterest {
    PointOfInterest { id: id.into(), x, y, kind, capacity: 40 }
}

/// Four points: a–b 8 apart, b–c 12 apart, a–d 5 apart. No routes.
fn engine_with_open_field(resources: i64) -> SimEngine {
    let mut engine = SimEngine::build_test("routes-test", 7).expect("engine");
    let mut state = SimulationState::new(WorldMap::new(40, 30), resources);
    state.points.insert(point("a", 5, 5, PointKind::Residential));
    state.points.insert(point("b", 13, 5, PointKind::Office));
    state.points.insert(point("c", 25, 5, PointKind::School));
    state.points.insert(point("d", 5, 10, PointKind::Leisure));
    state.challenges.set_planning_target(4);
    engine.load_world(state).expect("load world");
    engine
}

#[test]
fn bike_lane_within_range_is_bought_for_its_day_one_price() {
    let mut engine = engine_with_open_field(600);

    assert!(engine.add_route("a", "b", TransportType::BikeLane), "8 units is inside the bike limit");
    assert_eq!(engine.state().resources, 500, "day-1 bike lane costs 100");
    assert_eq!(engine.state().routes.len(), 1);
}

#[test]
fn bike_lane_beyond_ten_units_is_rejected_without_charge() {
    let mut engine = engine_with_open_field(600);
    assert!(engine.add_route("a", "b", TransportType::BikeLane));

    let rejected = engine.try_add_route("b", "c", TransportType::BikeLane);
    assert_eq!(rejected, Err(RouteRejection::TooFar { distance: 12.0, limit: 10.0 }));
    assert_eq!(engine.state().resources, 500, "rejection must not charge");
    assert_eq!(engine.state().routes.len(), 1, "rejection must not add a route");

    // Light rail has no distance limit, and 500 exactly covers it.
    assert!(engine.add_route("b", "c", TransportType::LightRail));
    assert_eq!(engine.state().resources, 0);
}

#[test]
fn a_pair_takes_one_route_of_any_type() {
    let mut engine = engine_with_open_field(2_000);
    assert!(engine.add_route("a", "d", TransportType::PedestrianPath));

    for kind in TransportType::ALL {
        assert_eq!(
            engine.try_add_route("d", "a", kind),
            Err(RouteRejection::DuplicatePair),
            "{kind:?} on an already linked pair must be refused in either direction"
        );
    }
    assert_eq!(engine.state().routes.len(), 1);
    assert_eq!(engine.state().resources, 1_950);
}

#[test]
fn unaffordable_route_is_rejected() {
    let mut engine = engine_with_open_field(99);
    assert_eq!(
        engine.try_add_route("a", "b", TransportType::BikeLane),
        Err(RouteRejection::InsufficientFunds { cost: 100, available: 99 })
    );
    assert!(engine.state().routes.is_empty());
    assert_eq!(engine.state().resources, 99);
}

#[test]
fn unknown_points_and_self_loops_are_rejected() {
    let mut engine = engine_with_open_field(600);
    assert!(matches!(
        engine.try_add_route("a", "nowhere", TransportType::LightRail),
        Err(RouteRejection::UnknownPoint { .. })
    ));
    assert_eq!(
        engine.try_add_route("a", "a", TransportType::PedestrianPath),
        Err(RouteRejection::SelfLoop)
    );
    assert_eq!(engine.state().resources, 600);
}

#[test]
fn removing_a_route_refreshes_challenges_without_refund() {
    let mut engine = engine_with_open_field(600);
    assert!(engine.add_route("a", "b", TransportType::BikeLane));
    assert!(engine.add_route("a", "d", TransportType::PedestrianPath));

    let network = |e: &SimEngine| e.state().challenges.get(ChallengeKind::Network).unwrap().current;
    let diversity = |e: &SimEngine| e.state().challenges.get(ChallengeKind::Diversity).unwrap().current;
    assert_eq!(network(&engine), 2.0);
    assert_eq!(diversity(&engine), 2.0);

    assert!(engine.remove_route(7).is_none(), "out-of-range index is a no-op");
    assert_eq!(engine.state().routes.len(), 2);

    let removed = engine.remove_route(0).expect("route 0 exists");
    assert_eq!(removed.kind, TransportType::BikeLane);
    assert_eq!(engine.state().resources, 450, "no refund on removal");
    assert_eq!(network(&engine), 1.0);
    assert_eq!(diversity(&engine), 1.0);
    assert!(
        engine.state().routes.link_between("a", "b").is_none(),
        "adjacency must forget the removed route"
    );
    assert_eq!(engine.state().routes.link_between("d", "a"), Some(TransportType::PedestrianPath));
}

#[test]
fn route_prices_inflate_five_percent_per_day() {
    let mut engine = engine_with_open_field(600);
    assert_eq!(engine.transport_cost(TransportType::BikeLane), 100);
    engine.run_ticks(24).expect("one day");
    assert_eq!(engine.clock.day, 2);
    assert_eq!(engine.transport_cost(TransportType::BikeLane), 105);
    assert_eq!(engine.transport_cost(TransportType::LightRail), 525);
}

#[test]
fn selecting_an_unaffordable_mode_clears_the_selection() {
    let mut engine = engine_with_open_field(120);
    assert_eq!(engine.select_transport(TransportType::BikeLane), Some(TransportType::BikeLane));
    assert_eq!(engine.state().selected_transport, Some(TransportType::BikeLane));

    assert_eq!(engine.select_transport(TransportType::LightRail), None);
    assert_eq!(engine.state().selected_transport, None);
}

#[test]
fn route_changes_are_recorded_in_the_event_log() {
    let mut engine = engine_with_open_field(600);
    engine.add_route("a", "b", TransportType::BikeLane);
    engine.add_route("b", "c", TransportType::BikeLane);
    engine.remove_route(0);
    engine.flush_events().expect("flush");

    assert_eq!(engine.store_event_count("route_added").unwrap(), 1);
    assert_eq!(engine.store_event_count("route_rejected").unwrap(), 1);
    assert_eq!(engine.store_event_count("route_removed").unwrap(), 1);
}

#[test]
fn connecting_every_point_completes_the_planning_challenge() {
    let mut engine = engine_with_open_field(5_000);
    assert!(engine.add_route("a", "b", TransportType::BikeLane));
    assert!(engine.add_route("b", "c", TransportType::ScooterStation));
    let planning = engine.state().challenges.get(ChallengeKind::Planning).unwrap();
    assert_eq!(planning.current, 3.0);
    assert!(!planning.completed, "d is still unconnected");

    assert!(engine.add_route("a", "d", TransportType::PedestrianPath));
    let planning = engine.state().challenges.get(ChallengeKind::Planning).unwrap();
    assert!(planning.completed, "all four points connected: {planning:?}");
    engine.flush_events().unwrap();
    assert_eq!(engine.store_event_count("challenge_completed").unwrap(), 1);
}
