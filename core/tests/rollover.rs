//! Midnight: growth, the daily settlement, and the day-based challenges.

use transit_core::{
    challenge::ChallengeKind,
    engine::SimEngine,
    map::{PointKind, PointOfInterest, WorldMap},
    network::{Route, TransportType},
    state::SimulationState,
};

fn point(id: &str, x: i32, y: i32, kind: PointKind) -> PointOfInterest {
    PointOfInterest { id: id.into(), x, y, kind, capacity: 40 }
}

/// Four points, a bike lane a–b, and four citizens stuck between c and d.
fn engine_with_stranded_commuters() -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = SimEngine::build_test("rollover-test", 17).expect("engine");
    let mut state = SimulationState::new(WorldMap::new(40, 30), 600);
    state.points.insert(point("a", 5, 5, PointKind::Residential));
    state.points.insert(point("b", 12, 5, PointKind::Office));
    state.points.insert(point("c", 5, 20, PointKind::School));
    state.points.insert(point("d", 30, 20, PointKind::Leisure));
    state.routes.push(Route { start: "a".into(), end: "b".into(), kind: TransportType::BikeLane });
    for _ in 0..4 {
        state.citizens.push_at("c".into(), "d".into());
    }
    engine.load_world(state).expect("load world");
    engine
}

fn current(engine: &SimEngine, kind: ChallengeKind) -> f64 {
    engine.state().challenges.get(kind).expect("every kind is on the board").current
}

#[test]
fn first_midnight_settles_and_grows_the_city() {
    let mut engine = engine_with_stranded_commuters();

    engine.run_ticks(23).expect("rest of day 1");
    assert_eq!(engine.clock.day, 1);
    assert_eq!(engine.state().citizens.len(), 4, "no growth before midnight");
    assert_eq!(engine.state().points.len(), 4);
    assert_eq!(engine.state().resources, 600, "no settlement before midnight");
    assert_eq!(engine.state().satisfaction, 0, "stranded all day");

    engine.run_ticks(1).expect("midnight");
    let state = engine.state();
    assert_eq!((engine.clock.day, engine.clock.time), (2, 0));
    // 100 base income, nobody satisfied, one route at day 1's upkeep of 5.
    assert_eq!(state.resources, 695);
    assert_eq!(state.citizens.len(), 9, "five daily citizens, no expansion yet");
    assert!((5..=6).contains(&state.points.len()), "one or two new points, got {}", state.points.len());
    let planning = state.challenges.get(ChallengeKind::Planning).unwrap();
    assert_eq!(planning.target, state.points.len() as f64);

    assert_eq!(current(&engine, ChallengeKind::Sustainability), 2.0);
    assert_eq!(current(&engine, ChallengeKind::Efficiency), 0.0);
    assert_eq!(current(&engine, ChallengeKind::Satisfaction), 0.0);
    assert_eq!(current(&engine, ChallengeKind::Economy), 695.0);
    assert_eq!(engine.store_event_count("daily_settlement").unwrap(), 1);
    assert_eq!(engine.store_event_count("day_started").unwrap(), 1);
}

#[test]
fn third_day_adds_the_expansion_batch_and_inflated_upkeep() {
    let mut engine = engine_with_stranded_commuters();
    engine.run_ticks(24).expect("day 1");
    let points_on_day_two = engine.state().points.len();

    engine.run_ticks(23).expect("rest of day 2");
    let resources = engine.state().resources;
    let satisfied = engine.state().citizens.satisfied_count() as i64;
    let satisfaction = engine.state().satisfaction;
    assert_eq!(engine.state().citizens.len(), 9);

    engine.run_ticks(1).expect("midnight");
    let state = engine.state();
    assert_eq!(engine.clock.day, 3);
    // Income on the citizens satisfied as day 2 ended; one route at day 2's
    // upkeep, 5 * 1.1 rounded.
    assert_eq!(state.resources, resources + 100 + 10 * satisfied - 6);
    assert_eq!(state.citizens.len(), 9 + 5 + 10, "daily batch plus one expansion step");
    let added = state.points.len() - points_on_day_two;
    assert!((1..=2).contains(&added), "added {added} points");

    assert_eq!(current(&engine, ChallengeKind::Sustainability), 3.0);
    assert_eq!(current(&engine, ChallengeKind::Efficiency), f64::from(satisfaction));
    assert_eq!(current(&engine, ChallengeKind::Economy), state.resources as f64);
    assert_eq!(engine.store_event_count("daily_settlement").unwrap(), 2);
}
