//! World bootstrap — the starting map, starter routes, and first citizens.

use crate::{
    config::SimConfig,
    error::{SimError, SimResult},
    map::{random_position, PointFactory, PointKind},
    network::{Route, TransportType},
    rng::SubsystemRng,
    scoring::calculate_satisfaction,
    state::SimulationState,
};

/// Starter routes, tried in this order until two are built.
const STARTER_MODES: [TransportType; 4] = [
    TransportType::BikeLane,
    TransportType::PedestrianPath,
    TransportType::ScooterStation,
    TransportType::LightRail,
];

const STARTER_ROUTE_COUNT: usize = 2;

/// Build a fresh world: distinct point kinds spread across the map, up to
/// two free starter routes on disjoint point pairs, and the first citizens.
pub fn bootstrap_world(
    config: &SimConfig,
    factory: &dyn PointFactory,
    rng: &mut SubsystemRng,
) -> SimResult<SimulationState> {
    let map = factory.generate_map(config.map.width, config.map.height);
    let mut state = SimulationState::new(map, config.economy.starting_resources);

    let mut kinds = PointKind::ALL.to_vec();
    rng.shuffle(&mut kinds);
    for kind in kinds.iter().cycle().take(config.map.initial_point_count) {
        let Some((x, y)) = random_position(
            &config.map,
            state.points.as_slice(),
            config.map.initial_point_spacing,
            rng,
        ) else {
            break;
        };
        state.points.insert(factory.generate_point(x, y, *kind, rng));
    }
    if state.points.len() < 2 {
        return Err(SimError::NotEnoughPoints { required: 2, available: state.points.len() });
    }

    lay_starter_routes(&mut state);

    state
        .citizens
        .spawn_many(config.population.initial_citizens, &state.points, rng);

    state.challenges.set_planning_target(state.points.len());
    state.refresh_network_challenges();
    state.satisfaction = calculate_satisfaction(state.citizens.as_slice());

    log::info!(
        "bootstrap: {} points, {} starter routes, {} citizens",
        state.points.len(),
        state.routes.len(),
        state.citizens.len()
    );
    Ok(state)
}

fn lay_starter_routes(state: &mut SimulationState) {
    for kind in STARTER_MODES {
        if state.routes.len() >= STARTER_ROUTE_COUNT {
            break;
        }
        if let Some(route) = free_pair(state, kind) {
            state.routes.push(route);
        }
    }
    // Light rail has no range limit, so it fills any slot still open.
    while state.routes.len() < STARTER_ROUTE_COUNT {
        let Some(route) = free_pair(state, TransportType::LightRail) else {
            break;
        };
        state.routes.push(route);
    }
}

/// First pair of points, in registry order, that no route touches yet and
/// that `kind` can span.
fn free_pair(state: &SimulationState, kind: TransportType) -> Option<Route> {
    let points = state.points.as_slice();
    let touched = |id: &str| state.routes.routes().iter().any(|r| r.touches(id));
    points.iter().enumerate().find_map(|(i, a)| {
        points[i + 1..].iter().find_map(|b| {
            let free = !touched(&a.id) && !touched(&b.id);
            (free && kind.allows_distance(a.distance_to(b))).then(|| Route {
                start: a.id.clone(),
                end: b.id.clone(),
                kind,
            })
        })
    })
}
