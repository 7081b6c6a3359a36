//! Movement subsystem — moves every citizen by at most one hop per tick.
//!
//! Per citizen, first matching rule wins:
//!   1. Arrived: settle the journey (CO₂ by mode), pick a new destination.
//!   2. Cached path: step to the next stop.
//!   3. Otherwise search a path. Found: take the first hop, cache the rest.
//!      Not found: wait, and lose patience past the day's tolerance.

use crate::{
    citizen::{random_destination, Citizen},
    config::SatisfactionConfig,
    error::SimResult,
    event::SimEvent,
    map::PointRegistry,
    network::{RouteGraph, TransportType},
    pathfinder::find_path,
    rng::SubsystemRng,
    scoring::wait_tolerance,
    state::SimulationState,
    subsystem::{SimSubsystem, TickContext},
};
use serde::{Deserialize, Serialize};

/// Lifetime counters, for tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovementTotals {
    pub hops: u64,
    pub arrivals: u64,
    pub stranded_ticks: u64,
    pub paths_found: u64,
}

enum Outcome {
    Arrived { mode: Option<TransportType>, co2: u64, first_trip: bool },
    Moved,
    Waiting,
}

pub struct MovementSubsystem {
    config: SatisfactionConfig,
    pub totals: MovementTotals,
}

impl MovementSubsystem {
    pub fn new(config: SatisfactionConfig) -> Self {
        Self { config, totals: MovementTotals::default() }
    }

    fn step_citizen(
        &mut self,
        citizen: &mut Citizen,
        points: &PointRegistry,
        routes: &RouteGraph,
        tolerance: u32,
        rng: &mut SubsystemRng,
    ) -> Outcome {
        if citizen.has_arrived() {
            let mode = citizen.transport_mode;
            let co2 = mode.map_or(0, |m| m.co2_saving());
            let first_trip = !citizen.journey_completed && mode.is_some();
            match random_destination(points, &citizen.location, rng) {
                Some(next) => citizen.destination = next,
                // Nowhere else to go; drop the mode so the trip is not settled twice.
                None => citizen.transport_mode = None,
            }
            citizen.waiting_time = 0;
            citizen.journey_completed = true;
            citizen.co2_impact = co2;
            citizen.path.clear();
            self.totals.arrivals += 1;
            return Outcome::Arrived { mode, co2, first_trip };
        }

        if !citizen.path.is_empty() {
            citizen.location = citizen.path.remove(0);
            citizen.satisfied = true;
            citizen.waiting_time = 0;
            self.totals.hops += 1;
            return Outcome::Moved;
        }

        let mut path = find_path(routes, &citizen.location, &citizen.destination);
        if path.is_empty() {
            citizen.waiting_time += 1;
            citizen.satisfied = citizen.waiting_time < tolerance;
            self.totals.stranded_ticks += 1;
            return Outcome::Waiting;
        }

        let hops = path.len();
        let next = path.remove(0);
        citizen.transport_mode = routes.link_between(&citizen.location, &next);
        citizen.location = next;
        citizen.path = path;
        citizen.satisfied = hops <= self.config.transfer_penalty_hops;
        citizen.waiting_time = 0;
        self.totals.paths_found += 1;
        self.totals.hops += 1;
        Outcome::Moved
    }
}

impl SimSubsystem for MovementSubsystem {
    fn name(&self) -> &'static str { "movement" }

    fn update(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let tick = ctx.tick();
        let tolerance = wait_tolerance(&self.config, ctx.day());
        let mut out_events = Vec::new();
        let (mut moved, mut waiting, mut arrived, mut co2_this_tick) = (0, 0, 0, 0u64);

        for citizen in state.citizens.iter_mut() {
            match self.step_citizen(citizen, &state.points, &state.routes, tolerance, rng) {
                Outcome::Arrived { mode, co2, first_trip } => {
                    arrived += 1;
                    co2_this_tick += co2;
                    if mode.is_some() {
                        out_events.push(SimEvent::JourneyCompleted {
                            tick,
                            citizen_id: citizen.id,
                            mode,
                            co2_saved: co2,
                            first_trip,
                        });
                    }
                }
                Outcome::Moved => moved += 1,
                Outcome::Waiting => waiting += 1,
            }
        }

        state.co2_saved += co2_this_tick;
        state.journeys_completed += out_events.len() as u64;

        log::debug!(
            "tick={tick} movement: moved={moved} waiting={waiting} arrived={arrived} co2={co2_this_tick}"
        );
        out_events.push(SimEvent::MovementSummary {
            tick,
            moved,
            waiting,
            arrived,
            co2_saved: co2_this_tick,
        });
        Ok(out_events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
