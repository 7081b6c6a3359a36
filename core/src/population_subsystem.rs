//! Population subsystem — city growth at each day rollover.
//!
//! At midnight: a fixed batch of citizens, one or two new points of
//! interest, and an expansion batch that grows every few days. Nothing
//! happens on the other 23 hours.

use crate::{
    config::SimConfig,
    error::SimResult,
    event::{SimEvent, SpawnReason},
    map::{random_position, PointFactory, PointKind},
    rng::SubsystemRng,
    state::SimulationState,
    subsystem::{SimSubsystem, TickContext},
};
use std::sync::Arc;

pub struct PopulationSubsystem {
    config: SimConfig,
    factory: Arc<dyn PointFactory>,
}

impl PopulationSubsystem {
    pub fn new(config: SimConfig, factory: Arc<dyn PointFactory>) -> Self {
        Self { config, factory }
    }

    fn spawn(
        &self,
        state: &mut SimulationState,
        count: usize,
        reason: SpawnReason,
        tick: u64,
        rng: &mut SubsystemRng,
    ) -> Option<SimEvent> {
        if count == 0 {
            return None;
        }
        let spawned = state.citizens.spawn_many(count, &state.points, rng);
        (spawned > 0).then_some(SimEvent::CitizensSpawned { tick, count: spawned, reason })
    }

    fn add_points(
        &self,
        state: &mut SimulationState,
        tick: u64,
        rng: &mut SubsystemRng,
    ) -> Vec<SimEvent> {
        let pop = &self.config.population;
        let wanted = rng.range_inclusive(pop.new_points_min, pop.new_points_max);
        let mut events = Vec::new();
        for _ in 0..wanted {
            let Some((x, y)) = random_position(
                &self.config.map,
                state.points.as_slice(),
                self.config.map.min_point_spacing,
                rng,
            ) else {
                log::debug!("tick={tick} population: no free slot for a new point");
                break;
            };
            let kind = PointKind::ALL[rng.next_index(PointKind::ALL.len())];
            let point = self.factory.generate_point(x, y, kind, rng);
            let point_id = point.id.clone();
            if state.points.insert(point) {
                events.push(SimEvent::PointAdded { tick, point_id, kind, x, y });
            }
        }
        state.challenges.set_planning_target(state.points.len());
        events
    }
}

impl SimSubsystem for PopulationSubsystem {
    fn name(&self) -> &'static str { "population" }

    fn update(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        if !ctx.rolled_over() {
            return Ok(vec![]);
        }
        let tick = ctx.tick();
        let day = ctx.day();
        let pop = &self.config.population;
        let mut out_events = Vec::new();

        out_events.extend(self.spawn(state, pop.daily_citizens, SpawnReason::Daily, tick, rng));
        out_events.extend(self.add_points(state, tick, rng));

        let steps = (day / pop.growth_step_days) as usize;
        let extra = pop.extra_citizens_per_step * steps;
        out_events.extend(self.spawn(state, extra, SpawnReason::Expansion, tick, rng));

        log::info!(
            "tick={tick} population: day {day} opens with {} points and {} citizens",
            state.points.len(),
            state.citizens.len()
        );
        Ok(out_events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
