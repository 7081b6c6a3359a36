//! Economy subsystem — the daily settlement.
//!
//! Execution: runs only on day rollover.
//! Income is earned on the citizens who were satisfied when the day ended;
//! maintenance is charged on every route at the finished day's rate.

use crate::{
    config::EconomyConfig,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    state::SimulationState,
    subsystem::{SimSubsystem, TickContext},
};

pub struct EconomySubsystem {
    config: EconomyConfig,
}

impl EconomySubsystem {
    pub fn new(config: EconomyConfig) -> Self {
        Self { config }
    }

    pub fn daily_income(&self, satisfied: usize) -> i64 {
        self.config.base_daily_income + satisfied as i64 * self.config.income_per_satisfied_citizen
    }

    /// Upkeep for `route_count` routes at the rate of `day`.
    pub fn maintenance(&self, route_count: usize, day: u32) -> i64 {
        let inflation = 1.0 + f64::from(day.saturating_sub(1)) * self.config.maintenance_inflation_per_day;
        (route_count as f64 * self.config.maintenance_per_route * inflation).round() as i64
    }
}

impl SimSubsystem for EconomySubsystem {
    fn name(&self) -> &'static str { "economy" }

    fn update(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        if !ctx.rolled_over() {
            return Ok(vec![]);
        }

        let income = self.daily_income(ctx.satisfied_before);
        let maintenance = self.maintenance(state.routes.len(), ctx.step.previous_day);
        state.resources += income - maintenance;

        log::info!(
            "tick={} economy: income={income} maintenance={maintenance} resources={}",
            ctx.tick(),
            state.resources
        );

        Ok(vec![SimEvent::DailySettlement {
            tick: ctx.tick(),
            day: ctx.day(),
            income,
            maintenance,
            resources: state.resources,
        }])
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
