//! Satisfaction subsystem — city mood, score, and the game-over rule.
//!
//! Runs after movement every tick. The low-satisfaction streak only moves
//! at midnight: a day that closes below the threshold extends it, any other
//! rollover clears it. The first day never counts. Once the streak reaches
//! its limit the game is over for good.

use crate::{
    config::SatisfactionConfig,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    scoring::{calculate_satisfaction, calculate_score},
    state::SimulationState,
    subsystem::{SimSubsystem, TickContext},
};

pub struct SatisfactionSubsystem {
    config: SatisfactionConfig,
}

impl SatisfactionSubsystem {
    pub fn new(config: SatisfactionConfig) -> Self {
        Self { config }
    }

    fn update_streak(&self, ctx: &TickContext, state: &mut SimulationState) -> bool {
        if !ctx.rolled_over() || state.game_over {
            return false;
        }
        if state.satisfaction < self.config.game_over_threshold && ctx.step.previous_day > 1 {
            state.low_satisfaction_streak += 1;
            log::info!(
                "tick={} satisfaction: {}% closes day {}, low streak {}/{}",
                ctx.tick(),
                state.satisfaction,
                ctx.step.previous_day,
                state.low_satisfaction_streak,
                self.config.game_over_streak
            );
        } else {
            state.low_satisfaction_streak = 0;
        }
        if state.low_satisfaction_streak >= self.config.game_over_streak {
            state.game_over = true;
        }
        state.game_over
    }
}

impl SimSubsystem for SatisfactionSubsystem {
    fn name(&self) -> &'static str { "satisfaction" }

    fn update(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let tick = ctx.tick();
        let citizens = state.citizens.as_slice();
        let satisfaction = calculate_satisfaction(citizens);
        let satisfied = state.citizens.satisfied_count();
        let population = state.citizens.len();

        let mut earned = calculate_score(citizens, state.routes.routes(), satisfaction);
        if satisfaction < self.config.score_penalty_threshold {
            earned -= self.config.score_penalty;
        }
        state.satisfaction = satisfaction;
        state.score += earned;

        let mut out_events = vec![SimEvent::SatisfactionUpdated {
            tick,
            satisfaction,
            satisfied,
            population,
            score: state.score,
        }];

        if self.update_streak(ctx, state) {
            log::warn!(
                "tick={tick} satisfaction: game over on day {} (score {}, co2 {})",
                ctx.day(),
                state.score,
                state.co2_saved
            );
            out_events.push(SimEvent::GameOver {
                tick,
                day: ctx.day(),
                co2_saved: state.co2_saved,
                citizens: population,
                score: state.score,
            });
        }
        Ok(out_events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
