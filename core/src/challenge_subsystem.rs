//! Challenge subsystem — folds this tick's events into objective progress.
//!
//! This subsystem is REACTIVE: it reads only the events earlier subsystems
//! emitted this tick. Route-shaped challenges (network, diversity,
//! planning) are refreshed by the route commands instead, see
//! `SimulationState::refresh_network_challenges`.

use crate::{
    challenge::ChallengeKind,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    state::SimulationState,
    subsystem::{SimSubsystem, TickContext},
};

#[derive(Default)]
pub struct ChallengeSubsystem;

impl ChallengeSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl SimSubsystem for ChallengeSubsystem {
    fn name(&self) -> &'static str { "challenge" }

    fn update(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let board = &mut state.challenges;
        let mut completed: Vec<ChallengeKind> = Vec::new();
        let mut transported = 0u64;
        let mut co2 = 0u64;

        for event in events_in {
            match event {
                SimEvent::DayStarted { day, satisfaction, .. } => {
                    if board.update_satisfaction_streak(*satisfaction) {
                        completed.push(ChallengeKind::Satisfaction);
                    }
                    if board.update_efficiency(*satisfaction) {
                        completed.push(ChallengeKind::Efficiency);
                    }
                    if board.update_sustainability(*day) {
                        completed.push(ChallengeKind::Sustainability);
                    }
                }
                SimEvent::DailySettlement { resources, .. } => {
                    if board.update_economy(*resources) {
                        completed.push(ChallengeKind::Economy);
                    }
                }
                SimEvent::JourneyCompleted { co2_saved, first_trip, .. } => {
                    co2 += co2_saved;
                    if *first_trip {
                        transported += 1;
                    }
                }
                SimEvent::SatisfactionUpdated { satisfied, .. } => {
                    if board.update_innovation(*satisfied) {
                        completed.push(ChallengeKind::Innovation);
                    }
                }
                _ => {}
            }
        }

        if board.record_co2(co2) {
            completed.push(ChallengeKind::Co2);
        }
        if board.record_transported(transported) {
            completed.push(ChallengeKind::Transport);
        }

        Ok(completed_events(ctx.tick(), &completed, state))
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}

/// One `ChallengeCompleted` event per newly completed kind.
pub fn completed_events(tick: u64, kinds: &[ChallengeKind], state: &SimulationState) -> Vec<SimEvent> {
    kinds
        .iter()
        .filter_map(|kind| state.challenges.get(*kind))
        .map(|challenge| {
            log::info!("tick={tick} challenge: completed {} ({})", challenge.id, challenge.description);
            SimEvent::ChallengeCompleted {
                tick,
                challenge_id: challenge.id.clone(),
                kind: challenge.kind,
            }
        })
        .collect()
}
