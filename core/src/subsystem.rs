//! Subsystem trait and tick context.
//!
//! RULE: Every subsystem implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    clock::ClockStep,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    state::SimulationState,
};
use std::any::Any;

/// Read-only facts about the tick being processed.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub step: ClockStep,
    /// Satisfied citizens before this tick touched anyone.
    pub satisfied_before: usize,
    /// Satisfaction percentage before this tick.
    pub satisfaction_before: u32,
}

impl TickContext {
    pub fn tick(&self) -> u64 {
        self.step.tick
    }

    pub fn day(&self) -> u32 {
        self.step.day
    }

    pub fn rolled_over(&self) -> bool {
        self.step.rolled_over
    }
}

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `ctx`:       clock step and pre-tick figures
    /// - `state`:     the world, mutable for the duration of this call only
    /// - `events_in`: events emitted by earlier subsystems this tick
    /// - `rng`:       this subsystem's deterministic RNG for this tick
    ///
    /// Returns a vec of new events to add to the tick's event log.
    fn update(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;

    /// For downcasting in tests and tooling only.
    /// Production sim code never uses this.
    fn as_any(&self) -> &dyn Any;
}
