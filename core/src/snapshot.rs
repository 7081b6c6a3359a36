//! Snapshot serialization — full simulation state to JSON.
//!
//! A snapshot is taken every `snapshot_interval` ticks and whenever the
//! presentation layer asks for one. It is the read model: map, points,
//! routes, citizens, clock, budget, score, CO₂ and challenges in one value.

use crate::{
    clock::SimClock,
    state::SimulationState,
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub run_id: RunId,
    pub tick: Tick,
    pub clock: SimClock,
    /// Bumped by every restart.
    pub generation: u32,
    pub state: SimulationState,
}

impl SimSnapshot {
    pub fn day(&self) -> u32 {
        self.clock.day
    }

    pub fn time(&self) -> u32 {
        self.clock.time
    }

    /// CO₂ saved, in kilograms, as shown on the game-over screen.
    pub fn co2_saved_kg(&self) -> f64 {
        self.state.co2_saved as f64 / 1000.0
    }
}
