//! Simulation clock — owns hour/day state, speed control, and pause.

use crate::types::{RunId, Tick, HOURS_PER_DAY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    /// Hour of day, always in `[0, 24)`.
    pub time:         u32,
    /// Day counter, starts at 1.
    pub day:          u32,
    pub speed:        SimSpeed,
    pub paused:       bool,
}

/// What a single `advance()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockStep {
    pub tick:         Tick,
    pub time:         u32,
    pub day:          u32,
    /// The day that was current before this step.
    pub previous_day: u32,
    pub rolled_over:  bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            time: 0,
            day: 1,
            speed: SimSpeed::Normal,
            paused: true,
        }
    }

    /// Advance one hour. Crossing midnight increments the day.
    /// Callers must check `paused` first; the engine refuses to tick a
    /// paused clock.
    pub fn advance(&mut self) -> ClockStep {
        let previous_day = self.day;
        self.current_tick += 1;
        self.time = (self.time + 1) % HOURS_PER_DAY;
        let rolled_over = self.time == 0;
        if rolled_over {
            self.day += 1;
        }
        ClockStep {
            tick: self.current_tick,
            time: self.time,
            day: self.day,
            previous_day,
            rolled_over,
        }
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Normal,       // 1 hour per tick interval
    Fast,         // 2 hours per tick interval
    Faster,       // 5 hours per tick interval
}

impl SimSpeed {
    pub fn multiplier(&self) -> u32 {
        match self {
            SimSpeed::Normal      => 1,
            SimSpeed::Fast        => 2,
            SimSpeed::Faster      => 5,
        }
    }
}
