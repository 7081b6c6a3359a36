//! Tunable simulation parameters.
//!
//! Every balancing constant lives here rather than in the subsystems, so a
//! run can be re-tuned from `data/transit.json` without touching code.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    /// Points are never placed closer than this to the map edge.
    pub edge_padding: i32,
    /// Minimum spacing between points generated during play.
    pub min_point_spacing: f64,
    /// Minimum spacing between the starter points.
    pub initial_point_spacing: f64,
    pub initial_point_count: usize,
    /// Random placement gives up after this many rejected positions.
    pub placement_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyConfig {
    pub starting_resources: i64,
    /// Fractional route price increase per elapsed day.
    pub cost_inflation_per_day: f64,
    pub base_daily_income: i64,
    pub income_per_satisfied_citizen: i64,
    pub maintenance_per_route: f64,
    /// Fractional maintenance increase per elapsed day.
    pub maintenance_inflation_per_day: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationConfig {
    pub initial_citizens: usize,
    pub daily_citizens: usize,
    /// Extra citizens per growth step: `extra_citizens_per_step * floor(day / growth_step_days)`.
    pub extra_citizens_per_step: usize,
    pub growth_step_days: u32,
    pub new_points_min: u32,
    pub new_points_max: u32,
    /// The pool is trimmed once it grows past this size...
    pub trim_threshold: usize,
    /// ...down to this many of the most recent citizens.
    pub trim_keep: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SatisfactionConfig {
    /// Fresh paths longer than this many hops leave the citizen unsatisfied.
    pub transfer_penalty_hops: usize,
    pub base_wait_tolerance: u32,
    /// The wait tolerance drops by one every this many days.
    pub tolerance_decay_days: u32,
    pub min_wait_tolerance: u32,
    /// Satisfaction (percent) below which a day counts towards game over.
    pub game_over_threshold: u32,
    /// Consecutive low-satisfaction day rollovers that end the game.
    pub game_over_streak: u32,
    /// Score is docked `score_penalty` on ticks below this satisfaction.
    pub score_penalty_threshold: u32,
    pub score_penalty: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerConfig {
    pub tick_interval_ms: u64,
    pub growth_interval_ms: u64,
    pub trim_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub map: MapConfig,
    pub economy: EconomyConfig,
    pub population: PopulationConfig,
    pub satisfaction: SatisfactionConfig,
    pub timers: TimerConfig,
    /// A world snapshot is written to the store every this many ticks.
    pub snapshot_interval: Tick,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: MapConfig {
                width: 40,
                height: 30,
                edge_padding: 2,
                min_point_spacing: 4.0,
                initial_point_spacing: 6.0,
                initial_point_count: 4,
                placement_attempts: 500,
            },
            economy: EconomyConfig {
                starting_resources: 600,
                cost_inflation_per_day: 0.05,
                base_daily_income: 100,
                income_per_satisfied_citizen: 10,
                maintenance_per_route: 5.0,
                maintenance_inflation_per_day: 0.1,
            },
            population: PopulationConfig {
                initial_citizens: 6,
                daily_citizens: 5,
                extra_citizens_per_step: 10,
                growth_step_days: 3,
                new_points_min: 1,
                new_points_max: 2,
                trim_threshold: 300,
                trim_keep: 200,
            },
            satisfaction: SatisfactionConfig {
                transfer_penalty_hops: 2,
                base_wait_tolerance: 3,
                tolerance_decay_days: 5,
                min_wait_tolerance: 1,
                game_over_threshold: 30,
                game_over_streak: 5,
                score_penalty_threshold: 50,
                score_penalty: 50,
            },
            timers: TimerConfig {
                tick_interval_ms: 1_000,
                growth_interval_ms: 10_000,
                trim_interval_ms: 5_000,
            },
            snapshot_interval: 24, // daily
        }
    }
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/transit.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Same balance as the shipped game, but snapshots are taken every tick
    /// so tests can inspect the store after short runs.
    pub fn default_test() -> Self {
        Self {
            snapshot_interval: 1,
            ..Self::default()
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let map = &self.map;
        if map.width <= 2 * map.edge_padding || map.height <= 2 * map.edge_padding {
            anyhow::bail!(
                "map {}x{} leaves no room inside edge padding {}",
                map.width,
                map.height,
                map.edge_padding
            );
        }
        if self.population.trim_keep > self.population.trim_threshold {
            anyhow::bail!(
                "trim_keep ({}) must not exceed trim_threshold ({})",
                self.population.trim_keep,
                self.population.trim_threshold
            );
        }
        if self.population.new_points_min > self.population.new_points_max {
            anyhow::bail!("new_points_min exceeds new_points_max");
        }
        if self.population.growth_step_days == 0 || self.satisfaction.tolerance_decay_days == 0 {
            anyhow::bail!("day divisors must be non-zero");
        }
        if self.timers.tick_interval_ms == 0
            || self.timers.growth_interval_ms == 0
            || self.timers.trim_interval_ms == 0
        {
            anyhow::bail!("timer intervals must be non-zero");
        }
        Ok(())
    }
}
