//! Pure satisfaction and score formulas.

use crate::{
    citizen::Citizen,
    config::SatisfactionConfig,
    network::Route,
};

/// Percentage of satisfied citizens, rounded. An empty city is content.
pub fn calculate_satisfaction(citizens: &[Citizen]) -> u32 {
    if citizens.is_empty() {
        return 100;
    }
    let satisfied = citizens.iter().filter(|c| c.satisfied).count();
    (100.0 * satisfied as f64 / citizens.len() as f64).round() as u32
}

/// Score earned this tick: satisfied citizens plus network value, scaled
/// by satisfaction.
pub fn calculate_score(citizens: &[Citizen], routes: &[Route], satisfaction: u32) -> i64 {
    let citizen_score = citizens.iter().filter(|c| c.satisfied).count() as i64 * 10;
    let network_score: i64 = routes.iter().map(|r| r.kind.score_weight()).sum();
    ((citizen_score + network_score) as f64 * f64::from(satisfaction) / 100.0).round() as i64
}

/// How many ticks a stranded citizen tolerates before turning unsatisfied.
/// Shrinks as the game goes on, down to the configured floor.
pub fn wait_tolerance(config: &SatisfactionConfig, day: u32) -> u32 {
    config
        .base_wait_tolerance
        .saturating_sub(day / config.tolerance_decay_days)
        .max(config.min_wait_tolerance)
}
