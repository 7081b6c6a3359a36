//! Objectives and their progress.
//!
//! Each challenge kind has exactly one update function. A completed
//! challenge is frozen: later updates leave both `current` and `completed`
//! untouched. The satisfaction streak is the only counter that can fall
//! back to zero, and only while it is still incomplete.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Distinct citizens who finished a journey.
    Transport,
    /// Consecutive days ending at or above the streak satisfaction.
    Satisfaction,
    Co2,
    /// Route count.
    Network,
    /// Distinct transport modes in use.
    Diversity,
    /// Satisfaction observed at a day rollover.
    Efficiency,
    /// Resources after the daily settlement.
    Economy,
    /// Points with at least one route; the target tracks the point count.
    Planning,
    /// Days survived.
    Sustainability,
    /// Peak number of simultaneously satisfied citizens.
    Innovation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub id: String,
    pub description: String,
    pub target: f64,
    pub current: f64,
    pub completed: bool,
    pub kind: ChallengeKind,
}

impl Challenge {
    fn new(id: &str, description: &str, target: f64, current: f64, kind: ChallengeKind) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            target,
            current,
            completed: false,
            kind,
        }
    }

    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 1.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }
}

/// Satisfaction (percent) a day must end at to extend the streak.
pub const STREAK_SATISFACTION: u32 = 80;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeBoard {
    challenges: Vec<Challenge>,
}

impl Default for ChallengeBoard {
    fn default() -> Self {
        use ChallengeKind::*;
        Self {
            challenges: vec![
                Challenge::new("challenge1", "Transport 100 citizens", 100.0, 0.0, Transport),
                Challenge::new("challenge2", "Keep 80% satisfaction for 3 days", 3.0, 0.0, Satisfaction),
                Challenge::new("challenge3", "Save 1000 kg of CO2", 1000.0, 0.0, Co2),
                Challenge::new("challenge4", "Build a network of 15 routes", 15.0, 0.0, Network),
                Challenge::new("challenge5", "Use every transport type", 4.0, 0.0, Diversity),
                Challenge::new("challenge6", "Reach 95% satisfaction", 95.0, 0.0, Efficiency),
                Challenge::new("challenge7", "Reach a budget of 2000", 2000.0, 0.0, Economy),
                Challenge::new("challenge8", "Connect every point of interest", 1.0, 0.0, Planning),
                Challenge::new("challenge9", "Survive 10 days", 10.0, 1.0, Sustainability),
                Challenge::new("challenge10", "Have 50 citizens satisfied at once", 50.0, 0.0, Innovation),
            ],
        }
    }
}

impl ChallengeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn get(&self, kind: ChallengeKind) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.kind == kind)
    }

    pub fn completed_count(&self) -> usize {
        self.challenges.iter().filter(|c| c.completed).count()
    }

    pub fn record_transported(&mut self, citizens: u64) -> bool {
        if citizens == 0 {
            return false;
        }
        self.accumulate(ChallengeKind::Transport, citizens as f64)
    }

    pub fn record_co2(&mut self, saved: u64) -> bool {
        if saved == 0 {
            return false;
        }
        self.accumulate(ChallengeKind::Co2, saved as f64)
    }

    pub fn update_network(&mut self, route_count: usize) -> bool {
        self.set_current(ChallengeKind::Network, route_count as f64)
    }

    pub fn update_diversity(&mut self, distinct_modes: usize) -> bool {
        self.set_current(ChallengeKind::Diversity, distinct_modes as f64)
    }

    pub fn update_connectivity(&mut self, connected_points: usize) -> bool {
        self.set_current(ChallengeKind::Planning, connected_points as f64)
    }

    /// The planning target follows the point count even after completion.
    pub fn set_planning_target(&mut self, point_count: usize) {
        if let Some(c) = self.find_mut(ChallengeKind::Planning) {
            c.target = point_count as f64;
        }
    }

    pub fn update_economy(&mut self, resources: i64) -> bool {
        self.set_current(ChallengeKind::Economy, resources as f64)
    }

    /// Extend or reset the streak with the satisfaction a day ended on.
    pub fn update_satisfaction_streak(&mut self, satisfaction: u32) -> bool {
        if satisfaction >= STREAK_SATISFACTION {
            return self.accumulate(ChallengeKind::Satisfaction, 1.0);
        }
        if let Some(c) = self.find_mut(ChallengeKind::Satisfaction) {
            if !c.completed {
                c.current = 0.0;
            }
        }
        false
    }

    pub fn update_efficiency(&mut self, satisfaction: u32) -> bool {
        self.set_current(ChallengeKind::Efficiency, f64::from(satisfaction))
    }

    pub fn update_sustainability(&mut self, day: u32) -> bool {
        self.set_current(ChallengeKind::Sustainability, f64::from(day))
    }

    /// Keeps the peak, never the latest value.
    pub fn update_innovation(&mut self, satisfied_now: usize) -> bool {
        let peak = self
            .get(ChallengeKind::Innovation)
            .map_or(0.0, |c| c.current)
            .max(satisfied_now as f64);
        self.set_current(ChallengeKind::Innovation, peak)
    }

    /// Returns true when this call completed the challenge.
    fn set_current(&mut self, kind: ChallengeKind, value: f64) -> bool {
        let Some(c) = self.find_mut(kind) else {
            return false;
        };
        if c.completed {
            return false;
        }
        c.current = value;
        c.completed = c.current >= c.target;
        c.completed
    }

    fn accumulate(&mut self, kind: ChallengeKind, delta: f64) -> bool {
        let current = self.get(kind).map_or(0.0, |c| c.current);
        self.set_current(kind, current + delta)
    }

    fn find_mut(&mut self, kind: ChallengeKind) -> Option<&mut Challenge> {
        self.challenges.iter_mut().find(|c| c.kind == kind)
    }
}
