//! The world state owned by the engine.
//!
//! RULE: exactly one writer. Subsystems and player commands receive
//! `&mut SimulationState` from the engine, one at a time; nothing else
//! holds a reference across ticks.

use crate::{
    challenge::{ChallengeBoard, ChallengeKind},
    citizen::CitizenPool,
    map::{PointRegistry, WorldMap},
    network::{RouteGraph, TransportType},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub map: WorldMap,
    pub points: PointRegistry,
    pub routes: RouteGraph,
    pub citizens: CitizenPool,
    pub selected_transport: Option<TransportType>,
    /// Percentage of satisfied citizens as of the last tick.
    pub satisfaction: u32,
    pub score: i64,
    pub resources: i64,
    /// Total CO₂ saved across all completed journeys.
    pub co2_saved: u64,
    /// Every completed journey that used a transport mode.
    pub journeys_completed: u64,
    /// Consecutive low-satisfaction day rollovers.
    pub low_satisfaction_streak: u32,
    pub game_over: bool,
    pub challenges: ChallengeBoard,
}

impl SimulationState {
    /// An empty world with the given starting budget. The bootstrap fills
    /// in points, routes, and citizens.
    pub fn new(map: WorldMap, starting_resources: i64) -> Self {
        Self {
            map,
            points: PointRegistry::new(),
            routes: RouteGraph::new(),
            citizens: CitizenPool::new(),
            selected_transport: None,
            satisfaction: 100,
            score: 0,
            resources: starting_resources,
            co2_saved: 0,
            journeys_completed: 0,
            low_satisfaction_streak: 0,
            game_over: false,
            challenges: ChallengeBoard::new(),
        }
    }

    /// Recompute the three network-shaped challenges after a route change.
    pub fn refresh_network_challenges(&mut self) -> Vec<ChallengeKind> {
        let mut completed = Vec::new();
        if self.challenges.update_network(self.routes.len()) {
            completed.push(ChallengeKind::Network);
        }
        if self.challenges.update_diversity(self.routes.distinct_kinds()) {
            completed.push(ChallengeKind::Diversity);
        }
        let connected = self.routes.connected_point_count(&self.points);
        if self.challenges.update_connectivity(connected) {
            completed.push(ChallengeKind::Planning);
        }
        completed
    }

    /// Rebuild lookup indices that are not serialised.
    pub fn reindex(&mut self) {
        self.points.reindex();
        self.routes.reindex();
    }
}
