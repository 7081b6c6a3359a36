//! The event bus — all inter-subsystem communication.
//!
//! RULE: Subsystems communicate ONLY through events.
//! A subsystem may never call another subsystem's functions directly.
//! Every event also lands in the run's event log.

use crate::{
    challenge::ChallengeKind,
    map::PointKind,
    network::TransportType,
    types::{CitizenId, EntityId, PointId, RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    WorldBootstrapped {
        tick: Tick,
        points: usize,
        routes: usize,
        citizens: usize,
    },
    /// Emitted at midnight. `satisfaction` and `satisfied` are the values the
    /// finished day ended on, before any movement this tick.
    DayStarted {
        tick: Tick,
        day: u32,
        satisfaction: u32,
        satisfied: usize,
    },

    // ── Population events ──────────────────────────
    PointAdded {
        tick: Tick,
        point_id: PointId,
        kind: PointKind,
        x: i32,
        y: i32,
    },
    CitizensSpawned {
        tick: Tick,
        count: usize,
        reason: SpawnReason,
    },
    CitizensTrimmed {
        tick: Tick,
        dropped: usize,
        remaining: usize,
    },

    // ── Economy events ─────────────────────────────
    DailySettlement {
        tick: Tick,
        day: u32,
        income: i64,
        maintenance: i64,
        resources: i64,
    },

    // ── Movement events ────────────────────────────
    JourneyCompleted {
        tick: Tick,
        citizen_id: CitizenId,
        mode: Option<TransportType>,
        co2_saved: u64,
        /// True the first time this citizen finishes a journey with a mode.
        first_trip: bool,
    },
    MovementSummary {
        tick: Tick,
        moved: usize,
        waiting: usize,
        arrived: usize,
        co2_saved: u64,
    },

    // ── Satisfaction events ────────────────────────
    SatisfactionUpdated {
        tick: Tick,
        satisfaction: u32,
        satisfied: usize,
        population: usize,
        score: i64,
    },
    GameOver {
        tick: Tick,
        day: u32,
        co2_saved: u64,
        citizens: usize,
        score: i64,
    },

    // ── Challenge events ───────────────────────────
    ChallengeCompleted {
        tick: Tick,
        challenge_id: String,
        kind: ChallengeKind,
    },

    // ── Player command events ──────────────────────
    PlayerCommandReceived {
        tick: Tick,
        command_id: EntityId,
        command_type: String,
    },
    RouteAdded {
        tick: Tick,
        index: usize,
        start: PointId,
        end: PointId,
        kind: TransportType,
        cost: i64,
    },
    RouteRejected {
        tick: Tick,
        start: PointId,
        end: PointId,
        kind: TransportType,
        reason: String,
    },
    RouteRemoved {
        tick: Tick,
        index: usize,
        start: PointId,
        end: PointId,
        kind: TransportType,
    },
    TransportSelected {
        tick: Tick,
        requested: TransportType,
        selected: Option<TransportType>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpawnReason {
    Bootstrap,
    /// The fixed batch added every midnight.
    Daily,
    /// The extra batch that grows every few days.
    Expansion,
    /// The real-time growth timer.
    Growth,
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub tick: Tick,
    pub subsystem: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
