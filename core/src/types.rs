//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one in-game hour.
pub type Tick = u64;

/// A stable, unique identifier for any entity in the simulation.
pub type EntityId = String;

/// The canonical run identifier.
pub type RunId = String;

/// Identifier of a point of interest. Ids are unique within a run.
pub type PointId = String;

/// Numeric citizen identifier, handed out by the citizen pool in order.
pub type CitizenId = u64;

/// Hours in one in-game day.
pub const HOURS_PER_DAY: u32 = 24;
