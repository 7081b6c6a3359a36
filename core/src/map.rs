//! World map, points of interest, and the point registry.
//!
//! Points are owned by the registry (an arena in insertion order plus an
//! id index). Everything else — routes, citizens, paths — refers to points
//! by `PointId` only.

use crate::{config::MapConfig, rng::SubsystemRng, types::PointId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldMap {
    pub width: i32,
    pub height: i32,
    /// Reserved for terrain features; nothing populates it yet.
    pub obstacles: Vec<Obstacle>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Obstacle {
    pub x: i32,
    pub y: i32,
}

impl WorldMap {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height, obstacles: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Residential,
    Office,
    School,
    Station,
    Leisure,
}

impl PointKind {
    pub const ALL: [PointKind; 5] = [
        PointKind::Residential,
        PointKind::Office,
        PointKind::School,
        PointKind::Station,
        PointKind::Leisure,
    ];

    /// Passenger capacity range `[min, max)` for a freshly generated point.
    pub fn capacity_range(&self) -> (u32, u32) {
        match self {
            PointKind::Residential => (50, 100),
            PointKind::Office      => (20, 50),
            PointKind::School      => (10, 30),
            PointKind::Station     => (50, 150),
            PointKind::Leisure     => (10, 50),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointOfInterest {
    pub id: PointId,
    pub x: i32,
    pub y: i32,
    pub kind: PointKind,
    pub capacity: u32,
}

impl PointOfInterest {
    /// Straight-line grid distance between two points.
    pub fn distance_to(&self, other: &PointOfInterest) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }
}

pub fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
    let dx = f64::from(x1 - x2);
    let dy = f64::from(y1 - y2);
    (dx * dx + dy * dy).sqrt()
}

/// The set of points of interest. Grows monotonically; points are never
/// removed or edited once registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointRegistry {
    points: Vec<PointOfInterest>,
    #[serde(skip)]
    index: HashMap<PointId, usize>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a point. Returns false (and leaves the registry untouched)
    /// when the id is already taken.
    pub fn insert(&mut self, point: PointOfInterest) -> bool {
        if self.index.contains_key(&point.id) {
            return false;
        }
        self.index.insert(point.id.clone(), self.points.len());
        self.points.push(point);
        true
    }

    pub fn get(&self, id: &str) -> Option<&PointOfInterest> {
        self.index.get(id).map(|&i| &self.points[i])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[PointOfInterest] {
        &self.points
    }

    pub fn ids(&self) -> impl Iterator<Item = &PointId> {
        self.points.iter().map(|p| &p.id)
    }

    /// Euclidean distance between two registered points.
    pub fn distance_between(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(a)?.distance_to(self.get(b)?))
    }

    /// Rebuild the id index after deserialisation.
    pub fn reindex(&mut self) {
        self.index = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
    }
}

/// The external point generator. The engine only needs something that
/// turns a position and a kind into a fully-formed point.
pub trait PointFactory: Send + Sync {
    fn generate_point(&self, x: i32, y: i32, kind: PointKind, rng: &mut SubsystemRng) -> PointOfInterest;

    fn generate_map(&self, width: i32, height: i32) -> WorldMap {
        WorldMap::new(width, height)
    }
}

/// Default factory: random id, capacity sampled from the kind's range.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPointFactory;

impl PointFactory for RandomPointFactory {
    fn generate_point(&self, x: i32, y: i32, kind: PointKind, rng: &mut SubsystemRng) -> PointOfInterest {
        let id = uuid::Builder::from_random_bytes(rng.next_bytes_16()).into_uuid();
        let (lo, hi) = kind.capacity_range();
        PointOfInterest {
            id: format!("poi-{}", &id.simple().to_string()[..12]),
            x,
            y,
            kind,
            capacity: lo + rng.next_u64_below(u64::from(hi - lo)) as u32,
        }
    }
}

/// Pick a random free position inside the padded map area, at least
/// `min_spacing` away from every existing point.
///
/// Returns `None` once `config.placement_attempts` positions have been
/// rejected, so a crowded map can never stall a tick.
pub fn random_position(
    config: &MapConfig,
    existing: &[PointOfInterest],
    min_spacing: f64,
    rng: &mut SubsystemRng,
) -> Option<(i32, i32)> {
    let span_x = (config.width - 2 * config.edge_padding).max(1) as u64;
    let span_y = (config.height - 2 * config.edge_padding).max(1) as u64;
    for _ in 0..config.placement_attempts {
        let x = rng.next_u64_below(span_x) as i32 + config.edge_padding;
        let y = rng.next_u64_below(span_y) as i32 + config.edge_padding;
        let too_close = existing
            .iter()
            .any(|p| distance(p.x, p.y, x, y) < min_spacing);
        if !too_close {
            return Some((x, y));
        }
    }
    None
}
