//! The route graph: typed, undirected transport links between points.
//!
//! Routes are kept in insertion order (the presentation layer removes them
//! by index) alongside an adjacency index keyed by point id. The adjacency
//! lists preserve route order, so breadth-first search sees neighbours in
//! the same order the routes were built.

use crate::{map::PointRegistry, types::PointId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    PedestrianPath,
    BikeLane,
    ScooterStation,
    LightRail,
}

impl TransportType {
    pub const ALL: [TransportType; 4] = [
        TransportType::PedestrianPath,
        TransportType::BikeLane,
        TransportType::ScooterStation,
        TransportType::LightRail,
    ];

    /// Day-1 purchase price.
    pub fn base_cost(&self) -> i64 {
        match self {
            TransportType::PedestrianPath => 50,
            TransportType::BikeLane       => 100,
            TransportType::ScooterStation => 150,
            TransportType::LightRail      => 500,
        }
    }

    /// Longest straight-line span this mode may cover. `None` is unbounded.
    pub fn max_distance(&self) -> Option<f64> {
        match self {
            TransportType::PedestrianPath => Some(5.0),
            TransportType::BikeLane       => Some(10.0),
            TransportType::ScooterStation => Some(15.0),
            TransportType::LightRail      => None,
        }
    }

    /// CO₂ saved by one completed journey that used this mode.
    pub fn co2_saving(&self) -> u64 {
        match self {
            TransportType::BikeLane | TransportType::PedestrianPath => 200,
            TransportType::ScooterStation => 180,
            TransportType::LightRail      => 160,
        }
    }

    /// Per-route contribution to the network score.
    pub fn score_weight(&self) -> i64 {
        match self {
            TransportType::PedestrianPath => 3,
            TransportType::BikeLane       => 5,
            TransportType::ScooterStation => 7,
            TransportType::LightRail      => 15,
        }
    }

    pub fn allows_distance(&self, distance: f64) -> bool {
        self.max_distance().is_none_or(|limit| distance <= limit)
    }
}

/// Price of a route of `kind` on `day`: 5% linear inflation from day 1.
pub fn transport_cost(kind: TransportType, day: u32, inflation_per_day: f64) -> i64 {
    let factor = 1.0 + f64::from(day.saturating_sub(1)) * inflation_per_day;
    (kind.base_cost() as f64 * factor).round() as i64
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Route {
    pub start: PointId,
    pub end: PointId,
    pub kind: TransportType,
}

impl Route {
    /// True if this route links `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }

    pub fn touches(&self, point: &str) -> bool {
        self.start == point || self.end == point
    }
}

/// Why a route purchase was refused. No state changes on rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteRejection {
    /// A route of any type already links the pair.
    DuplicatePair,
    TooFar { distance: f64, limit: f64 },
    InsufficientFunds { cost: i64, available: i64 },
    UnknownPoint { id: PointId },
    SelfLoop,
}

impl RouteRejection {
    pub fn reason(&self) -> String {
        match self {
            RouteRejection::DuplicatePair => "points already connected".into(),
            RouteRejection::TooFar { distance, limit } => {
                format!("distance {distance:.2} exceeds limit {limit}")
            }
            RouteRejection::InsufficientFunds { cost, available } => {
                format!("cost {cost} exceeds resources {available}")
            }
            RouteRejection::UnknownPoint { id } => format!("unknown point {id}"),
            RouteRejection::SelfLoop => "start and end are the same point".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteGraph {
    routes: Vec<Route>,
    #[serde(skip)]
    adjacency: HashMap<PointId, Vec<(PointId, TransportType)>>,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    pub fn contains_pair(&self, a: &str, b: &str) -> bool {
        self.adjacency
            .get(a)
            .is_some_and(|links| links.iter().any(|(n, _)| n == b))
    }

    /// Neighbours of `point` in route order, with the mode linking them.
    pub fn neighbors(&self, point: &str) -> &[(PointId, TransportType)] {
        self.adjacency.get(point).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The mode of the route linking `a` and `b`, if any.
    pub fn link_between(&self, a: &str, b: &str) -> Option<TransportType> {
        self.neighbors(a)
            .iter()
            .find(|(n, _)| n == b)
            .map(|&(_, kind)| kind)
    }

    /// Check the distance and duplicate-pair rules for a prospective route.
    /// Budget is the caller's concern.
    pub fn validate(
        &self,
        points: &PointRegistry,
        start: &str,
        end: &str,
        kind: TransportType,
    ) -> Result<f64, RouteRejection> {
        let a = points
            .get(start)
            .ok_or_else(|| RouteRejection::UnknownPoint { id: start.to_string() })?;
        let b = points
            .get(end)
            .ok_or_else(|| RouteRejection::UnknownPoint { id: end.to_string() })?;
        if a.id == b.id {
            return Err(RouteRejection::SelfLoop);
        }
        if self.contains_pair(start, end) {
            return Err(RouteRejection::DuplicatePair);
        }
        let distance = a.distance_to(b);
        if let Some(limit) = kind.max_distance() {
            if distance > limit {
                return Err(RouteRejection::TooFar { distance, limit });
            }
        }
        Ok(distance)
    }

    /// Append a route without validation. Returns its index.
    pub fn push(&mut self, route: Route) -> usize {
        self.link(&route);
        self.routes.push(route);
        self.routes.len() - 1
    }

    /// Remove the route at `index`. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Route> {
        if index >= self.routes.len() {
            return None;
        }
        let removed = self.routes.remove(index);
        self.reindex();
        Some(removed)
    }

    /// Number of distinct transport modes in use.
    pub fn distinct_kinds(&self) -> usize {
        TransportType::ALL
            .iter()
            .filter(|kind| self.routes.iter().any(|r| r.kind == **kind))
            .count()
    }

    /// Number of registered points with at least one route.
    pub fn connected_point_count(&self, points: &PointRegistry) -> usize {
        points
            .ids()
            .filter(|id| !self.neighbors(id).is_empty())
            .count()
    }

    /// Rebuild the adjacency index from the route list.
    pub fn reindex(&mut self) {
        self.adjacency.clear();
        let routes = std::mem::take(&mut self.routes);
        for route in &routes {
            self.link(route);
        }
        self.routes = routes;
    }

    fn link(&mut self, route: &Route) {
        self.adjacency
            .entry(route.start.clone())
            .or_default()
            .push((route.end.clone(), route.kind));
        self.adjacency
            .entry(route.end.clone())
            .or_default()
            .push((route.start.clone(), route.kind));
    }
}
