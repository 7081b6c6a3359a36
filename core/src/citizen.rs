//! Citizens and the citizen pool.

use crate::{
    map::PointRegistry,
    network::TransportType,
    rng::SubsystemRng,
    types::{CitizenId, PointId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citizen {
    pub id: CitizenId,
    pub location: PointId,
    pub destination: PointId,
    pub satisfied: bool,
    /// Mode of the first hop of the current (or last) journey.
    pub transport_mode: Option<TransportType>,
    pub waiting_time: u32,
    /// Set once the citizen has finished at least one journey.
    pub journey_completed: bool,
    /// CO₂ saved by the most recently completed journey.
    pub co2_impact: u64,
    /// Remaining hops of the cached path, next stop first.
    pub path: Vec<PointId>,
}

impl Citizen {
    pub fn has_arrived(&self) -> bool {
        self.location == self.destination
    }
}

/// Pick a random point other than `exclude`. `None` if no such point exists.
pub fn random_destination(
    points: &PointRegistry,
    exclude: &str,
    rng: &mut SubsystemRng,
) -> Option<PointId> {
    let candidates: Vec<&PointId> = points.ids().filter(|id| id.as_str() != exclude).collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.next_index(candidates.len())].clone())
}

/// All live citizens, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitizenPool {
    citizens: Vec<Citizen>,
    next_id: CitizenId,
}

impl CitizenPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.citizens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Citizen> {
        self.citizens.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Citizen> {
        self.citizens.iter_mut()
    }

    pub fn as_slice(&self) -> &[Citizen] {
        &self.citizens
    }

    pub fn get(&self, id: CitizenId) -> Option<&Citizen> {
        self.citizens.iter().find(|c| c.id == id)
    }

    pub fn satisfied_count(&self) -> usize {
        self.citizens.iter().filter(|c| c.satisfied).count()
    }

    /// Spawn one citizen at a random point, bound for a different random
    /// point. Needs at least two points; returns the new id otherwise `None`.
    pub fn spawn(&mut self, points: &PointRegistry, rng: &mut SubsystemRng) -> Option<CitizenId> {
        if points.len() < 2 {
            return None;
        }
        let start = points.as_slice()[rng.next_index(points.len())].id.clone();
        let destination = random_destination(points, &start, rng)?;
        Some(self.push_at(start, destination))
    }

    /// Spawn up to `count` citizens. Returns how many were created.
    pub fn spawn_many(&mut self, count: usize, points: &PointRegistry, rng: &mut SubsystemRng) -> usize {
        (0..count).filter(|_| self.spawn(points, rng).is_some()).count()
    }

    /// Place a fresh citizen at an explicit origin and destination.
    pub fn push_at(&mut self, location: PointId, destination: PointId) -> CitizenId {
        let id = self.next_id;
        self.next_id += 1;
        self.citizens.push(Citizen {
            id,
            location,
            destination,
            satisfied: true,
            transport_mode: None,
            waiting_time: 0,
            journey_completed: false,
            co2_impact: 0,
            path: Vec::new(),
        });
        id
    }

    /// Once the pool exceeds `threshold`, keep only the `keep` most recent
    /// citizens. Returns how many were dropped.
    pub fn trim(&mut self, threshold: usize, keep: usize) -> usize {
        if self.citizens.len() <= threshold {
            return 0;
        }
        let dropped = self.citizens.len().saturating_sub(keep);
        self.citizens.drain(..dropped);
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{PointKind, PointOfInterest};
    use crate::rng::{RngBank, SubsystemSlot};

    fn points(n: usize) -> PointRegistry {
        let mut registry = PointRegistry::new();
        for i in 0..n {
            registry.insert(PointOfInterest {
                id: format!("p{i}"),
                x: i as i32 * 5,
                y: 0,
                kind: PointKind::Residential,
                capacity: 60,
            });
        }
        registry
    }

    #[test]
    fn spawn_needs_two_points() {
        let mut pool = CitizenPool::new();
        let mut rng = RngBank::new(1).for_subsystem_at_tick(SubsystemSlot::Growth, 0);
        assert_eq!(pool.spawn(&points(1), &mut rng), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn spawned_citizens_never_start_at_their_destination() {
        let registry = points(3);
        let mut pool = CitizenPool::new();
        let mut rng = RngBank::new(5).for_subsystem_at_tick(SubsystemSlot::Growth, 0);
        assert_eq!(pool.spawn_many(50, &registry, &mut rng), 50);
        assert!(pool.iter().all(|c| !c.has_arrived()));
        assert!(pool.iter().all(|c| c.satisfied && c.waiting_time == 0 && c.path.is_empty()));
        let ids: Vec<_> = pool.iter().map(|c| c.id).collect();
        assert_eq!(ids, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn trim_keeps_most_recent_citizens() {
        let registry = points(2);
        let mut pool = CitizenPool::new();
        let mut rng = RngBank::new(9).for_subsystem_at_tick(SubsystemSlot::Growth, 0);
        pool.spawn_many(300, &registry, &mut rng);
        assert_eq!(pool.trim(300, 200), 0, "at the threshold nothing is trimmed");

        pool.spawn_many(1, &registry, &mut rng);
        assert_eq!(pool.trim(300, 200), 101);
        assert_eq!(pool.len(), 200);
        assert_eq!(pool.as_slice()[0].id, 101);
        assert_eq!(pool.as_slice()[199].id, 300);
    }

    #[test]
    fn random_destination_excludes_current_point() {
        let registry = points(2);
        let mut rng = RngBank::new(2).for_subsystem_at_tick(SubsystemSlot::Movement, 3);
        for _ in 0..20 {
            assert_eq!(random_destination(&registry, "p0", &mut rng).as_deref(), Some("p1"));
        }
        assert_eq!(random_destination(&points(1), "p0", &mut rng), None);
    }
}
