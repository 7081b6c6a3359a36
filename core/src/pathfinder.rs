//! Breadth-first shortest-hop search over the route graph.

use crate::{network::RouteGraph, types::PointId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Shortest hop-count path from `start` to `end`.
///
/// The result starts with the point *after* `start` and ends with `end`.
/// It is empty when `start == end` or when `end` is unreachable. Ties go to
/// whichever neighbour the graph lists first (route insertion order).
pub fn find_path(graph: &RouteGraph, start: &str, end: &str) -> Vec<PointId> {
    if start == end {
        return Vec::new();
    }

    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<&str> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for (next, _) in graph.neighbors(current) {
            let next = next.as_str();
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, current);
            if next == end {
                return unwind(&parent, start, end);
            }
            queue.push_back(next);
        }
    }
    Vec::new()
}

fn unwind(parent: &HashMap<&str, &str>, start: &str, end: &str) -> Vec<PointId> {
    let mut path = vec![end.to_string()];
    let mut cursor = end;
    while let Some(&prev) = parent.get(cursor) {
        if prev == start {
            break;
        }
        path.push(prev.to_string());
        cursor = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Route, TransportType};
    use crate::rng::{RngBank, SubsystemSlot};

    fn graph(edges: &[(&str, &str)]) -> RouteGraph {
        let mut graph = RouteGraph::new();
        for &(a, b) in edges {
            graph.push(Route { start: a.into(), end: b.into(), kind: TransportType::LightRail });
        }
        graph
    }

    #[test]
    fn identical_endpoints_yield_empty_path() {
        let g = graph(&[("a", "b")]);
        assert!(find_path(&g, "a", "a").is_empty());
    }

    #[test]
    fn disconnected_components_yield_empty_path() {
        let g = graph(&[("a", "b"), ("c", "d")]);
        assert!(find_path(&g, "a", "d").is_empty());
        assert!(find_path(&g, "a", "unregistered").is_empty());
    }

    #[test]
    fn path_excludes_start_and_includes_end() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d")]);
        assert_eq!(find_path(&g, "a", "d"), vec!["b", "c", "d"]);
        assert_eq!(find_path(&g, "d", "a"), vec!["c", "b", "a"]);
    }

    #[test]
    fn shortcut_wins_over_longer_chain() {
        // a-b-c-d plus a direct a-d link added last.
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
        assert_eq!(find_path(&g, "a", "d"), vec!["d"]);
        assert_eq!(find_path(&g, "a", "c").len(), 2);
    }

    #[test]
    fn ties_follow_route_order() {
        // Two equal-length routes a-x-z and a-y-z; x's route was built first.
        let g = graph(&[("a", "x"), ("a", "y"), ("y", "z"), ("x", "z")]);
        assert_eq!(find_path(&g, "a", "z"), vec!["x", "z"]);
    }

    #[test]
    fn path_length_matches_bfs_distance_on_a_ring() {
        let names = ["p0", "p1", "p2", "p3", "p4", "p5", "p6", "p7"];
        let edges: Vec<(&str, &str)> = (0..names.len())
            .map(|i| (names[i], names[(i + 1) % names.len()]))
            .collect();
        let g = graph(&edges);
        for (i, target) in names.iter().enumerate().skip(1) {
            let expected = i.min(names.len() - i);
            assert_eq!(find_path(&g, "p0", target).len(), expected, "p0 -> {target}");
        }
    }

    /// All-pairs hop counts by relaxation, for checking BFS against.
    fn reference_hops(names: &[String], g: &RouteGraph) -> Vec<Vec<Option<usize>>> {
        let n = names.len();
        let mut d = vec![vec![None; n]; n];
        for i in 0..n {
            d[i][i] = Some(0);
            for j in 0..n {
                if g.link_between(&names[i], &names[j]).is_some() {
                    d[i][j] = Some(1);
                }
            }
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if let (Some(a), Some(b)) = (d[i][k], d[k][j]) {
                        if d[i][j].map_or(true, |c| a + b < c) {
                            d[i][j] = Some(a + b);
                        }
                    }
                }
            }
        }
        d
    }

    #[test]
    fn paths_on_random_graphs_are_shortest_walks() {
        let names: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
        for seed in 0..20u64 {
            let mut rng = RngBank::new(seed).for_subsystem_at_tick(SubsystemSlot::Movement, 0);
            let mut g = RouteGraph::new();
            for _ in 0..12 {
                let a = rng.next_index(names.len());
                let b = rng.next_index(names.len());
                if a != b && !g.contains_pair(&names[a], &names[b]) {
                    g.push(Route { start: names[a].clone(), end: names[b].clone(), kind: TransportType::BikeLane });
                }
            }
            let hops = reference_hops(&names, &g);

            for (i, from) in names.iter().enumerate() {
                for (j, to) in names.iter().enumerate() {
                    let path = find_path(&g, from, to);
                    match hops[i][j] {
                        Some(h) if i != j => assert_eq!(path.len(), h, "seed {seed}: {from}->{to}"),
                        _ => assert!(path.is_empty(), "seed {seed}: {from}->{to} should have no path"),
                    }
                    if path.is_empty() {
                        continue;
                    }
                    assert_eq!(path.last(), Some(to));
                    let mut cursor = from.as_str();
                    for hop in &path {
                        assert!(g.link_between(cursor, hop).is_some(), "seed {seed}: {cursor}-{hop} is not a route");
                        cursor = hop;
                    }
                }
            }
        }
    }
}
