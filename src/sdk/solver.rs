use crate::sdk::routing::CostMatrices;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Candidates within `min + RCL_ALPHA * (max - min)` of the cheapest
/// move form the restricted candidate list. 0 is pure greedy, 1 pure
/// random.
pub const RCL_ALPHA: f64 = 0.4;

// Tolerance for float comparisons on accumulated costs
const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeFor {
    #[default]
    Distance,
    Time,
}

impl OptimizeFor {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizeFor::Distance => "distance",
            OptimizeFor::Time => "time",
        }
    }
}

impl FromStr for OptimizeFor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(OptimizeFor::Distance),
            "time" => Ok(OptimizeFor::Time),
            other => Err(format!(
                "invalid optimize criterion '{}', expected 'distance' or 'time'",
                other
            )),
        }
    }
}

/// GRASP solver for the generalized TSP over point clusters.
///
/// A tour starts at `start`, ends at `end`, and visits exactly one
/// node of every cluster. Each GRASP round builds a randomized greedy
/// tour, then alternates two local searches until neither improves:
/// 2-opt reorders the visiting sequence, and the intra-cluster pass
/// swaps a visited node for a cheaper sibling of the same cluster.
pub struct GraspSolver<'a> {
    matrices: &'a CostMatrices,
    clusters: &'a HashMap<String, Vec<usize>>,
    node_cluster: HashMap<usize, &'a str>,
    start: usize,
    end: usize,
    n_clusters: usize,
    optimize_for: OptimizeFor,
}

impl<'a> GraspSolver<'a> {
    pub fn new(
        matrices: &'a CostMatrices,
        clusters: &'a HashMap<String, Vec<usize>>,
        start: usize,
        end: usize,
        optimize_for: OptimizeFor,
    ) -> Self {
        let mut node_cluster = HashMap::new();
        for (cluster_id, nodes) in clusters {
            for &node in nodes {
                node_cluster.insert(node, cluster_id.as_str());
            }
        }
        Self {
            matrices,
            clusters,
            node_cluster,
            start,
            end,
            n_clusters: clusters.len(),
            optimize_for,
        }
    }

    fn cost(&self, i: usize, j: usize) -> f64 {
        match self.optimize_for {
            OptimizeFor::Distance => self.matrices.distance_km(i, j),
            OptimizeFor::Time => self.matrices.duration_min(i, j),
        }
    }

    pub fn tour_cost(&self, tour: &[usize]) -> f64 {
        tour.windows(2).map(|pair| self.cost(pair[0], pair[1])).sum()
    }

    /// Randomized greedy construction. Candidates come from every
    /// unvisited cluster; when no finite move remains the end node is
    /// appended and the partial tour returned. The end node is moved
    /// to the back if a round placed it mid-tour.
    fn construct(&self, rng: &mut impl Rng) -> Vec<usize> {
        let mut tour = vec![self.start];
        let mut unvisited: HashSet<&str> = self.clusters.keys().map(String::as_str).collect();
        if let Some(cluster_id) = self.node_cluster.get(&self.start) {
            unvisited.remove(*cluster_id);
        }

        while tour.len() < self.n_clusters {
            let current = tour[tour.len() - 1];

            let mut candidates: Vec<(f64, usize, &str)> = Vec::new();
            for cluster_id in &unvisited {
                let Some(nodes) = self.clusters.get(*cluster_id) else {
                    continue;
                };
                for &node in nodes {
                    let cost = self.cost(current, node);
                    if cost.is_finite() {
                        candidates.push((cost, node, *cluster_id));
                    }
                }
            }

            if candidates.is_empty() {
                if !tour.contains(&self.end) {
                    tour.push(self.end);
                }
                return tour;
            }

            let min = candidates.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
            let max = candidates.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
            let threshold = min + RCL_ALPHA * (max - min);

            candidates.retain(|c| c.0 <= threshold + EPS);
            // the cheapest candidate always survives the filter
            let Some(&(_, node, cluster_id)) = candidates.choose(rng) else {
                break;
            };

            tour.push(node);
            unvisited.remove(cluster_id);
        }

        if tour.last() != Some(&self.end) {
            tour.retain(|&node| node != self.end);
            tour.push(self.end);
        }
        tour
    }

    /// 2-opt with fixed endpoints. First improvement applies and the
    /// scan restarts.
    fn two_opt(&self, tour: &mut [usize]) {
        let n = tour.len();
        if n < 4 {
            return;
        }
        let mut improved = true;
        while improved {
            improved = false;
            'scan: for i in 1..n - 2 {
                for j in i + 1..n - 1 {
                    let before = self.cost(tour[i - 1], tour[i]) + self.cost(tour[j], tour[j + 1]);
                    let after = self.cost(tour[i - 1], tour[j]) + self.cost(tour[i], tour[j + 1]);
                    if after - before < -EPS {
                        tour[i..=j].reverse();
                        improved = true;
                        break 'scan;
                    }
                }
            }
        }
    }

    /// Swaps a visited node for the best cheaper node of the same
    /// cluster, one position at a time, restarting after each swap.
    fn intra_cluster(&self, tour: &mut [usize]) {
        let n = tour.len();
        if n < 3 {
            return;
        }
        let mut improved = true;
        while improved {
            improved = false;
            for i in 1..n - 1 {
                let current = tour[i];
                let Some(cluster_id) = self.node_cluster.get(&current) else {
                    continue;
                };
                let Some(nodes) = self.clusters.get(*cluster_id) else {
                    continue;
                };

                let prev = tour[i - 1];
                let next = tour[i + 1];
                let mut best_cost = self.cost(prev, current) + self.cost(current, next);
                let mut best_node = current;

                for &candidate in nodes {
                    if candidate == current {
                        continue;
                    }
                    let cost = self.cost(prev, candidate) + self.cost(candidate, next);
                    if cost < best_cost - EPS {
                        best_cost = cost;
                        best_node = candidate;
                        improved = true;
                    }
                }

                if improved {
                    tour[i] = best_node;
                    break;
                }
            }
        }
    }

    /// Runs `iterations` GRASP rounds and returns the cheapest tour
    /// found, or `None` when no round produced a finite-cost tour.
    pub fn solve(&self, iterations: usize, rng: &mut impl Rng) -> Option<(Vec<usize>, f64)> {
        log::info!(
            "[SOLVER] GRASP over {} clusters, {} iterations",
            self.n_clusters,
            iterations
        );

        let mut best: Option<(Vec<usize>, f64)> = None;
        for _ in 0..iterations {
            let mut tour = self.construct(rng);

            loop {
                let before = self.tour_cost(&tour);
                self.two_opt(&mut tour);
                self.intra_cluster(&mut tour);
                let after = self.tour_cost(&tour);
                if after >= before - EPS {
                    break;
                }
            }

            let cost = self.tour_cost(&tour);
            let best_cost = best.as_ref().map_or(f64::INFINITY, |(_, c)| *c);
            if cost < best_cost {
                best = Some((tour, cost));
            }
        }

        match &best {
            Some((_, cost)) => log::info!("[SOLVER] Done, best cost {:.3}", cost),
            None => log::warn!("[SOLVER] No feasible tour found"),
        }
        best
    }
}
