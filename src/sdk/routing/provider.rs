use super::{Coord, RoutingError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// GeoJSON LineString as OSRM returns it: coordinates are [lon, lat].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl LineString {
    /// Two-point segment used when no road geometry is available.
    pub fn straight(from: Coord, to: Coord) -> Self {
        Self {
            kind: "LineString".to_string(),
            coordinates: vec![[from.1, from.0], [to.1, to.0]],
        }
    }
}

/// One turn-by-turn instruction. `distance` is meters, `duration`
/// seconds, both straight from OSRM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub name: String,
    pub maneuver_type: String,
    pub maneuver_modifier: String,
    pub distance: f64,
    pub duration: f64,
}

/// A drivable leg between two points.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub distance_km: f64,
    pub duration_min: f64,
    pub geometry: LineString,
    pub steps: Vec<RouteStep>,
}

/// Pairwise travel costs between a set of points, km and minutes.
/// Unroutable pairs hold `f64::INFINITY`.
#[derive(Debug, Clone, Default)]
pub struct CostMatrices {
    pub distances_km: Vec<Vec<f64>>,
    pub durations_min: Vec<Vec<f64>>,
}

impl CostMatrices {
    pub fn distance_km(&self, i: usize, j: usize) -> f64 {
        Self::cell(&self.distances_km, i, j)
    }

    pub fn duration_min(&self, i: usize, j: usize) -> f64 {
        Self::cell(&self.durations_min, i, j)
    }

    pub fn len(&self) -> usize {
        self.distances_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances_km.is_empty()
    }

    fn cell(matrix: &[Vec<f64>], i: usize, j: usize) -> f64 {
        matrix
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(f64::INFINITY)
    }
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Resolves a free-form address to a coordinate. `Ok(None)` when
    /// the backing service has no match.
    async fn geocode(&self, query: &str) -> Result<Option<Coord>, RoutingError>;

    /// Travel costs between every pair of the given points.
    async fn cost_matrix(&self, coords: &[Coord]) -> Result<CostMatrices, RoutingError>;

    /// Road route between two points. `Ok(None)` when no route exists.
    async fn route(&self, from: Coord, to: Coord) -> Result<Option<RouteInfo>, RoutingError>;
}
