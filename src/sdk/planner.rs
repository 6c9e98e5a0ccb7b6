//! Tour planning pipeline: resolve endpoints, fetch the cost matrix,
//! run the solver and assemble the leg-by-leg itinerary.

use crate::sdk::places::PlaceDb;
use crate::sdk::routing::{Coord, LineString, RouteStep, RoutingError, RoutingProvider};
use crate::sdk::solver::{GraspSolver, OptimizeFor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Sentinel point ids for the user-supplied endpoints. They share the
/// index namespace with landmark ids, always at positions 0 and 1.
pub const START_POINT: &str = "START_POINT";
pub const END_POINT: &str = "END_POINT";
pub const START_CLUSTER: &str = "START_CLUSTER";
pub const END_CLUSTER: &str = "END_CLUSTER";

pub const DEFAULT_ITERATIONS: usize = 100;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Thiếu thông tin: start_address, end_address hoặc cluster_ids")]
    MissingInput,
    #[error("Không tìm thấy tọa độ cho điểm xuất phát: '{0}'")]
    StartNotFound(String),
    #[error("Không tìm thấy tọa độ cho điểm kết thúc: '{0}'")]
    EndNotFound(String),
    #[error("Không thể lấy ma trận chi phí từ OSRM")]
    CostMatrix(#[source] RoutingError),
    #[error("Solver không tìm thấy lộ trình.")]
    NoTour,
}

impl PlanError {
    /// True for errors caused by the request itself rather than a
    /// downstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PlanError::MissingInput | PlanError::StartNotFound(_) | PlanError::EndNotFound(_)
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveRequest {
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    #[serde(default)]
    pub cluster_ids: Vec<String>,
    #[serde(default)]
    pub optimize_for: OptimizeFor,
}

/// One leg of the final tour. Distances are km, durations minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourLeg {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub steps: Vec<RouteStep>,
}

/// Full solve response. `total_cost` comes from the solver over the
/// table matrix; the distance and duration totals are re-accumulated
/// from the per-leg route lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: String,
    pub optimize_for: OptimizeFor,
    pub total_cost: f64,
    pub total_distance_km: f64,
    pub total_duration_min: f64,
    pub tour: Vec<TourLeg>,
    pub geometries: Vec<LineString>,
}

/// Landmark names resolve from the catalogue without a geocoder call.
async fn resolve_endpoint(
    db: &PlaceDb,
    provider: &dyn RoutingProvider,
    address: &str,
) -> Option<Coord> {
    if let Some(landmark) = db.landmark_by_name(address) {
        log::info!("[PLANNER] '{}' found in the landmark catalogue", address);
        return Some(landmark.coord);
    }
    match provider.geocode(address).await {
        Ok(found) => found,
        Err(err) => {
            log::warn!("[PLANNER] Geocoding '{}' failed: {}", address, err);
            None
        }
    }
}

fn display_name(db: &PlaceDb, point_id: &str, request: &SolveRequest) -> String {
    if let Some(landmark) = db.landmark(point_id) {
        return landmark.name.clone();
    }
    if point_id == START_POINT {
        request.start_address.clone()
    } else {
        request.end_address.clone()
    }
}

pub async fn plan_tour(
    db: &PlaceDb,
    provider: &dyn RoutingProvider,
    request: &SolveRequest,
    iterations: usize,
) -> Result<SolveResult, PlanError> {
    if request.start_address.is_empty()
        || request.end_address.is_empty()
        || request.cluster_ids.is_empty()
    {
        return Err(PlanError::MissingInput);
    }

    log::info!(
        "[PLANNER] Start='{}', End='{}', Clusters={}",
        request.start_address,
        request.end_address,
        request.cluster_ids.len()
    );

    let start_coord = resolve_endpoint(db, provider, &request.start_address)
        .await
        .ok_or_else(|| PlanError::StartNotFound(request.start_address.clone()))?;
    let end_coord = resolve_endpoint(db, provider, &request.end_address)
        .await
        .ok_or_else(|| PlanError::EndNotFound(request.end_address.clone()))?;

    // Index namespace for the cost matrix: start 0, end 1, then every
    // member of the selected clusters.
    let mut names: Vec<String> = vec![START_POINT.to_string(), END_POINT.to_string()];
    let mut coords: Vec<Coord> = vec![start_coord, end_coord];
    let mut index_of: HashMap<String, usize> = HashMap::new();
    index_of.insert(START_POINT.to_string(), 0);
    index_of.insert(END_POINT.to_string(), 1);

    for (id, landmark) in db.points_for_clusters(&request.cluster_ids) {
        if index_of.contains_key(&id) {
            continue;
        }
        index_of.insert(id.clone(), coords.len());
        names.push(id);
        coords.push(landmark.coord);
    }

    log::info!("[PLANNER] Requesting cost matrix for {} points", coords.len());
    let matrices = provider
        .cost_matrix(&coords)
        .await
        .map_err(PlanError::CostMatrix)?;

    let mut clusters = db.solver_clusters(&request.cluster_ids, &index_of);
    clusters.insert(START_CLUSTER.to_string(), vec![0]);
    clusters.insert(END_CLUSTER.to_string(), vec![1]);

    let solver = GraspSolver::new(&matrices, &clusters, 0, 1, request.optimize_for);
    let mut rng = StdRng::from_entropy();
    let (tour, total_cost) = solver
        .solve(iterations, &mut rng)
        .ok_or(PlanError::NoTour)?;

    log::info!("[PLANNER] Tour indices: {:?}", tour);

    // The solver orders points from the table matrix; each leg is
    // re-queried against the route service for geometry and steps.
    // When that lookup fails the leg falls back to the matrix cost
    // and a straight segment.
    let mut legs: Vec<TourLeg> = Vec::new();
    let mut geometries: Vec<LineString> = Vec::new();
    let mut total_distance_km = 0.0;
    let mut total_duration_min = 0.0;

    for pair in tour.windows(2) {
        let (idx_from, idx_to) = (pair[0], pair[1]);
        let coord_from = coords[idx_from];
        let coord_to = coords[idx_to];
        let name_from = display_name(db, &names[idx_from], request);
        let name_to = display_name(db, &names[idx_to], request);

        let route = match provider.route(coord_from, coord_to).await {
            Ok(found) => found,
            Err(err) => {
                log::warn!(
                    "[PLANNER] Route {} -> {} failed: {}",
                    name_from,
                    name_to,
                    err
                );
                None
            }
        };

        match route {
            Some(info) => {
                total_distance_km += info.distance_km;
                total_duration_min += info.duration_min;
                geometries.push(info.geometry);
                legs.push(TourLeg {
                    from: name_from,
                    to: name_to,
                    distance_km: info.distance_km,
                    duration_min: info.duration_min,
                    steps: info.steps,
                });
            }
            None => {
                let distance_km = matrices.distance_km(idx_from, idx_to);
                let duration_min = matrices.duration_min(idx_from, idx_to);
                total_distance_km += distance_km;
                total_duration_min += duration_min;
                geometries.push(LineString::straight(coord_from, coord_to));
                legs.push(TourLeg {
                    from: name_from,
                    to: name_to,
                    distance_km,
                    duration_min,
                    steps: Vec::new(),
                });
            }
        }
    }

    Ok(SolveResult {
        status: "success".to_string(),
        optimize_for: request.optimize_for,
        total_cost,
        total_distance_km,
        total_duration_min,
        tour: legs,
        geometries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::routing::GeodesicProvider;

    fn request(start: &str, end: &str, clusters: &[&str]) -> SolveRequest {
        SolveRequest {
            start_address: start.to_string(),
            end_address: end.to_string(),
            cluster_ids: clusters.iter().map(|c| c.to_string()).collect(),
            optimize_for: OptimizeFor::Distance,
        }
    }

    #[tokio::test]
    async fn plans_tour_over_straight_line_costs() {
        let db = PlaceDb::load().unwrap();
        let provider = GeodesicProvider;
        let req = request("Dinh Độc Lập", "Chợ Bến Thành", &["cluster_q7"]);

        let result = plan_tour(&db, &provider, &req, 20).await.unwrap();

        assert_eq!(result.status, "success");
        assert_eq!(result.optimize_for, OptimizeFor::Distance);
        // start, one node of the cluster, end
        assert_eq!(result.tour.len(), 2);
        assert_eq!(result.geometries.len(), 2);
        assert_eq!(result.tour[0].from, "Dinh Độc Lập");
        assert_eq!(result.tour[1].to, "Chợ Bến Thành");
        assert!(result.total_cost.is_finite());
        assert!(result.total_distance_km > 0.0);
        assert!(result.total_duration_min > 0.0);
        // geodesic legs carry no turn instructions
        assert!(result.tour.iter().all(|leg| leg.steps.is_empty()));
        assert!(result
            .geometries
            .iter()
            .all(|line| line.coordinates.len() == 2));
    }

    #[tokio::test]
    async fn middle_stop_comes_from_the_selected_cluster() {
        let db = PlaceDb::load().unwrap();
        let provider = GeodesicProvider;
        let req = request("Dinh Độc Lập", "Chợ Bến Thành", &["cluster_q7"]);

        let result = plan_tour(&db, &provider, &req, 20).await.unwrap();
        let cluster_names = ["Cầu Ánh Sao (Quận 7)", "Crescent Mall", "SC VivoCity"];
        assert!(cluster_names.contains(&result.tour[0].to.as_str()));
        assert_eq!(result.tour[0].to, result.tour[1].from);
    }

    #[tokio::test]
    async fn rejects_empty_fields() {
        let db = PlaceDb::load().unwrap();
        let provider = GeodesicProvider;

        let missing = request("", "Chợ Bến Thành", &["cluster_q7"]);
        let err = plan_tour(&db, &provider, &missing, 5).await.unwrap_err();
        assert!(matches!(err, PlanError::MissingInput));
        assert!(err.is_client_error());

        let no_clusters = request("Dinh Độc Lập", "Chợ Bến Thành", &[]);
        let err = plan_tour(&db, &provider, &no_clusters, 5).await.unwrap_err();
        assert!(matches!(err, PlanError::MissingInput));
    }

    #[tokio::test]
    async fn unresolvable_start_is_a_client_error() {
        let db = PlaceDb::load().unwrap();
        // geodesic provider has no geocoder, unknown names stay unresolved
        let provider = GeodesicProvider;
        let req = request("Số 1 Đường Không Tồn Tại", "Chợ Bến Thành", &["cluster_q7"]);

        let err = plan_tour(&db, &provider, &req, 5).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Không tìm thấy tọa độ cho điểm xuất phát: 'Số 1 Đường Không Tồn Tại'"
        );
    }

    #[tokio::test]
    async fn solver_cost_matches_criterion_units() {
        let db = PlaceDb::load().unwrap();
        let provider = GeodesicProvider;

        let mut req = request("Dinh Độc Lập", "Chợ Bến Thành", &["cluster_q1_core"]);
        let by_distance = plan_tour(&db, &provider, &req, 30).await.unwrap();
        req.optimize_for = OptimizeFor::Time;
        let by_time = plan_tour(&db, &provider, &req, 30).await.unwrap();

        // straight-line estimate drives at 30 km/h, minutes = km * 2
        assert!(
            (by_time.total_cost - by_distance.total_cost * 2.0).abs()
                < by_distance.total_cost * 0.5
        );
    }
}
