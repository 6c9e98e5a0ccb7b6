use super::provider::{CostMatrices, RouteInfo, RoutingProvider};
use super::{Coord, RoutingError};
use async_trait::async_trait;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Assumed average speed for duration estimates when only the
/// straight-line distance is known.
const ESTIMATE_SPEED_KMH: f64 = 30.0;

/// Great-circle distance between two (lat, lon) points in km.
pub fn haversine_km(a: Coord, b: Coord) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Symmetric cost matrices built from straight-line distances at
/// 30 km/h. A rough estimate, used when the table service is down.
pub fn fallback_matrix(coords: &[Coord]) -> CostMatrices {
    let n = coords.len();
    let mut distances = vec![vec![0.0; n]; n];
    let mut durations = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in i + 1..n {
            let dist = haversine_km(coords[i], coords[j]);
            let dur = dist / ESTIMATE_SPEED_KMH * 60.0;
            distances[i][j] = dist;
            distances[j][i] = dist;
            durations[i][j] = dur;
            durations[j][i] = dur;
        }
    }

    CostMatrices {
        distances_km: distances,
        durations_min: durations,
    }
}

/// Offline provider. Geocoding and road routes are unavailable; cost
/// matrices come from the geodesic estimate. Useful for tests and for
/// planning without network access.
pub struct GeodesicProvider;

#[async_trait]
impl RoutingProvider for GeodesicProvider {
    async fn geocode(&self, _query: &str) -> Result<Option<Coord>, RoutingError> {
        Ok(None)
    }

    async fn cost_matrix(&self, coords: &[Coord]) -> Result<CostMatrices, RoutingError> {
        Ok(fallback_matrix(coords))
    }

    async fn route(&self, _from: Coord, _to: Coord) -> Result<Option<RouteInfo>, RoutingError> {
        Ok(None)
    }
}
