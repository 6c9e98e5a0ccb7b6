use super::geodesic::fallback_matrix;
use super::provider::{CostMatrices, LineString, RouteInfo, RouteStep, RoutingProvider};
use super::{Coord, RoutingError};
use crate::sdk::config::PlannerConfig;
use crate::sdk::util::rate_limit::{nominatim_limiter, osrm_limiter, Limiter};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);
const ROUTE_TIMEOUT: Duration = Duration::from_secs(10);
// Table requests grow quadratically with the point count
const TABLE_TIMEOUT: Duration = Duration::from_secs(30);

// --- Response shapes ---

#[derive(Deserialize)]
struct NominatimPlace {
    // Nominatim returns coordinates as strings
    lat: String,
    lon: String,
}

#[derive(Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    distances: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    durations: Vec<Vec<Option<f64>>>,
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: LineString,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Deserialize)]
struct OsrmStep {
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
    distance: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    modifier: String,
}

/// Provider backed by an OSRM instance for road costs and Nominatim
/// for geocoding. Both public services are rate limited, so every
/// call waits on the matching limiter first.
pub struct OsrmProvider {
    client: Client,
    base_url: String,
    profile: String,
    nominatim_url: String,
    user_agent: String,
    geocode_context: String,
    geocode_country: String,
    osrm_limiter: Limiter,
    nominatim_limiter: Limiter,
}

impl OsrmProvider {
    pub fn new(config: &PlannerConfig) -> Self {
        log::info!("[OSRM] Using router at {}", config.osrm_base_url);
        Self {
            client: Client::new(),
            base_url: config.osrm_base_url.clone(),
            profile: config.osrm_profile.clone(),
            nominatim_url: config.nominatim_url.clone(),
            user_agent: config.nominatim_user_agent.clone(),
            geocode_context: config.geocode_context.clone(),
            geocode_country: config.geocode_country.clone(),
            osrm_limiter: osrm_limiter(),
            nominatim_limiter: nominatim_limiter(),
        }
    }
}

#[async_trait]
impl RoutingProvider for OsrmProvider {
    async fn geocode(&self, query: &str) -> Result<Option<Coord>, RoutingError> {
        let full_query = format!("{}, {}", query, self.geocode_context);
        log::info!("[GEOCODE] Looking up \"{}\"", query);

        self.nominatim_limiter.until_ready().await;

        let url = format!("{}/search", self.nominatim_url);
        let places: Vec<NominatimPlace> = self
            .client
            .get(&url)
            .query(&[
                ("q", full_query.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", self.geocode_country.as_str()),
            ])
            .header(USER_AGENT, &self.user_agent)
            .timeout(GEOCODE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(place) = places.first() else {
            log::warn!("[GEOCODE] No results for \"{}\"", query);
            return Ok(None);
        };

        let lat: f64 = place
            .lat
            .parse()
            .map_err(|_| RoutingError::Generic(format!("bad latitude: {}", place.lat)))?;
        let lon: f64 = place
            .lon
            .parse()
            .map_err(|_| RoutingError::Generic(format!("bad longitude: {}", place.lon)))?;

        log::info!("[GEOCODE] \"{}\" → ({}, {})", query, lat, lon);
        Ok(Some((lat, lon)))
    }

    async fn cost_matrix(&self, coords: &[Coord]) -> Result<CostMatrices, RoutingError> {
        let coords_str = coords
            .iter()
            .map(|(lat, lon)| format!("{},{}", lon, lat))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!("{}/table/v1/{}/{}", self.base_url, self.profile, coords_str);

        self.osrm_limiter.until_ready().await;
        log::info!("[OSRM] Requesting {0}x{0} cost matrix", coords.len());

        let response = match self
            .client
            .get(&url)
            .query(&[("annotations", "distance,duration")])
            .timeout(TABLE_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                log::warn!("[OSRM] Table request failed: {}. Using geodesic estimate.", err);
                return Ok(fallback_matrix(coords));
            }
        };

        let table: TableResponse = response.json().await?;
        if table.code != "Ok" {
            log::warn!(
                "[OSRM] Table API returned code {}. Using geodesic estimate.",
                table.code
            );
            return Ok(fallback_matrix(coords));
        }

        // null cells mean OSRM found no path between that pair
        Ok(CostMatrices {
            distances_km: convert_matrix(table.distances, 1000.0),
            durations_min: convert_matrix(table.durations, 60.0),
        })
    }

    async fn route(&self, from: Coord, to: Coord) -> Result<Option<RouteInfo>, RoutingError> {
        let url = format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url, self.profile, from.1, from.0, to.1, to.0
        );

        self.osrm_limiter.until_ready().await;
        log::debug!("[OSRM] Routing {:?} → {:?}", from, to);

        let body: RouteResponse = self
            .client
            .get(&url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "true"),
            ])
            .timeout(ROUTE_TIMEOUT)
            .send()
            .await?
            .json()
            .await?;

        if body.code != "Ok" {
            log::warn!("[OSRM] Route API returned code {}", body.code);
            return Ok(None);
        }
        let Some(route) = body.routes.into_iter().next() else {
            return Ok(None);
        };

        let steps = route
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(|step| RouteStep {
                name: step.name,
                maneuver_type: step.maneuver.kind,
                maneuver_modifier: step.maneuver.modifier,
                distance: step.distance,
                duration: step.duration,
            })
            .collect();

        Ok(Some(RouteInfo {
            distance_km: route.distance / 1000.0,
            duration_min: route.duration / 60.0,
            geometry: route.geometry,
            steps,
        }))
    }
}

fn convert_matrix(raw: Vec<Vec<Option<f64>>>, divisor: f64) -> Vec<Vec<f64>> {
    raw.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map_or(f64::INFINITY, |v| v / divisor))
                .collect()
        })
        .collect()
}
