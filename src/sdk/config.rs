use crate::sdk::planner::DEFAULT_ITERATIONS;
use std::env;

/// Runtime settings, read once from the environment. Every field has
/// a default so the binary runs without any configuration.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub osrm_base_url: String,
    pub osrm_profile: String,
    pub nominatim_url: String,
    pub nominatim_user_agent: String,
    pub geocode_context: String,
    pub geocode_country: String,
    pub solver_iterations: usize,
    pub geo_cache_path: String,
    pub listen_addr: String,
    pub api_url: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self {
            osrm_base_url: env_or("OSRM_BASE_URL", "http://router.project-osrm.org"),
            osrm_profile: env_or("OSRM_PROFILE", "driving"),
            nominatim_url: env_or("NOMINATIM_URL", "https://nominatim.openstreetmap.org"),
            nominatim_user_agent: env_or("NOMINATIM_USER_AGENT", "gtour (contact@example.com)"),
            geocode_context: env_or("GEOCODE_CONTEXT", "Ho Chi Minh City, Vietnam"),
            geocode_country: env_or("GEOCODE_COUNTRY", "vn"),
            solver_iterations: env::var("SOLVER_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ITERATIONS),
            geo_cache_path: env_or("GEO_CACHE_PATH", "geocode_cache.json"),
            listen_addr: env_or("LISTEN_ADDR", "127.0.0.1:5001"),
            api_url: env_or("GTOUR_API_URL", "http://127.0.0.1:5001"),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
