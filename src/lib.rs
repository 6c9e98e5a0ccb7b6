pub mod sdk;

pub use sdk::client::ApiClient;
pub use sdk::config::PlannerConfig;
pub use sdk::places::PlaceDb;
pub use sdk::planner::{plan_tour, SolveRequest, SolveResult};
pub use sdk::routing::{CachedProvider, GeoCache, GeodesicProvider, OsrmProvider, RoutingProvider};
pub use sdk::solver::{GraspSolver, OptimizeFor};
