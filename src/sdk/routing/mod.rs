pub mod cache;
pub mod error;
pub mod geodesic;
pub mod osrm;
pub mod provider;

/// Coordinates are (latitude, longitude) throughout this crate.
/// OSRM URLs and GeoJSON geometries use lon,lat; the swap happens
/// only at the wire.
pub type Coord = (f64, f64);

pub use cache::{CachedProvider, GeoCache};
pub use error::RoutingError;
pub use geodesic::GeodesicProvider;
pub use osrm::OsrmProvider;
pub use provider::{CostMatrices, LineString, RouteInfo, RouteStep, RoutingProvider};
