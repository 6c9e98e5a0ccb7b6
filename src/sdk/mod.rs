pub mod client;
pub mod config;
pub mod format;
pub mod places;
pub mod planner;
pub mod render;
pub mod routing;
pub mod server;
pub mod solver;
pub mod util;
