use env_logger::{Builder, Env};
use log::LevelFilter;

/// `RUST_LOG` controls verbosity, defaulting to info. The HTTP stack
/// stays at warn so solver and routing logs remain readable.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(false)
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .init();
}
