use clap::{Parser, Subcommand};
use gtour::{
    sdk::client::ApiClient,
    sdk::config::PlannerConfig,
    sdk::places::PlaceDb,
    sdk::planner::SolveRequest,
    sdk::render::{feature_collection, render_itinerary},
    sdk::routing::{CachedProvider, GeodesicProvider, OsrmProvider, RoutingProvider},
    sdk::server::{self, AppState},
    sdk::solver::OptimizeFor,
    sdk::util::log::init_logging,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::{fs::File, io::Write};

/// Plan sightseeing tours across Ho Chi Minh City landmark clusters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the solver API server
    Serve {
        /// Listen address (e.g. "127.0.0.1:5001")
        #[arg(long)]
        addr: Option<String>,

        /// Estimate costs from straight-line distances instead of OSRM
        #[arg(long)]
        offline: bool,
    },

    /// List the selectable landmark clusters
    Clusters {
        /// Solver API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Solve a tour visiting one landmark per selected cluster
    Plan {
        /// Start address or landmark name (e.g. "Dinh Độc Lập")
        #[arg(short, long)]
        start: String,

        /// End address or landmark name
        #[arg(short, long)]
        end: String,

        /// Cluster ids to visit, comma separated or repeated
        #[arg(short, long, value_delimiter = ',')]
        clusters: Vec<String>,

        /// Optimization criterion: "distance" or "time"
        #[arg(long, default_value = "distance")]
        optimize: OptimizeFor,

        /// Solver API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Write the tour geometries to this GeoJSON file
        #[arg(long)]
        geojson: Option<String>,

        /// Print the raw JSON response instead of the itinerary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Lỗi: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = PlannerConfig::from_env();

    match command {
        Command::Serve { addr, offline } => {
            let addr = addr.unwrap_or_else(|| config.listen_addr.clone());
            let db = Arc::new(PlaceDb::load()?);
            log::info!(
                "Catalogue loaded: {} landmarks in {} clusters",
                db.landmark_count(),
                db.clusters().len()
            );

            let provider: Arc<dyn RoutingProvider> = if offline {
                log::warn!("Offline mode, costs come from straight-line estimates");
                Arc::new(GeodesicProvider)
            } else {
                Arc::new(CachedProvider::new(
                    OsrmProvider::new(&config),
                    config.geo_cache_path.clone(),
                ))
            };

            let state = AppState {
                db,
                provider,
                iterations: config.solver_iterations,
            };
            server::serve(state, &addr).await
        }

        Command::Clusters { api_url, json } => {
            let client = ApiClient::new(api_url.unwrap_or(config.api_url));
            let clusters = client.clusters().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&clusters)?);
            } else {
                for (id, summary) in &clusters {
                    let (lat, lon) = summary.representative_coord;
                    println!("{:<24} {:<26} ({}, {})", id, summary.name, lat, lon);
                }
            }
            Ok(())
        }

        Command::Plan {
            start,
            end,
            clusters,
            optimize,
            api_url,
            geojson,
            json,
        } => {
            let client = ApiClient::new(api_url.unwrap_or(config.api_url));
            let request = SolveRequest {
                start_address: start,
                end_address: end,
                cluster_ids: clusters,
                optimize_for: optimize,
            };

            let result = client.solve(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_itinerary(&result));
            }

            if let Some(path) = geojson {
                let collection = feature_collection(&result);
                let mut file = File::create(&path)?;
                file.write_all(serde_json::to_string_pretty(&collection)?.as_bytes())?;
                log::info!("✅ Tour geometry written to {}", path);
            }
            Ok(())
        }
    }
}
