//! HTTP API exposing the cluster catalogue and the tour solver.

use crate::sdk::places::{ClusterSummary, PlaceDb};
use crate::sdk::planner::{self, PlanError, SolveRequest, SolveResult};
use crate::sdk::routing::RoutingProvider;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PlaceDb>,
    pub provider: Arc<dyn RoutingProvider>,
    pub iterations: usize,
}

/// Error payload is always `{"error": message}`, the shape consumers
/// key on.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn get_clusters(State(state): State<AppState>) -> Json<BTreeMap<String, ClusterSummary>> {
    Json(state.db.cluster_summaries())
}

async fn solve_gtsp(
    State(state): State<AppState>,
    payload: Result<Json<SolveRequest>, JsonRejection>,
) -> Result<Json<SolveResult>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let result = planner::plan_tour(
        &state.db,
        state.provider.as_ref(),
        &request,
        state.iterations,
    )
    .await
    .map_err(|err| {
        if err.is_client_error() {
            log::info!("[SERVER] Rejected solve request: {}", err);
        } else {
            log::error!("[SERVER] Solve failed: {}", err);
        }
        ApiError::from(err)
    })?;
    Ok(Json(result))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/get_clusters", get(get_clusters))
        .route("/solve_gtsp", post(solve_gtsp))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("[SERVER] Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
