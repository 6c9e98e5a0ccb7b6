//! HTTP client for the solver API, used by the command line front end.

use crate::sdk::places::ClusterSummary;
use crate::sdk::planner::{SolveRequest, SolveResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Vui lòng chọn ít nhất 1 cụm điểm tham quan.")]
    NoClusterSelected,
    #[error("{0}")]
    Server(String),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// Failed responses carry `{"error": message}`; anything else falls
/// back to a generic message.
async fn error_message(response: reqwest::Response, fallback: &str) -> ClientError {
    let message = match response.json::<ErrorBody>().await {
        Ok(body) if !body.error.is_empty() => body.error,
        _ => fallback.to_string(),
    };
    ClientError::Server(message)
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn clusters(&self) -> Result<BTreeMap<String, ClusterSummary>, ClientError> {
        let url = format!("{}/get_clusters", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(error_message(response, "Không thể tải danh sách cụm").await);
        }
        Ok(response.json().await?)
    }

    /// Submits a solve request. At least one cluster must be selected;
    /// everything else is validated server side.
    pub async fn solve(&self, request: &SolveRequest) -> Result<SolveResult, ClientError> {
        if request.cluster_ids.is_empty() {
            return Err(ClientError::NoClusterSelected);
        }
        let url = format!("{}/solve_gtsp", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(error_message(response, "Lỗi không xác định từ máy chủ Logic").await);
        }
        Ok(response.json().await?)
    }
}
