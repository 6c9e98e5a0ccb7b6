use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("underlying request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Generic(String),
}
