//! Route retrieval
//!
//! [`RouteApi`] is the seam between the application and the remote service;
//! [`HttpRouteApi`] is the production implementation.

mod http;

pub use http::{ApiConfig, HttpRouteApi};

use async_trait::async_trait;
use strava_route_lib::{RouteDetails, RouteId, RouteStats, RouteSummary};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid API base URL {url}: {message}")]
    BaseUrl { url: String, message: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether the server answered "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Remote source of routes
#[async_trait]
pub trait RouteApi: Send + Sync {
    /// Routes whose name matches `query`
    async fn search(&self, query: &str) -> ApiResult<Vec<RouteSummary>>;

    async fn get_details(&self, id: RouteId) -> ApiResult<RouteDetails>;

    /// May fail independently of [`RouteApi::get_details`]
    async fn get_stats(&self, id: RouteId) -> ApiResult<RouteStats>;
}
