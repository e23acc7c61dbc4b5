//! API Module
//!
//! HTTP client for the ClariFind backend, the bearer-token session and the
//! wire types shared by the rest of the crate.

mod client;
mod session;
pub mod types;

pub use client::ApiClient;
pub use session::Session;
pub use types::{
    CompanyLite, IndicatorDetailResponse, IndicatorSummary, RawIndicatorRow, ResolveResponse,
    SuggestResponse, TrueOnlyResponse, User,
};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the API layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the backend; the session token has been cleared.
    #[error("session expired or invalid credentials")]
    Unauthorized,
    #[error("no data found")]
    NotFound,
    #[error("request failed with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Option<Value>,
    },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("session storage error: {0}")]
    Session(std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Indicator endpoints used by the analysis pipeline and the detail loader.
///
/// `ApiClient` is the production implementation; tests substitute canned
/// responses.
#[async_trait]
pub trait IndicatorApi: Send + Sync {
    async fn indicator_summary(&self, registration_id: &str) -> Result<IndicatorSummary, ApiError>;

    async fn indicator_true_only(&self, registration_id: &str)
        -> Result<TrueOnlyResponse, ApiError>;

    async fn indicator_details(
        &self,
        registration_id: &str,
        code: &str,
    ) -> Result<IndicatorDetailResponse, ApiError>;
}
