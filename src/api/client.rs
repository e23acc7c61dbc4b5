//! ClariFind REST client
//!
//! Thin JSON client over reqwest. Attaches the session's bearer token,
//! maps non-2xx responses into `ApiError` and clears the session on 401.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::types::{LoginRequest, LoginResponse, MeResponse};
use super::{
    ApiError, IndicatorApi, IndicatorDetailResponse, IndicatorSummary, ResolveResponse, Session,
    SuggestResponse, TrueOnlyResponse, User,
};
use crate::config::ClientConfig;

pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("clarifind/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Join base and path without doubling the separator.
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        skip_auth: bool,
    ) -> Result<T, ApiError> {
        let mut request = request.header(reqwest::header::ACCEPT, "application/json");
        if !skip_auth {
            if let Some(token) = self.session.token().await {
                request = request.bearer_auth(token);
            }
        }

        let res = request.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Backend returned 401, clearing session token");
                self.session.clear().await?;
                Err(ApiError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            _ => {
                let message = if text.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text.clone()
                };
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                    body: serde_json::from_str(&text).ok(),
                })
            }
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        debug!("GET {} {:?}", path, query);
        let request = self.client.request(Method::GET, self.url(path)).query(query);
        self.send(request, false).await
    }

    // ─── Auth ──────────────────────────────────────────────────────────────

    /// Log in and persist the token. `Ok(false)` means wrong credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool, ApiError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password });

        match self.send::<LoginResponse>(request, true).await {
            Ok(res) => {
                self.session.set_token(res.token).await?;
                let user = res.user.map(|u| u.username).unwrap_or_else(|| username.to_string());
                info!("Logged in as {}", user);
                Ok(true)
            }
            Err(ApiError::Unauthorized) => Ok(false),
            Err(e) => {
                self.session.clear().await?;
                Err(e)
            }
        }
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let res: MeResponse = self.get("/auth/me", &[]).await?;
        Ok(res.user)
    }

    /// Hydrate the session and validate the stored token. An invalid token is
    /// cleared and `None` returned.
    pub async fn restore(&self) -> Result<Option<User>, ApiError> {
        if self.session.hydrate().await?.is_none() {
            return Ok(None);
        }
        match self.me().await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                info!("Stored session rejected: {}", e);
                self.session.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.clear().await
    }

    // ─── Company lookup ────────────────────────────────────────────────────

    pub async fn resolve_registration(
        &self,
        registration_id: &str,
    ) -> Result<ResolveResponse, ApiError> {
        self.get(
            "/v1/company/resolve",
            &[("registration_id", registration_id.to_string())],
        )
        .await
    }

    pub async fn search_companies(
        &self,
        q: &str,
        skip: u64,
        take: u64,
    ) -> Result<ResolveResponse, ApiError> {
        self.get(
            "/v1/company/resolve",
            &[
                ("q", q.to_string()),
                ("skip", skip.to_string()),
                ("take", take.to_string()),
                ("count", "auto".to_string()),
            ],
        )
        .await
    }

    /// Autosuggest. Queries shorter than `min_len` characters return nothing
    /// without a request.
    pub async fn suggest_companies(
        &self,
        q: &str,
        limit: u32,
        min_len: usize,
    ) -> Result<SuggestResponse, ApiError> {
        let q = q.trim();
        if q.chars().count() < min_len {
            return Ok(SuggestResponse::default());
        }
        self.get(
            "/v1/company/suggest",
            &[
                ("q", q.to_string()),
                ("limit", limit.to_string()),
                ("minLen", min_len.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl IndicatorApi for ApiClient {
    async fn indicator_summary(&self, registration_id: &str) -> Result<IndicatorSummary, ApiError> {
        self.get(
            "/v1/indicators/summary",
            &[("registration_id", registration_id.to_string())],
        )
        .await
    }

    async fn indicator_true_only(
        &self,
        registration_id: &str,
    ) -> Result<TrueOnlyResponse, ApiError> {
        self.get(
            "/v1/indicator/true-only",
            &[("registration_id", registration_id.to_string())],
        )
        .await
    }

    async fn indicator_details(
        &self,
        registration_id: &str,
        code: &str,
    ) -> Result<IndicatorDetailResponse, ApiError> {
        self.get(
            "/v1/indicator/details",
            &[
                ("registration_id", registration_id.to_string()),
                ("code", code.to_uppercase()),
            ],
        )
        .await
    }
}
