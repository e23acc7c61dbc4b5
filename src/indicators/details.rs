//! Detail Drill-down Loader
//!
//! Lazily fetches the detail table behind one indicator the first time it
//! is expanded and caches it for the life of a results view. Keys are the
//! uppercased indicator code. A failed fetch is remembered per code and a
//! later `ensure` retries it; it never affects other codes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{IndicatorApi, IndicatorDetailResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Idle,
    Loading,
    Failed(String),
    Loaded(Arc<IndicatorDetailResponse>),
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading)
    }

    pub fn data(&self) -> Option<&Arc<IndicatorDetailResponse>> {
        match self {
            DetailState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

fn cache_key(code: &str) -> String {
    code.trim().to_uppercase()
}

pub struct DetailLoader {
    api: Arc<dyn IndicatorApi>,
    registration_id: String,
    states: RwLock<HashMap<String, DetailState>>,
    tx: broadcast::Sender<String>,
}

impl DetailLoader {
    pub fn new(api: Arc<dyn IndicatorApi>, registration_id: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            api,
            registration_id: registration_id.into(),
            states: RwLock::new(HashMap::new()),
            tx,
        }
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    /// Receives the cache key of every code whose state settled.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub async fn state(&self, code: &str) -> DetailState {
        self.states
            .read()
            .await
            .get(&cache_key(code))
            .cloned()
            .unwrap_or(DetailState::Idle)
    }

    /// Snapshot of every known state, for synchronous renderers.
    pub async fn snapshot(&self) -> HashMap<String, DetailState> {
        self.states.read().await.clone()
    }

    /// Fetch the detail for `code` unless it is already loaded or in flight.
    /// Returns the state after this call settles.
    pub async fn ensure(&self, code: &str) -> DetailState {
        let key = cache_key(code);
        if key.is_empty() {
            return DetailState::Idle;
        }

        {
            let mut states = self.states.write().await;
            let existing = states.get(&key);
            if let Some(existing @ (DetailState::Loading | DetailState::Loaded(_))) = existing {
                debug!("Detail for {} already requested", key);
                return existing.clone();
            }
            states.insert(key.clone(), DetailState::Loading);
        }

        debug!("Fetching detail for {} ({})", key, self.registration_id);
        let state = match self.api.indicator_details(&self.registration_id, &key).await {
            Ok(resp) => DetailState::Loaded(Arc::new(resp)),
            Err(e) => {
                warn!("Detail fetch for {} failed: {}", key, e);
                DetailState::Failed(e.to_string())
            }
        };

        self.states.write().await.insert(key.clone(), state.clone());
        let _ = self.tx.send(key);
        state
    }

    /// `ensure` on a background task, for callers that must not wait.
    pub fn spawn_ensure(self: &Arc<Self>, code: &str) -> JoinHandle<DetailState> {
        let loader = Arc::clone(self);
        let code = code.to_string();
        tokio::spawn(async move { loader.ensure(&code).await })
    }
}
