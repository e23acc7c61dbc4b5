//! Session - bearer token persistence
//!
//! Holds the API token for one client and keeps it on disk so a restarted
//! client can skip the login prompt. Lifecycle is explicit: `hydrate` on
//! start, `set_token` after login, `clear` on logout or a 401.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::ApiError;

/// On-disk session format
#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
struct SessionFile {
    cf_token: Option<String>,
}

pub struct Session {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            token: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted token, if any. A missing file is an empty session;
    /// so is one that does not parse, which is removed.
    pub async fn hydrate(&self) -> Result<Option<String>, ApiError> {
        if !fs::try_exists(&self.path).await.map_err(ApiError::Session)? {
            return Ok(None);
        }

        let bytes = fs::read(&self.path).await.map_err(ApiError::Session)?;
        let state: SessionFile = match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                warn!("Discarding corrupt session file {}: {}", self.path.display(), e);
                self.clear().await?;
                return Ok(None);
            }
        };

        let mut token = self.token.write().await;
        *token = state.cf_token.filter(|t| !t.is_empty());
        debug!(
            "Session hydrated from {} (token present: {})",
            self.path.display(),
            token.is_some()
        );
        Ok(token.clone())
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Store a token in memory and on disk.
    pub async fn set_token(&self, token: impl Into<String>) -> Result<(), ApiError> {
        let token = token.into();
        let json = serde_json::to_string_pretty(&SessionFile {
            cf_token: Some(token.clone()),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ApiError::Session)?;
            }
        }
        fs::write(&self.path, json).await.map_err(ApiError::Session)?;

        *self.token.write().await = Some(token);
        Ok(())
    }

    /// Forget the token and remove the session file.
    pub async fn clear(&self) -> Result<(), ApiError> {
        *self.token.write().await = None;
        if fs::try_exists(&self.path).await.map_err(ApiError::Session)? {
            fs::remove_file(&self.path).await.map_err(ApiError::Session)?;
        }
        Ok(())
    }
}
