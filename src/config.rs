//! Client configuration
//!
//! Values come from the environment (after `.env` is loaded by the binary),
//! with defaults suitable for a local backend.

use std::path::PathBuf;

use crate::indicators::UnknownCodePolicy;

/// Configuration for the ClariFind client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub api_base: String,
    /// Path of the persisted session token
    pub session_file: PathBuf,
    /// Directory for the rolling log file
    pub log_dir: PathBuf,
    /// What the normalizer does with table codes the backend did not return
    pub unknown_codes: UnknownCodePolicy,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            session_file: PathBuf::from(".clarifind/session.json"),
            log_dir: PathBuf::from(".clarifind/logs"),
            unknown_codes: UnknownCodePolicy::Drop,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparseable keys keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base) = lookup("CLARIFIND_API_BASE").filter(|v| !v.trim().is_empty()) {
            config.api_base = base.trim().to_string();
        }
        if let Some(path) = lookup("CLARIFIND_SESSION_FILE").filter(|v| !v.is_empty()) {
            config.session_file = PathBuf::from(path);
        }
        if let Some(dir) = lookup("CLARIFIND_LOG_DIR").filter(|v| !v.is_empty()) {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("CLARIFIND_PLACEHOLDERS") {
            if matches!(flag.trim(), "1" | "true" | "yes") {
                config.unknown_codes = UnknownCodePolicy::Placeholder;
            }
        }
        if let Some(secs) = lookup("CLARIFIND_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            config.timeout_secs = secs;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.unknown_codes, UnknownCodePolicy::Drop);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CLARIFIND_API_BASE", "https://api.clarifind.test/"),
            ("CLARIFIND_PLACEHOLDERS", "1"),
            ("CLARIFIND_TIMEOUT_SECS", "5"),
            ("CLARIFIND_SESSION_FILE", "/tmp/cf.json"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_base, "https://api.clarifind.test/");
        assert_eq!(config.unknown_codes, UnknownCodePolicy::Placeholder);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.session_file, PathBuf::from("/tmp/cf.json"));
    }

    #[test]
    fn test_bad_timeout_keeps_default() {
        let lookup = |k: &str| (k == "CLARIFIND_TIMEOUT_SECS").then(|| "soon".to_string());
        let config = ClientConfig::from_lookup(lookup);
        assert_eq!(config.timeout_secs, 30);
    }
}
