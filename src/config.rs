use anyhow::Result;
use serde::Deserialize;
use std::env;

use crate::types::AppError;

/// Default endpoint for the keyed-envelope (`response.docs`) deployment.
pub const KEYED_DEFAULT_URI: &str =
    "http://fbopen-lb1-1729291742.us-west-2.elb.amazonaws.com:3000/v0/opp";
/// Default endpoint for the flat-envelope api.data.gov deployment.
pub const FLAT_DEFAULT_URI: &str = "http://api.data.gov/gsa/fbopen-dev/v0/opps";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Count and docs nested under `response`.
    Keyed,
    /// Count and docs at the top level, API key required.
    Flat,
}

impl BackendKind {
    pub fn default_uri(&self) -> &'static str {
        match self {
            BackendKind::Keyed => KEYED_DEFAULT_URI,
            BackendKind::Flat => FLAT_DEFAULT_URI,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Keyed => write!(f, "keyed"),
            BackendKind::Flat => write!(f, "flat"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyed" | "a" => Ok(BackendKind::Keyed),
            "flat" | "b" => Ok(BackendKind::Flat),
            other => Err(AppError::Config(format!("Unknown SBIR_BACKEND: {}", other))),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct UpstreamConfig {
    pub backend: BackendKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

// Keep the API key out of startup logs.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl UpstreamConfig {
    /// Resolve upstream settings from already-read variables.
    ///
    /// The flat backend cannot serve a single request without an API key, so a
    /// missing key is rejected here rather than per request.
    pub fn resolve(
        backend: BackendKind,
        base_url: Option<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if backend == BackendKind::Flat && api_key.is_none() {
            return Err(AppError::Config(
                "Please set your FBOPEN_API_KEY environment variable.".to_string(),
            ));
        }

        Ok(Self {
            backend,
            base_url: base_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| backend.default_uri().to_string()),
            api_key,
            timeout_secs,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let backend: BackendKind = env::var("SBIR_BACKEND")
            .unwrap_or_else(|_| "flat".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            upstream: UpstreamConfig::resolve(
                backend,
                env::var("FBOPEN_URI").ok(),
                env::var("FBOPEN_API_KEY").ok(),
                env::var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            )?,
        })
    }
}
