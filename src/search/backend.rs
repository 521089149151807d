//! Upstream backend variants
//!
//! The two FBOpen deployments differ in where the count and documents live
//! in the response body, how identifiers are matched, and which extra
//! parameters each request carries. Everything else about a search request
//! is shared by [`crate::search::SearchClient`].

use serde_json::Value;

use crate::config::{BackendKind, UpstreamConfig};
use crate::search::normalize::RawRecord;
use crate::types::{AppError, AppResult};

/// Filter excluding listings without a URL.
pub const LISTING_URL_FILTER: &str = "listing_url:[* TO *]";

/// Count and documents pulled out of an upstream response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub total_count: u64,
    pub docs: Vec<RawRecord>,
}

pub trait UpstreamBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn base_url(&self) -> &str;

    /// Extract count and documents from a decoded response body.
    fn extract(&self, body: Value) -> AppResult<Envelope>;

    /// Identifier as it should appear in a `solnbr:` query.
    fn lookup_identifier(&self, identifier: &str) -> String {
        identifier.to_string()
    }

    /// Secondary `fq` filter for list requests.
    fn list_filter(&self) -> Option<&str> {
        None
    }

    /// Parameters sent with every request.
    fn common_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Backend whose count and docs sit under a `response` key.
#[derive(Debug, Clone)]
pub struct KeyedEnvelopeBackend {
    base_url: String,
}

impl KeyedEnvelopeBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl UpstreamBackend for KeyedEnvelopeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Keyed
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn extract(&self, mut body: Value) -> AppResult<Envelope> {
        let response = body
            .get_mut("response")
            .map(Value::take)
            .ok_or_else(|| AppError::Upstream("Response body has no `response` object".to_string()))?;
        extract_envelope(response)
    }
}

/// Backend with a top-level count and docs, authenticated by API key.
#[derive(Clone)]
pub struct FlatEnvelopeBackend {
    base_url: String,
    api_key: String,
}

impl FlatEnvelopeBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for FlatEnvelopeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatEnvelopeBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UpstreamBackend for FlatEnvelopeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Flat
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn extract(&self, body: Value) -> AppResult<Envelope> {
        extract_envelope(body)
    }

    fn lookup_identifier(&self, identifier: &str) -> String {
        identifier.to_uppercase()
    }

    fn list_filter(&self) -> Option<&str> {
        Some(LISTING_URL_FILTER)
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        vec![("api_key", self.api_key.clone())]
    }
}

/// Build the backend selected by configuration.
pub fn from_config(config: &UpstreamConfig) -> AppResult<Box<dyn UpstreamBackend>> {
    match config.backend {
        BackendKind::Keyed => Ok(Box::new(KeyedEnvelopeBackend::new(&config.base_url))),
        BackendKind::Flat => {
            let api_key = config.api_key.as_deref().ok_or_else(|| {
                AppError::Config("Flat backend requires FBOPEN_API_KEY".to_string())
            })?;
            Ok(Box::new(FlatEnvelopeBackend::new(&config.base_url, api_key)))
        }
    }
}

fn extract_envelope(mut body: Value) -> AppResult<Envelope> {
    let total_count = body
        .get("numFound")
        .ok_or_else(|| AppError::Upstream("Response is missing `numFound`".to_string()))?
        .as_u64()
        .ok_or_else(|| AppError::Upstream("`numFound` is not a non-negative integer".to_string()))?;

    let docs = match body.get_mut("docs").map(Value::take) {
        Some(Value::Array(docs)) => docs,
        Some(_) => return Err(AppError::Upstream("`docs` is not an array".to_string())),
        None => return Err(AppError::Upstream("Response is missing `docs`".to_string())),
    };

    let docs = docs
        .into_iter()
        .map(|doc| match doc {
            Value::Object(map) => Ok(map),
            other => Err(AppError::Upstream(format!(
                "Expected document object, got {}",
                other
            ))),
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Envelope { total_count, docs })
}
