//! Solicitation search client
//!
//! Every call issues exactly one upstream request. Nothing is cached and
//! failed requests are not retried; errors go straight back to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{BackendKind, UpstreamConfig};
use crate::search::backend::{self, Envelope, UpstreamBackend};
use crate::search::normalize::{NormalizedRecord, ResultNormalizer};
use crate::search::pagination::{PageInfo, PageRequest};
use crate::search::query::QueryBuilder;
use crate::types::{AppError, AppResult};

/// Fields requested from upstream.
pub const RESULT_FIELDS: &str =
    "description,title,summary,listing_url,solnbr,office,agency,close_dt,open_dt,posted_dt";

/// One page of normalized solicitations.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub records: Vec<NormalizedRecord>,
    pub page_info: PageInfo,
    pub is_empty: bool,
}

#[async_trait]
pub trait SolicitationSource: Send + Sync {
    async fn list_solicitations(
        &self,
        page: PageRequest,
        user_terms: Option<&str>,
    ) -> AppResult<SearchPage>;

    async fn get_solicitation(&self, identifier: &str) -> AppResult<NormalizedRecord>;

    fn backend_kind(&self) -> BackendKind;
}

pub struct SearchClient {
    http: Client,
    backend: Box<dyn UpstreamBackend>,
    queries: QueryBuilder,
    normalizer: ResultNormalizer,
}

impl SearchClient {
    pub fn new(backend: Box<dyn UpstreamBackend>, normalizer: ResultNormalizer) -> Self {
        Self::with_http_client(Client::new(), backend, normalizer)
    }

    pub fn with_http_client(
        http: Client,
        backend: Box<dyn UpstreamBackend>,
        normalizer: ResultNormalizer,
    ) -> Self {
        Self {
            http,
            backend,
            queries: QueryBuilder::new(),
            normalizer,
        }
    }

    /// Build a client for the configured backend.
    pub fn from_config(config: &UpstreamConfig, normalizer: ResultNormalizer) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(
            http,
            backend::from_config(config)?,
            normalizer,
        ))
    }

    pub fn with_query_builder(mut self, queries: QueryBuilder) -> Self {
        self.queries = queries;
        self
    }

    async fn fetch(&self, mut params: Vec<(&'static str, String)>) -> AppResult<Envelope> {
        params.extend(self.backend.common_params());

        let response = self
            .http
            .get(self.backend.base_url())
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, backend = %self.backend.kind(), "Upstream request failed");
                AppError::Upstream(format!("Request to upstream failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Upstream returned an error status");
            return Err(AppError::Upstream(format!(
                "Upstream returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse upstream response: {}", e)))?;

        self.backend.extract(body)
    }
}

#[async_trait]
impl SolicitationSource for SearchClient {
    async fn list_solicitations(
        &self,
        page: PageRequest,
        user_terms: Option<&str>,
    ) -> AppResult<SearchPage> {
        let query = self.queries.build(user_terms);
        let offset = page.offset();

        info!(
            query = %query,
            offset,
            backend = %self.backend.kind(),
            "Searching solicitations"
        );

        let mut params = vec![
            ("q", query),
            ("start", offset.to_string()),
            ("rows", page.page_size.to_string()),
            ("fl", RESULT_FIELDS.to_string()),
        ];
        if let Some(filter) = self.backend.list_filter() {
            params.push(("fq", filter.to_string()));
        }

        let envelope = self.fetch(params).await?;
        debug!(total_count = envelope.total_count, docs = envelope.docs.len(), "Upstream page received");

        let page_info = PageInfo::from_request(&page, envelope.total_count);
        let records = self.normalizer.normalize_all(envelope.docs)?;
        let is_empty = records.is_empty();

        info!(count = records.len(), total_pages = page_info.total_pages, "Solicitation search completed");
        Ok(SearchPage {
            records,
            page_info,
            is_empty,
        })
    }

    async fn get_solicitation(&self, identifier: &str) -> AppResult<NormalizedRecord> {
        let lookup = self.backend.lookup_identifier(identifier);
        info!(identifier = %lookup, backend = %self.backend.kind(), "Looking up solicitation");

        let params = vec![
            ("q", self.queries.by_identifier(&lookup)),
            ("rows", "1".to_string()),
            ("fl", RESULT_FIELDS.to_string()),
        ];

        let envelope = self.fetch(params).await?;
        let raw = envelope
            .docs
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Solicitation {}", identifier)))?;

        self.normalizer.normalize(raw)
    }

    fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::backend::{FlatEnvelopeBackend, KeyedEnvelopeBackend};
    use crate::search::query::SBIR_STTR_FILTER;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;
    use serde_json::json;

    fn keyed_client(server: &mockito::ServerGuard) -> SearchClient {
        let url = format!("{}/v0/opp", server.url());
        SearchClient::new(
            Box::new(KeyedEnvelopeBackend::new(url)),
            ResultNormalizer::default(),
        )
    }

    fn flat_client(server: &mockito::ServerGuard) -> SearchClient {
        let url = format!("{}/v0/opps", server.url());
        SearchClient::new(
            Box::new(FlatEnvelopeBackend::new(url, "test-key")),
            ResultNormalizer::default(),
        )
    }

    #[tokio::test]
    async fn test_flat_list_sends_expected_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0/opps")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), format!("{} AND laser", SBIR_STTR_FILTER)),
                Matcher::UrlEncoded("fq".into(), "listing_url:[* TO *]".into()),
                Matcher::UrlEncoded("start".into(), "20".into()),
                Matcher::UrlEncoded("rows".into(), "20".into()),
                Matcher::UrlEncoded("fl".into(), RESULT_FIELDS.into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "numFound": 45,
                    "docs": [{
                        "solnbr": "NSF-13-546",
                        "agency": "National Science Foundation",
                        "close_dt": "2013-06-12T00:00:00Z"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = tokio_test::assert_ok!(
            flat_client(&server)
                .list_solicitations(PageRequest::new(2), Some("laser"))
                .await
        );

        mock.assert_async().await;
        assert_eq!(page.page_info.total_pages, 3);
        assert!(page.page_info.has_previous);
        assert!(page.page_info.has_next);
        assert!(!page.is_empty);
        assert_eq!(page.records[0].agency_abbr.as_deref(), Some("NSF"));
        assert_eq!(
            page.records[0].close_dt,
            Some(Utc.with_ymd_and_hms(2013, 6, 12, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_keyed_list_reads_nested_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0/opp")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), SBIR_STTR_FILTER.into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "response": {
                        "numFound": 1,
                        "docs": [{ "solnbr": "AF131-001", "agency": "Department of the Air Force" }]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = keyed_client(&server)
            .list_solicitations(PageRequest::default(), None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.page_info.total_pages, 1);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].agency_abbr.as_deref(), Some("USAF"));
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/opps")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "numFound": 0, "docs": [] }).to_string())
            .create_async()
            .await;

        let page = flat_client(&server)
            .list_solicitations(PageRequest::default(), None)
            .await
            .unwrap();

        assert!(page.records.is_empty());
        assert_eq!(page.page_info.total_pages, 0);
        assert!(!page.page_info.has_next);
        assert!(page.is_empty);
    }

    #[tokio::test]
    async fn test_malformed_date_fails_whole_list() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/opps")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "numFound": 2,
                    "docs": [
                        { "solnbr": "A", "close_dt": "2013-04-05T00:00:00Z" },
                        { "solnbr": "B", "close_dt": "soon" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = flat_client(&server)
            .list_solicitations(PageRequest::default(), None)
            .await;
        assert!(matches!(result, Err(AppError::MalformedRecord { .. })));
    }

    #[tokio::test]
    async fn test_missing_count_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/opp")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "response": { "docs": [] } }).to_string())
            .create_async()
            .await;

        let result = keyed_client(&server)
            .list_solicitations(PageRequest::default(), None)
            .await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_error_status_and_bad_json_are_upstream_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/opps")
            .match_query(Matcher::UrlEncoded("rows".into(), "1".into()))
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;
        server
            .mock("GET", "/v0/opps")
            .match_query(Matcher::UrlEncoded("rows".into(), "20".into()))
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = flat_client(&server);
        assert!(matches!(
            client.get_solicitation("X").await,
            Err(AppError::Upstream(_))
        ));
        assert!(matches!(
            client.list_solicitations(PageRequest::default(), None).await,
            Err(AppError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_flat_lookup_upper_cases_identifier() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0/opps")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "solnbr:AF131-001".into()),
                Matcher::UrlEncoded("rows".into(), "1".into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "numFound": 1,
                    "docs": [{ "solnbr": "AF131-001", "summary": "Hypersonic materials" }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let record = flat_client(&server).get_solicitation("af131-001").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.solnbr(), Some("AF131-001"));
        assert_eq!(record.description(), Some("Hypersonic materials"));
    }

    #[tokio::test]
    async fn test_keyed_lookup_keeps_identifier_case() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0/opp")
            .match_query(Matcher::UrlEncoded("q".into(), "solnbr:af131-001".into()))
            .with_status(200)
            .with_body(json!({ "response": { "numFound": 1, "docs": [{ "solnbr": "af131-001" }] } }).to_string())
            .create_async()
            .await;

        let record = keyed_client(&server).get_solicitation("af131-001").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.solnbr(), Some("af131-001"));
    }

    #[tokio::test]
    async fn test_lookup_without_match_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/opp")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "response": { "numFound": 0, "docs": [] } }).to_string())
            .create_async()
            .await;

        let result = keyed_client(&server).get_solicitation("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_upstream_error() {
        let client = SearchClient::new(
            Box::new(KeyedEnvelopeBackend::new("http://127.0.0.1:1/v0/opp")),
            ResultNormalizer::default(),
        );
        let result = client.list_solicitations(PageRequest::default(), None).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
