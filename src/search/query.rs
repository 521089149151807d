//! Upstream query string construction.
//!
//! User terms are handed to upstream verbatim; the search service parses its
//! own query syntax.

/// Terms restricting results to SBIR/STTR solicitations.
pub const SBIR_STTR_FILTER: &str = r#"(SBIR OR "small business innovation research" OR STTR OR "small business technology transfer")"#;

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_filter: String,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::with_base_filter(SBIR_STTR_FILTER)
    }

    pub fn with_base_filter(base_filter: impl Into<String>) -> Self {
        Self {
            base_filter: base_filter.into(),
        }
    }

    pub fn base_filter(&self) -> &str {
        &self.base_filter
    }

    pub fn build(&self, user_terms: Option<&str>) -> String {
        match user_terms.filter(|t| !t.trim().is_empty()) {
            Some(terms) => format!("{} AND {}", self.base_filter, terms),
            None => self.base_filter.clone(),
        }
    }

    /// Query matching a single solicitation number.
    pub fn by_identifier(&self, identifier: &str) -> String {
        format!("solnbr:{}", identifier)
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
