use std::sync::Arc;

use crate::config::Config;
use crate::search::normalize::format_display_date;
use crate::search::{NormalizedRecord, PageInfo, SearchPage, SolicitationSource};

pub const NO_RESULTS_MSG: &str = "No results found";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub search: Arc<dyn SolicitationSource>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SolicitationView {
    #[serde(flatten)]
    pub record: NormalizedRecord,
    pub close_dt_display: String,
    pub open_dt_display: String,
    pub posted_dt_display: String,
}

impl From<NormalizedRecord> for SolicitationView {
    fn from(record: NormalizedRecord) -> Self {
        Self {
            close_dt_display: format_display_date(record.close_dt.as_ref()),
            open_dt_display: format_display_date(record.open_dt.as_ref()),
            posted_dt_display: format_display_date(record.posted_dt.as_ref()),
            record,
        }
    }
}

/// Page metadata plus the links a pager needs.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PagerView {
    #[serde(flatten)]
    pub info: PageInfo,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
    pub pages: Vec<Option<u64>>,
}

impl From<PageInfo> for PagerView {
    fn from(info: PageInfo) -> Self {
        Self {
            previous_page: info.previous_page(),
            next_page: info.next_page(),
            pages: info.pages(),
            info,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SolicitationsResponse {
    pub search_terms: Option<String>,
    pub pager: PagerView,
    pub results: Vec<SolicitationView>,
    pub no_results_msg: String,
}

impl SolicitationsResponse {
    pub fn new(page: SearchPage, search_terms: Option<String>) -> Self {
        let no_results_msg = if page.is_empty {
            NO_RESULTS_MSG.to_string()
        } else {
            String::new()
        };

        Self {
            search_terms,
            pager: page.page_info.into(),
            results: page.records.into_iter().map(SolicitationView::from).collect(),
            no_results_msg,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SolicitationResponse {
    pub id: String,
    pub solicitation: SolicitationView,
    pub description: Option<String>,
}

impl SolicitationResponse {
    pub fn new(id: String, record: NormalizedRecord) -> Self {
        let description = record.description().map(String::from);
        Self {
            id,
            solicitation: record.into(),
            description,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub backend: String,
}
