//! Solicitation listing and detail endpoints.
//!
//! `/solicitations/{segment}` serves both a numbered results page and a
//! single solicitation: numeric segments are page numbers, anything else is
//! a solicitation number.

use axum::{
    Router,
    routing::get,
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::models::{AppState, ListParams, SolicitationResponse, SolicitationsResponse};
use crate::search::PageRequest;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/solicitations", get(list_solicitations))
        .route("/solicitations/{segment}", get(solicitation_or_page))
        .with_state(state)
}

async fn list_solicitations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<SolicitationsResponse>> {
    let page = params.page.unwrap_or(1);
    render_page(&state, page, params.search).await
}

async fn solicitation_or_page(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    match segment.parse::<i64>() {
        Ok(page) => Ok(render_page(&state, page, params.search).await?.into_response()),
        Err(_) => Ok(render_solicitation(&state, segment).await?.into_response()),
    }
}

async fn render_page(
    state: &AppState,
    page: i64,
    search: Option<String>,
) -> AppResult<Json<SolicitationsResponse>> {
    let request = PageRequest::new(page);
    info!(page = request.page_number, search = ?search, "Listing solicitations");

    let result = state
        .search
        .list_solicitations(request, search.as_deref())
        .await
        .inspect_err(|e| error!(error = %e, "Solicitation listing failed"))?;

    Ok(Json(SolicitationsResponse::new(result, search)))
}

async fn render_solicitation(state: &AppState, id: String) -> AppResult<Json<SolicitationResponse>> {
    let record = state
        .search
        .get_solicitation(&id)
        .await
        .inspect_err(|e| error!(error = %e, id = %id, "Solicitation lookup failed"))?;

    Ok(Json(SolicitationResponse::new(id, record)))
}
