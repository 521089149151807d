//! HTTP Routes
//!
//! - `/api/health` - Health check
//! - `/solicitations` - Paged solicitation search
//! - `/solicitations/{segment}` - Numbered results page or single solicitation

pub mod health;
pub mod solicitations;

use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::cors::apply_cors;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(solicitations::router(state.clone()))
        .merge(health::router(state))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &origins)
}
