// SBIR Search - web front end for SBIR/STTR solicitation listings

pub mod config;
pub mod models;
pub mod types;
pub mod search;    // Query, pagination, normalization and upstream clients
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
