//! HTTP route wiring.
//!
//! Each submodule builds one domain's router over the shared MongoDB
//! handle. `routes` is nested under `/api` by `axum_helpers::create_router`;
//! `meta` is merged at the root instead.

pub mod catalog;
pub mod meta;
pub mod registration;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/events", catalog::router(state))
        .nest("/registration", registration::router(state))
}
