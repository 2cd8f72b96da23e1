//! Event catalog routes

use axum::Router;
use domain_catalog::{CatalogService, MongoCatalogEventRepository, handlers};

use crate::state::AppState;

/// Create the catalog router backed by MongoDB
pub fn router(state: &AppState) -> Router {
    let repository = MongoCatalogEventRepository::new(&state.db);
    let service = CatalogService::new(repository);

    handlers::router(service)
}
