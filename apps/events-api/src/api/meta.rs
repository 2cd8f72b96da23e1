//! Root and readiness endpoints.
//!
//! These sit outside the `/api` prefix: `/` identifies the service and
//! `/ready` reports per-dependency connectivity for orchestrators.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
}

/// Create the root/readiness router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Service identification for the API root
async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Events API",
        version: state.config.app.version,
    })
}

/// Readiness check reporting each dependency's connectivity
async fn readiness_check(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "mongodb",
        Box::pin(async {
            let status = database::check_health_detailed(&state.mongo_client).await;
            if status.healthy {
                Ok(())
            } else {
                Err(status
                    .message
                    .unwrap_or_else(|| "MongoDB ping failed".to_string()))
            }
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use http_body_util::BodyExt;
    use mongodb::Client;
    use tower::ServiceExt;

    // The driver connects lazily, so an unused client needs no server
    async fn test_state() -> AppState {
        let mongo_client = Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .unwrap();
        let db = mongo_client.database("meta_test");
        AppState {
            config: Config {
                app: app_info!(),
                mongodb: database::MongoConfig::with_database(
                    "mongodb://127.0.0.1:27017",
                    "meta_test",
                ),
                server: ServerConfig::default(),
                environment: core_config::Environment::Development,
            },
            mongo_client,
            db,
        }
    }

    #[tokio::test]
    async fn test_root_identifies_the_service() {
        let app = router(test_state().await);

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Events API");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
