// HTTP surface: routes, shared state and the serve loop.

pub mod error;
pub mod extract;
pub mod handlers;

use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::generator::TestGenerator;

pub use error::ApiError;
pub use extract::ApiJson;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub generator: TestGenerator,
}

impl AppState {
    pub fn new(generator: TestGenerator) -> Self {
        Self { generator }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/llm/manual-test", post(handlers::manual_test))
        .route("/llm/generate-ui-e2e-test", post(handlers::ui_e2e_test))
        .route("/llm/generate-api-test", post(handlers::api_test))
        .route("/llm/generate-api-manual-test", post(handlers::api_manual_test))
        .route("/llm/bulk-manual-tests", post(handlers::bulk_manual_tests))
        .route("/llm/bulk-api-tests", post(handlers::bulk_api_tests))
        .with_state(state)
}

/// CORS for the given origins; an empty list allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    tracing::info!("Starting server at {}", addr);

    axum::Server::try_bind(&addr)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return std::future::pending().await;
    }
    tracing::info!("shutting down");
}
