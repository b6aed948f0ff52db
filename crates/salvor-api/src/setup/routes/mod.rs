//! Route configuration and setup.
//!
//! Browser pages and their form targets live in one router; health checks in
//! [health](health).

mod health;

use crate::handlers::{delete, download, home, recover, results, upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use salvor_core::Config;
use salvor_infra::{request_id_middleware, security_headers_middleware, SecurityHeadersConfig};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

fn page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home::list_uploads))
        .route("/upload", post(upload::upload_image))
        .route("/recover/{id}", get(recover::recover_upload))
        .route("/delete/{id}", post(delete::delete_upload))
        .route("/results/{upload_id}", get(results::show_results))
        .route(
            "/download/{upload_id}/{filename}",
            get(download::download_recovered_file),
        )
}

fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let security_headers_config = SecurityHeadersConfig {
        hsts: config.is_production(),
    };

    tracing::info!(
        max_upload_size_bytes = config.max_upload_size_bytes(),
        "Request body limit enabled"
    );

    let app = page_routes()
        .merge(health_routes())
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}
