/**
 * Router Configuration
 *
 * Combines every route configuration into a single Axum router.
 *
 * # Route Order
 *
 * 1. Chat routes (post, long-poll)
 * 2. API routes (settings, topic boards)
 * 3. Fallback: static files when a directory is configured, 404 otherwise
 */

use axum::{http::StatusCode, Router};
use tower_http::services::ServeDir;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state holding the broker and configuration
///
/// # Static Files
///
/// When `static_dir` is set, unknown paths are served from it, so `/`
/// resolves to its `index.html`. Missing files answer 404.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_chat_routes(Router::new());
    let router = configure_api_routes(router);

    let router = match app_state.config.static_dir.clone() {
        Some(dir) => {
            tracing::info!("[Server] Serving static files from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        None => router.fallback(not_found),
    };

    router.with_state(app_state)
}

async fn not_found() -> BackendError {
    BackendError::handler(StatusCode::NOT_FOUND, "404 Not Found")
}
