/**
 * API Route Handlers
 *
 * Read-only JSON endpoints the chat page polls besides `/subscribe`.
 *
 * # Routes
 *
 * - `GET /settings` - Client-facing settings
 * - `GET /topics` - Popular or recent topic board
 */

use axum::{routing::get, Router};

use crate::backend::chat::handlers::{handle_settings, handle_topics};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/settings", get(handle_settings))
        .route("/topics", get(handle_topics))
}
