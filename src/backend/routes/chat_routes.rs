/**
 * Chat Route Handlers
 *
 * Routes for posting chats and long-polling for them.
 *
 * # Routes
 *
 * - `POST /post` - Publish a chat to its topic and to the catch-all feed
 * - `GET /subscribe` - Long-poll for new chats on one or more topics
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::chat::handlers::{handle_chat_post, handle_subscribe};
use crate::backend::server::state::AppState;

/// Configure chat-related routes
///
/// Other methods on these paths are answered with 405 by the router.
///
/// # Arguments
///
/// * `router` - The router to add routes to
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/post", post(handle_chat_post))
        .route("/subscribe", get(handle_subscribe))
}
