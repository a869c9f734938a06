/**
 * Chat Post Handler
 *
 * This module implements `POST /post`, the form endpoint chat clients use
 * to send a message.
 *
 * # Flow
 *
 * 1. Normalize the topic and validate every field
 * 2. Publish the post to its topic
 * 3. Publish it again to the catch-all feed shown on the home page
 * 4. Answer `ok` to AJAX clients, redirect plain form posts back to the topic
 */

use axum::{
    extract::{rejection::FormRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::backend::chat::handlers::{log_request, ClientAddr};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::config::ALL_CHATS;
use crate::shared::ChatPost;

/// Form fields accepted by `POST /post`
///
/// Missing fields decode as empty strings and are rejected by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub topic: String,
    pub display_name: String,
    pub message: String,
    /// `"yes"` for AJAX posts that want a plain `ok` body
    #[serde(rename = "doAjax")]
    pub do_ajax: Option<String>,
}

/// Handle a chat post (POST /post)
///
/// # Errors
///
/// * `400 Bad Request` - Unreadable form body, or blank topic, display name or message
/// * `500 Internal Server Error` - The broker refused the publish
///
/// # Example Request
///
/// ```http
/// POST /post HTTP/1.1
/// Content-Type: application/x-www-form-urlencoded
///
/// topic=rust&display_name=ferris&message=hello&doAjax=yes
/// ```
pub async fn handle_chat_post(
    State(app_state): State<AppState>,
    client: ClientAddr,
    headers: HeaderMap,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Response, BackendError> {
    let Form(form) = form.map_err(|rejection| BackendError::bad_request(rejection.body_text()))?;
    log_request("POST", "/post", &form.topic, &form.display_name, client, &headers);

    let post = ChatPost::from_form(&form.topic, &form.display_name, &form.message)?;
    let payload = post.to_payload()?;

    let event = app_state.broker.publish(&post.topic, payload.clone())?;
    app_state.broker.publish(ALL_CHATS, payload)?;
    tracing::info!(
        "[Server] {} posted to '{}' ({})",
        post.display_name,
        post.topic,
        event.id
    );

    if form.do_ajax.as_deref() == Some("yes") {
        return Ok((StatusCode::OK, "ok").into_response());
    }

    let query = serde_urlencoded::to_string([
        ("topic", post.topic.as_str()),
        ("display_name", post.display_name.as_str()),
    ])
    .map_err(|e| BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Redirect::to(&format!("/?{}", query)).into_response())
}
