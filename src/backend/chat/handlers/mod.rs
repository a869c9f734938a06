//! Chat Handlers Module
//!
//! Axum handlers for the chat endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs          - Module exports and request logging
//! ├── post.rs         - POST /post
//! ├── subscription.rs - GET /subscribe (long-poll)
//! ├── topics.rs       - GET /topics
//! └── settings.rs     - GET /settings
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{routing::get, routing::post, Router};
//! use microchat::backend::chat::handlers::{handle_chat_post, handle_subscribe};
//! use microchat::backend::server::AppState;
//!
//! let router: Router<AppState> = Router::new()
//!     .route("/post", post(handle_chat_post))
//!     .route("/subscribe", get(handle_subscribe));
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

/// Chat post handler
pub mod post;

/// Long-poll subscription handler
pub mod subscription;

/// Topic board handler
pub mod topics;

/// Client settings handler
pub mod settings;

pub use post::handle_chat_post;
pub use settings::handle_settings;
pub use subscription::handle_subscribe;
pub use topics::handle_topics;

/// Peer address of the connection, when the server was started with
/// connect info (`into_make_service_with_connect_info`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientAddr(addr))
    }
}

/// Log one chat request the way the access log expects it
pub(crate) fn log_request(
    method: &str,
    path: &str,
    topic: &str,
    display_name: &str,
    client: ClientAddr,
    headers: &HeaderMap,
) {
    let src_ip = client
        .0
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default();
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    tracing::info!(
        "[Server] HTTP {} {} topic: {}, display_name: {}, src_ip: {}, x_forwarded_for: {}",
        method,
        path,
        topic,
        display_name,
        src_ip,
        forwarded_for
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_client_addr_from_connect_info() {
        let addr: SocketAddr = "203.0.113.7:51000".parse().unwrap();
        let (mut parts, _) = Request::builder()
            .extension(ConnectInfo(addr))
            .body(())
            .unwrap()
            .into_parts();

        let client = ClientAddr::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client, ClientAddr(Some(addr)));
    }

    #[tokio::test]
    async fn test_client_addr_without_connect_info() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let client = ClientAddr::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client, ClientAddr(None));
    }
}
