/**
 * Long-Poll Subscription Handler
 *
 * This module implements `GET /subscribe`, the long-poll endpoint.
 *
 * # Query Parameters
 *
 * - `category` - Topic to follow; several may be given comma-separated
 * - `timeout` - Seconds to wait for new events
 * - `since_time` - Millisecond cursor; omitted means "from now on"
 * - `last_id` - Id of the last event seen, to resume within one millisecond
 *
 * # Responses
 *
 * ```json
 * {"events": [{"timestamp": 1700000000000, "category": "rust", "data": {...}, "id": "..."}]}
 * {"timeout": "no events before timeout", "timestamp": 1700000050000}
 * ```
 *
 * A client that disconnects mid-wait drops the handler future, which
 * removes its registrations from the broker.
 */

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::chat::handlers::{log_request, ClientAddr};
use crate::backend::error::BackendError;
use crate::broker::{Broker, SubscribeResponse};
use crate::shared::Cursor;

/// Message returned when the wait ends without events
pub const TIMEOUT_MESSAGE: &str = "no events before timeout";

/// Raw query parameters of `GET /subscribe`
///
/// Kept as strings so malformed values produce a JSON 400 rather than an
/// extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeParams {
    pub category: Option<String>,
    pub timeout: Option<String>,
    pub since_time: Option<String>,
    pub last_id: Option<String>,
}

/// A validated subscription request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub topics: Vec<String>,
    pub timeout: Duration,
    pub cursor: Cursor,
}

impl SubscribeParams {
    /// Validate the raw parameters
    ///
    /// Range checks on the timeout are left to the broker.
    pub fn parse(&self) -> Result<SubscribeRequest, BackendError> {
        let topics: Vec<String> = self
            .category
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .map(str::to_string)
            .collect();
        if topics.is_empty() {
            return Err(BackendError::bad_request(
                "Invalid subscription category, must be non-empty",
            ));
        }

        let timeout = match self.timeout.as_deref() {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                BackendError::bad_request("Invalid timeout arg, must be a whole number of seconds")
            })?,
            None => return Err(BackendError::bad_request("Missing timeout arg")),
        };

        let mut cursor = match self.since_time.as_deref() {
            Some(raw) => Cursor::since(raw.trim().parse::<i64>().map_err(|_| {
                BackendError::bad_request("Invalid since_time arg, must be milliseconds since epoch")
            })?),
            None => Cursor::now(),
        };
        if let Some(raw) = self.last_id.as_deref() {
            let last_id = Uuid::parse_str(raw.trim())
                .map_err(|_| BackendError::bad_request("Invalid last_id arg, must be a UUID"))?;
            cursor = cursor.with_last_id(last_id);
        }

        Ok(SubscribeRequest {
            topics,
            timeout: Duration::from_secs(timeout),
            cursor,
        })
    }
}

/// Handle a long-poll request (GET /subscribe)
///
/// # Errors
///
/// * `400 Bad Request` - Missing or malformed parameters, timeout out of range
/// * `503 Service Unavailable` - The server shut down while the request waited
pub async fn handle_subscribe(
    State(broker): State<Broker>,
    client: ClientAddr,
    headers: HeaderMap,
    Query(params): Query<SubscribeParams>,
) -> Result<Json<serde_json::Value>, BackendError> {
    log_request(
        "GET",
        "/subscribe",
        params.category.as_deref().unwrap_or_default(),
        "",
        client,
        &headers,
    );

    let request = params.parse()?;
    let response = broker
        .subscribe(request.topics.as_slice(), request.cursor, request.timeout)
        .await?;

    match response {
        SubscribeResponse::Data { events } => {
            tracing::debug!(
                "[Server] Returning {} event(s) for {:?}",
                events.len(),
                request.topics
            );
            Ok(Json(serde_json::json!({ "events": events })))
        }
        SubscribeResponse::Timeout { timestamp } => Ok(Json(serde_json::json!({
            "timeout": TIMEOUT_MESSAGE,
            "timestamp": timestamp,
        }))),
        SubscribeResponse::Aborted => Err(BackendError::unavailable("server is shutting down")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn params(category: Option<&str>, timeout: Option<&str>) -> SubscribeParams {
        SubscribeParams {
            category: category.map(str::to_string),
            timeout: timeout.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_multiple_categories() {
        let request = params(Some("rust, go,,all_chats"), Some("30")).parse().unwrap();
        assert_eq!(request.topics, vec!["rust", "go", "all_chats"]);
        assert_eq!(request.timeout, Duration::from_secs(30));
        assert!(request.cursor.last_id.is_none());
    }

    #[test]
    fn test_parse_requires_category_and_timeout() {
        let err = params(None, Some("30")).parse().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = params(Some(" , "), Some("30")).parse().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = params(Some("rust"), None).parse().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = params(Some("rust"), Some("-5")).parse().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_cursor() {
        let id = Uuid::new_v4();
        let mut raw = params(Some("rust"), Some("10"));
        raw.since_time = Some("1234".to_string());
        raw.last_id = Some(id.to_string());

        let request = raw.parse().unwrap();
        assert_eq!(request.cursor, Cursor::since(1234).with_last_id(id));

        raw.last_id = Some("not-a-uuid".to_string());
        assert!(raw.parse().is_err());

        raw.last_id = None;
        raw.since_time = Some("yesterday".to_string());
        assert!(raw.parse().is_err());
    }
}
