/**
 * Event Envelope
 *
 * This module defines the unit of data that flows through the long-poll
 * broker: an immutable envelope carrying a topic, a millisecond timestamp,
 * an identity and an opaque JSON payload.
 *
 * Envelopes are serialized with the field names long-poll clients expect:
 * ```json
 * {"timestamp": 1700000000000, "category": "news", "data": {...}, "id": "..."}
 * ```
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A published event, as stored in topic buffers and returned to subscribers
///
/// Events are created by the broker at publish time and never mutated
/// afterwards. Each buffer the event is appended to holds its own clone.
///
/// # Fields
/// * `timestamp` - Milliseconds since the Unix epoch, non-decreasing per broker
/// * `topic` - The topic key the event was published under
/// * `payload` - Opaque application data
/// * `id` - Random identity, independent of the timestamp
/// * `sequence` - Broker-wide insertion counter (not serialized)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Publish time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Topic key
    #[serde(rename = "category")]
    pub topic: String,
    /// Application payload
    #[serde(rename = "data")]
    pub payload: serde_json::Value,
    /// Unique event identity
    pub id: Uuid,
    /// Order in which the broker observed the publish
    #[serde(skip)]
    pub sequence: u64,
}

impl Event {
    /// Create an event with a fresh random id
    pub fn new(
        topic: impl Into<String>,
        payload: serde_json::Value,
        timestamp: i64,
        sequence: u64,
    ) -> Self {
        Self {
            timestamp,
            topic: topic.into(),
            payload,
            id: Uuid::new_v4(),
            sequence,
        }
    }
}

/// Resume position supplied by a subscriber
///
/// Only events strictly newer than `since` are returned. When `last_id`
/// names an event that is still buffered with exactly the `since`
/// timestamp, events sharing that timestamp but inserted after it are
/// returned as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Millisecond timestamp of the last event seen
    pub since: i64,
    /// Identity of the last event seen, if known
    pub last_id: Option<Uuid>,
}

impl Cursor {
    /// Cursor that only matches events newer than `since`
    pub fn since(since: i64) -> Self {
        Self {
            since,
            last_id: None,
        }
    }

    /// Cursor positioned right after `event`
    pub fn after(event: &Event) -> Self {
        Self {
            since: event.timestamp,
            last_id: Some(event.id),
        }
    }

    /// Cursor that skips everything already published
    pub fn now() -> Self {
        Self::since(now_millis())
    }

    /// Attach the id of the last seen event
    pub fn with_last_id(mut self, last_id: Uuid) -> Self {
        self.last_id = Some(last_id);
        self
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
