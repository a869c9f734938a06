/**
 * Chat Post Data Structure
 *
 * This module defines the ChatPost struct published through the broker for
 * every accepted chat message, together with the input rules applied to
 * raw form values before publishing.
 *
 * # Input Rules
 *
 * - Topics are normalized: every run of characters outside `[A-Za-z0-9]`
 *   becomes a single `-`, and leading/trailing dashes are trimmed
 * - Topic, display name and message must not be blank
 * - Values are truncated by characters (not bytes) to fixed maximums
 */
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Maximum topic length in characters
pub const MAX_TOPIC_CHARS: usize = 48;

/// Maximum display name length in characters
pub const MAX_DISPLAY_NAME_CHARS: usize = 28;

/// Maximum message length in characters
pub const MAX_MESSAGE_CHARS: usize = 512;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^A-Za-z0-9]+").expect("topic pattern is valid"));

/// A single chat post as seen by subscribers
///
/// # Fields
/// * `display_name` - Name chosen by the poster
/// * `message` - Message text
/// * `topic` - Normalized topic key
///
/// # Example
/// ```rust
/// use microchat::shared::ChatPost;
///
/// let post = ChatPost::from_form("Rust Lang!", "Alice", "Hello").unwrap();
/// assert_eq!(post.topic, "Rust-Lang");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatPost {
    /// The poster's display name
    pub display_name: String,
    /// The message content
    pub message: String,
    /// The topic the message was posted under
    pub topic: String,
}

impl ChatPost {
    /// Build a post from raw form values
    ///
    /// The topic is normalized before the blank check, so a topic made only
    /// of punctuation is rejected.
    ///
    /// # Errors
    ///
    /// Returns `SharedError::ValidationError` naming the first blank field.
    pub fn from_form(topic: &str, display_name: &str, message: &str) -> Result<Self, SharedError> {
        let topic = normalize_topic(topic);
        if topic.trim().is_empty() {
            return Err(SharedError::validation(
                "topic",
                "Blank or invalid topic (must be A-Za-z0-9)",
            ));
        }
        if display_name.trim().is_empty() {
            return Err(SharedError::validation("display_name", "Display name cannot be blank"));
        }
        if message.trim().is_empty() {
            return Err(SharedError::validation("message", "Message cannot be blank"));
        }

        Ok(Self {
            display_name: truncate_chars(display_name, MAX_DISPLAY_NAME_CHARS),
            message: truncate_chars(message, MAX_MESSAGE_CHARS),
            topic: truncate_chars(&topic, MAX_TOPIC_CHARS)
                .trim_end_matches('-')
                .to_string(),
        })
    }

    /// Convert the post into a broker payload
    pub fn to_payload(&self) -> Result<serde_json::Value, SharedError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Replace every run of non-alphanumeric characters with `-` and trim dashes
pub fn normalize_topic(topic: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(topic, "-")
        .trim_matches('-')
        .to_string()
}

/// Keep at most `max_chars` characters of `input`
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => input[..byte_index].to_string(),
        None => input.to_string(),
    }
}
