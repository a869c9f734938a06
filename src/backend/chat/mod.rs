//! Chat Backend Module
//!
//! Server-side chat functionality. Chats are not stored anywhere but in the
//! broker: posting publishes, reading long-polls.
//!
//! # Architecture
//!
//! - **`handlers`** - Axum handlers for posting, long-polling, topic boards
//!   and client settings
//!
//! # Example
//!
//! ```rust,no_run
//! use microchat::broker::Broker;
//! use microchat::shared::ChatPost;
//!
//! let broker = Broker::default();
//! let post = ChatPost::from_form("rust", "ferris", "hello").unwrap();
//! broker.publish(&post.topic, post.to_payload().unwrap()).unwrap();
//! ```

/// Chat HTTP handlers
pub mod handlers;

pub use handlers::{handle_chat_post, handle_settings, handle_subscribe, handle_topics};
