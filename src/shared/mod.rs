//! Shared Module
//!
//! Types used by both the broker and the chat server: the event envelope,
//! the chat post payload, validation errors and application configuration.

/// Event envelope and resume cursor
pub mod event;

/// Chat post payload and input normalization
pub mod message;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::{Cursor, Event};
pub use message::ChatPost;
