//! Backend Error Module
//!
//! Error types returned by HTTP handlers and their conversion to responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Error Types
//!
//! - `HandlerError` - Bad request input, with an explicit status
//! - `Unavailable` - Long-poll aborted by shutdown
//! - `SharedError` - Chat post validation failures
//! - `Broker` - Errors reported by the broker
//! - `SerializationError` - JSON serialization errors

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
