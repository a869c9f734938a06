//! Microchat - Main Library
//!
//! Microchat is a small topic-based chat service built on an in-memory
//! long-poll publish/subscribe broker.
//!
//! # Module Structure
//!
//! - **`broker`** - The long-poll broker
//!   - Per-topic bounded event buffers with optional retention
//!   - Publish with waiter fan-out, subscribe with timeout
//!   - Maintenance: expiry, idle topic reaping, shutdown
//!
//! - **`shared`** - Types shared between the broker and the server
//!   - Event envelope and cursor
//!   - Chat post validation
//!   - Configuration and error types
//!
//! - **`backend`** - HTTP server (only compiled with `ssr` feature)
//!   - Axum routes for posting, long-polling, settings and topic lists
//!   - Static asset serving
//!   - Periodic broker maintenance
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the Axum backend and the `microchat-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use microchat::backend::server::init::create_app;
//! use microchat::shared::AppConfig;
//!
//! # async fn example() {
//! let (app, _state) = create_app(AppConfig::default()).expect("valid config");
//! // Serve `app` with axum::serve
//! # }
//! ```
//!
//! # Thread Safety
//!
//! [`broker::Broker`] is `Clone + Send + Sync`; every clone shares the same
//! topics. The server keeps one in its application state.

/// Long-poll publish/subscribe broker
pub mod broker;

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
