//! Backend Module
//!
//! Server-side code for the microchat application: an Axum HTTP server in
//! front of the long-poll broker.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Application state and app creation
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`chat`** - Handlers for posting, long-polling and topic boards
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - microchat-server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── chat/           - Chat handlers
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds a `Broker` handle and the validated `AppConfig`. The
//! broker synchronizes its topics internally, so handlers never take locks
//! themselves.
//!
//! # Example
//!
//! ```rust,no_run
//! use microchat::backend::create_app;
//! use microchat::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (app, state) = create_app(AppConfig::default())?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! state.broker.shutdown();
//! # Ok(())
//! # }
//! ```

/// Server setup and state
pub mod server;

/// Route configuration
pub mod routes;

/// Chat handlers
pub mod chat;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use server::{create_app, AppState};
