//! Server Module
//!
//! Server-side setup: application state and app creation.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! └── init.rs         - App creation and the purge task
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `AppConfig` is validated
//! 2. **Broker**: created from the options the config derives
//! 3. **Router Creation**: every route plus the static fallback
//! 4. **Background Tasks**: periodic purge of expired chats and idle topics
//!
//! # Example
//!
//! ```rust,no_run
//! use microchat::backend::server::create_app;
//! use microchat::shared::AppConfig;
//!
//! # async fn example() {
//! let (app, state) = create_app(AppConfig::default()).expect("valid config");
//! # }
//! ```

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

pub use init::create_app;
pub use state::AppState;
