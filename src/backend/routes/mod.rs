//! Route Configuration Module
//!
//! Configures every HTTP route of the chat server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── chat_routes.rs  - Posting and long-polling
//! └── api_routes.rs   - Settings and topic boards
//! ```
//!
//! # Route Types
//!
//! ## Chat Routes
//!
//! - `POST /post` - Publish a chat
//! - `GET /subscribe` - Long-poll for chats
//!
//! ## API Routes
//!
//! - `GET /settings` - Client settings
//! - `GET /topics` - Topic boards
//!
//! Everything else falls through to static files or 404.

/// Main router creation
pub mod router;

/// Chat-related route handlers
pub mod chat_routes;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
