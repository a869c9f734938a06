/**
 * Application State Management
 *
 * This module defines the application state shared by every handler and
 * the `FromRef` implementations for Axum state extraction.
 *
 * # Thread Safety
 *
 * - `Broker` is a cheap handle over internally synchronized topics
 * - `Arc<AppConfig>` is immutable after startup
 *
 * # Example
 *
 * ```rust
 * use axum::extract::State;
 * use microchat::backend::server::state::AppState;
 *
 * async fn handler(State(app_state): State<AppState>) {
 *     let topics = app_state.broker.topic_count();
 *     // ...
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::broker::Broker;
use crate::shared::AppConfig;

/// Application state holding the broker and the configuration
///
/// # Fields
///
/// * `broker` - The long-poll broker every post and subscription goes through
/// * `config` - Validated application configuration
#[derive(Clone)]
pub struct AppState {
    pub broker: Broker,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(broker: Broker, config: AppConfig) -> Self {
        Self {
            broker,
            config: Arc::new(config),
        }
    }
}

/// Lets handlers extract `State<Broker>` directly
impl FromRef<AppState> for Broker {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.broker.clone()
    }
}

/// Lets handlers extract `State<Arc<AppConfig>>` directly
impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
