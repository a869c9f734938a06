/**
 * Server Initialization
 *
 * This module creates the broker from the application configuration,
 * builds the router and starts the periodic maintenance task.
 *
 * # Initialization Process
 *
 * 1. Validate the configuration
 * 2. Create the broker from the derived broker options
 * 3. Build the application state and the router
 * 4. Spawn the reaper that purges expired chats and idle topics
 */

use std::time::Duration;

use axum::Router;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::broker::Broker;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// Returns the router together with the state so the caller can shut the
/// broker down when the server stops.
///
/// Must be called from within a Tokio runtime: the maintenance task is
/// spawned here.
///
/// # Errors
///
/// Fails if the configuration does not validate or the derived broker
/// options are rejected.
pub fn create_app(config: AppConfig) -> Result<(Router<()>, AppState), BackendError> {
    tracing::info!("[Server] Initializing microchat backend");

    config.validate()?;
    let broker = Broker::new(config.broker_options())?;
    tracing::info!(
        "[Server] Broker ready (buffer {} per topic, chats kept {}h, max timeout {}s)",
        broker.options().max_buffer_size,
        config.max_chat_life_hours,
        config.max_timeout_seconds
    );

    let reaper_interval = Duration::from_secs(config.reaper_interval_seconds);
    let app_state = AppState::new(broker, config);
    let app = create_router(app_state.clone());

    spawn_reaper(app_state.broker.clone(), reaper_interval);
    tracing::info!("[Server] Router configured with periodic purge task");

    Ok((app, app_state))
}

/// Periodically purge expired chats and reap idle topics
///
/// Stops on its own once the broker has been shut down.
pub fn spawn_reaper(broker: Broker, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            if broker.is_shut_down() {
                tracing::debug!("[Server] Broker shut down, stopping purge task");
                break;
            }
            let stats = broker.purge_expired();
            tracing::debug!(
                "[Server] Purge pass: {} topic(s) live, {} reaped",
                broker.topic_count(),
                stats.reaped_topics
            );
        }
    })
}
