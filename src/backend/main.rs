/**
 * Microchat Server Entry Point
 *
 * Loads configuration, starts the Axum server and shuts the broker down
 * on ctrl-c so pending long-polls are answered before exit.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use microchat::shared::AppConfig;

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        "[Server] addr: {}, maxChatHrs: {}, topicRefreshSec: {}, maxTopicLists: {}, chatsOnScreen: {}",
        config.listen_addr,
        config.max_chat_life_hours,
        config.topic_refresh_seconds,
        config.max_topic_lists,
        config.chats_on_screen
    );

    let addr = config.listen_addr;
    let (app, state) = microchat::backend::create_app(config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[Server] Launching chat server on {}", addr);

    let broker = state.broker.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("[Server] Failed to listen for ctrl-c: {}", e);
                return;
            }
            tracing::info!("[Server] Shutdown requested");
            // Answers every pending long-poll so connections can drain.
            broker.shutdown();
        })
        .await?;

    tracing::info!("[Server] Stopped");
    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin microchat-server --features ssr");
    std::process::exit(1);
}
