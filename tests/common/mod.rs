//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Broker and server fixtures
//! - Polling helpers for pending long-polls
//! - Custom assertion macros

#![allow(dead_code)]

pub mod assertions;

use std::time::Duration;

use microchat::broker::{Broker, BrokerOptions};

/// Broker with a small buffer so eviction is easy to observe
pub fn small_broker(max_buffer_size: usize) -> Broker {
    Broker::new(BrokerOptions::default().with_max_buffer_size(max_buffer_size))
        .expect("valid broker options")
}

/// Wait until `expected` registrations are parked, or give up after ~1s
pub async fn wait_for_waiters(broker: &Broker, expected: usize) {
    for _ in 0..200 {
        if broker.pending_waiters() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "Expected {} pending waiters, found {}",
        expected,
        broker.pending_waiters()
    );
}

#[cfg(feature = "ssr")]
pub mod server {
    use axum_test::TestServer;
    use microchat::backend::{create_app, AppState};
    use microchat::shared::AppConfig;

    /// Test server over the full router plus its state
    pub fn test_server(config: AppConfig) -> (TestServer, AppState) {
        let (app, state) = create_app(config).expect("valid test config");
        let server = TestServer::new(app).expect("test server starts");
        (server, state)
    }

    pub fn default_server() -> (TestServer, AppState) {
        test_server(AppConfig::default())
    }
}
