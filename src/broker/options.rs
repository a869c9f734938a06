//! Broker configuration.

use std::time::Duration;

use super::error::{BrokerError, BrokerResult};

const DEFAULT_MAX_BUFFER_SIZE: usize = 250;
const DEFAULT_MAX_TIMEOUT: Duration = Duration::from_secs(110);
const DEFAULT_MAX_WAITERS_PER_TOPIC: usize = 10_000;
const DEFAULT_MAX_TOPIC_LEN: usize = 1024;

/// Upper bound for [`BrokerOptions::max_timeout`].
pub const MAX_TIMEOUT_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings supplied by the application when creating a [`Broker`](super::Broker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerOptions {
    /// Events retained per topic; the oldest are dropped first.
    pub max_buffer_size: usize,
    /// Maximum event age. `None` keeps events until evicted by size.
    pub event_ttl: Option<Duration>,
    /// Largest timeout a subscribe call may request.
    pub max_timeout: Duration,
    /// Queue semantics: events are removed once delivered.
    pub delete_after_first_read: bool,
    /// Pending waiters allowed on a single topic.
    pub max_waiters_per_topic: usize,
    /// Longest accepted topic key, in bytes.
    pub max_topic_len: usize,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            event_ttl: None,
            max_timeout: DEFAULT_MAX_TIMEOUT,
            delete_after_first_read: false,
            max_waiters_per_topic: DEFAULT_MAX_WAITERS_PER_TOPIC,
            max_topic_len: DEFAULT_MAX_TOPIC_LEN,
        }
    }
}

impl BrokerOptions {
    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    pub fn with_event_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.event_ttl = ttl;
        self
    }

    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.max_timeout = timeout;
        self
    }

    pub fn with_delete_after_first_read(mut self, delete: bool) -> Self {
        self.delete_after_first_read = delete;
        self
    }

    pub fn with_max_waiters_per_topic(mut self, max: usize) -> Self {
        self.max_waiters_per_topic = max;
        self
    }

    pub fn validate(&self) -> BrokerResult<()> {
        if self.max_buffer_size == 0 {
            return Err(BrokerError::invalid_argument(
                "max_buffer_size",
                "must be at least 1",
            ));
        }
        if self.max_timeout.is_zero() {
            return Err(BrokerError::invalid_argument(
                "max_timeout",
                "must be positive",
            ));
        }
        if self.max_timeout > MAX_TIMEOUT_LIMIT {
            return Err(BrokerError::invalid_argument(
                "max_timeout",
                format!("must not exceed {:?}", MAX_TIMEOUT_LIMIT),
            ));
        }
        if matches!(self.event_ttl, Some(ttl) if ttl.is_zero()) {
            return Err(BrokerError::invalid_argument(
                "event_ttl",
                "must be positive when set",
            ));
        }
        if self.max_waiters_per_topic == 0 {
            return Err(BrokerError::invalid_argument(
                "max_waiters_per_topic",
                "must be at least 1",
            ));
        }
        if self.max_topic_len == 0 {
            return Err(BrokerError::invalid_argument(
                "max_topic_len",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
