//! The broker handle: topic registry, publish and long-poll subscribe.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use super::error::{BrokerError, BrokerResult};
use super::options::BrokerOptions;
use super::topic::{Registration, TopicState, TopicSummary};
use super::waiter::{Resolution, Waiter, WaiterSlot};
use crate::shared::event::{now_millis, Cursor, Event};

/// Outcome of a [`Broker::subscribe`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeResponse {
    /// New events, oldest first.
    Data { events: Vec<Event> },
    /// Nothing arrived before the deadline. Carries the broker time so the
    /// client can resume from it.
    Timeout { timestamp: i64 },
    /// The broker shut down while the call was pending.
    Aborted,
}

impl SubscribeResponse {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Data { .. } => "data",
            Self::Timeout { .. } => "timeout",
            Self::Aborted => "aborted",
        }
    }

    pub fn events(&self) -> &[Event] {
        match self {
            Self::Data { events } => events,
            _ => &[],
        }
    }

    pub fn into_events(self) -> Vec<Event> {
        match self {
            Self::Data { events } => events,
            _ => Vec::new(),
        }
    }
}

/// Counters reported by [`Broker::purge_expired`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    pub expired_events: usize,
    pub stale_waiters: usize,
    pub reaped_topics: usize,
}

// Hands out (timestamp, sequence) pairs. Timestamps never go backwards even
// if the wall clock does.
#[derive(Debug, Default)]
struct Clock {
    last: Mutex<(i64, u64)>,
}

impl Clock {
    fn stamp(&self) -> (i64, u64) {
        let mut last = self.last.lock();
        let timestamp = now_millis().max(last.0);
        *last = (timestamp, last.1 + 1);
        *last
    }
}

#[derive(Debug)]
struct BrokerInner {
    options: BrokerOptions,
    topics: RwLock<HashMap<String, Arc<TopicState>>>,
    clock: Clock,
    next_waiter_id: AtomicU64,
    shut_down: AtomicBool,
}

/// In-memory long-poll pub/sub broker.
///
/// Cloning is cheap and every clone refers to the same topics. Topics are
/// created on first use and reaped by [`purge_expired`](Self::purge_expired)
/// once they hold neither events nor waiters.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use microchat::broker::{Broker, BrokerOptions, SubscribeResponse};
/// use microchat::shared::event::Cursor;
///
/// # async fn demo() -> microchat::broker::BrokerResult<()> {
/// let broker = Broker::new(BrokerOptions::default())?;
/// broker.publish("news", serde_json::json!({"text": "hello"}))?;
///
/// let response = broker
///     .subscribe(&["news"], Cursor::since(0), Duration::from_secs(30))
///     .await?;
/// assert!(matches!(response, SubscribeResponse::Data { .. }));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Broker {
    inner: Arc<BrokerInner>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::with_valid_options(BrokerOptions::default())
    }
}

impl Broker {
    /// Create a broker after validating `options`.
    pub fn new(options: BrokerOptions) -> BrokerResult<Self> {
        options.validate()?;
        Ok(Self::with_valid_options(options))
    }

    fn with_valid_options(options: BrokerOptions) -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                options,
                topics: RwLock::new(HashMap::new()),
                clock: Clock::default(),
                next_waiter_id: AtomicU64::new(1),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn options(&self) -> &BrokerOptions {
        &self.inner.options
    }

    /// Publish `payload` on `topic` and wake every waiter that can use it.
    ///
    /// Never waits on subscribers. Fails only before anything was appended.
    pub fn publish(&self, topic: &str, payload: serde_json::Value) -> BrokerResult<Event> {
        self.validate_topic(topic)?;
        self.ensure_running()?;

        let mut payload = payload;
        loop {
            let state = self.topic(topic);
            match state.publish(payload, || self.inner.clock.stamp()) {
                Ok((event, woken)) => {
                    tracing::debug!(
                        "[Broker] Published {} to '{}' at {} ({} waiter(s) woken)",
                        event.id,
                        topic,
                        event.timestamp,
                        woken
                    );
                    return Ok(event);
                }
                // Reaped between lookup and lock; the next lookup creates it again.
                Err(returned) => payload = returned,
            }
        }
    }

    /// Wait for events newer than `cursor` on any of `topics`.
    ///
    /// Returns immediately when data is already buffered. Otherwise the call
    /// parks until a publish on one of the topics, the timeout, or
    /// [`shutdown`](Self::shutdown). Dropping the returned future
    /// deregisters the call from every topic.
    ///
    /// # Arguments
    /// * `topics` - One or more topic keys; duplicates are ignored
    /// * `cursor` - Resume position; only newer events are returned
    /// * `timeout` - Positive and no larger than the configured maximum
    pub async fn subscribe<S: AsRef<str>>(
        &self,
        topics: &[S],
        cursor: Cursor,
        timeout: Duration,
    ) -> BrokerResult<SubscribeResponse> {
        let keys = self.validate_topics(topics)?;
        self.validate_timeout(timeout)?;
        self.ensure_running()?;

        let events = self.collect(&keys, &cursor);
        if !events.is_empty() {
            return Ok(SubscribeResponse::Data { events });
        }

        let deadline = Instant::now()
            .checked_add(timeout)
            .ok_or_else(|| BrokerError::invalid_argument("timeout", "deadline out of range"))?;
        let (slot, mut rx) = WaiterSlot::new();
        let waiter = Waiter {
            id: self.inner.next_waiter_id.fetch_add(1, Ordering::Relaxed),
            cursor,
            deadline,
            slot,
        };
        let guard = self.park(&keys, &waiter)?;
        tracing::debug!(
            "[Broker] Waiter {} parked on {:?} since {}",
            waiter.id,
            keys,
            cursor.since
        );

        let outcome = tokio::time::timeout_at(waiter.deadline, &mut rx).await;
        let resolution = match outcome {
            Ok(Ok(resolution)) => Some(resolution),
            Ok(Err(_)) => return Err(BrokerError::internal("waiter slot dropped unresolved")),
            Err(_) if guard.slot.close() => None,
            // Resolved in the same instant the deadline fired.
            Err(_) => rx.try_recv().ok(),
        };
        drop(guard);

        match resolution {
            Some(Resolution::Data(mut events)) => {
                if keys.len() > 1 {
                    let seen: HashSet<Uuid> = events.iter().map(|event| event.id).collect();
                    events.extend(
                        self.collect(&keys, &cursor)
                            .into_iter()
                            .filter(|event| !seen.contains(&event.id)),
                    );
                    events.sort_by_key(|event| event.sequence);
                }
                Ok(SubscribeResponse::Data { events })
            }
            Some(Resolution::Aborted) => Ok(SubscribeResponse::Aborted),
            None => Ok(SubscribeResponse::Timeout {
                timestamp: now_millis(),
            }),
        }
    }

    /// Abort every pending subscribe and refuse new calls.
    pub fn shutdown(&self) -> usize {
        self.inner.shut_down.store(true, Ordering::SeqCst);
        let aborted: usize = self
            .snapshot()
            .iter()
            .map(|state| state.abort_all())
            .sum();
        tracing::info!("[Broker] Shut down, {} pending subscriber(s) aborted", aborted);
        aborted
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    /// Drop expired events and stale waiters, then reap idle topics.
    pub fn purge_expired(&self) -> PurgeStats {
        let now_ms = now_millis();
        let now = Instant::now();
        let mut stats = PurgeStats::default();

        for state in self.snapshot() {
            let (expired, stale) = state.purge(now_ms, now);
            stats.expired_events += expired;
            stats.stale_waiters += stale;
        }

        let mut topics = self.inner.topics.write();
        let before = topics.len();
        topics.retain(|_, state| !state.retire_if_idle());
        stats.reaped_topics = before - topics.len();
        drop(topics);

        if stats != PurgeStats::default() {
            tracing::info!(
                "[Broker] Purged {} event(s), {} stale waiter(s), {} idle topic(s)",
                stats.expired_events,
                stats.stale_waiters,
                stats.reaped_topics
            );
        }
        stats
    }

    /// Per-topic counts, sorted by topic key.
    pub fn topic_summaries(&self) -> Vec<TopicSummary> {
        let mut summaries: Vec<TopicSummary> =
            self.snapshot().iter().map(|state| state.summary()).collect();
        summaries.sort_by(|a, b| a.topic.cmp(&b.topic));
        summaries
    }

    pub fn topic_count(&self) -> usize {
        self.inner.topics.read().len()
    }

    /// Registrations currently parked across all topics.
    pub fn pending_waiters(&self) -> usize {
        self.snapshot()
            .iter()
            .map(|state| state.pending_waiters())
            .sum()
    }

    fn snapshot(&self) -> Vec<Arc<TopicState>> {
        self.inner.topics.read().values().cloned().collect()
    }

    fn topic(&self, key: &str) -> Arc<TopicState> {
        if let Some(state) = self.inner.topics.read().get(key) {
            return Arc::clone(state);
        }
        let mut topics = self.inner.topics.write();
        let state = topics
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(TopicState::new(key, &self.inner.options)));
        Arc::clone(state)
    }

    fn collect(&self, keys: &[String], cursor: &Cursor) -> Vec<Event> {
        let mut events = Vec::new();
        for key in keys {
            loop {
                if let Some(found) = self.topic(key).collect(cursor) {
                    events.extend(found);
                    break;
                }
            }
        }
        if keys.len() > 1 {
            events.sort_by_key(|event| event.sequence);
        }
        events
    }

    fn register(&self, key: &str, waiter: Waiter) -> BrokerResult<(Arc<TopicState>, Registration)> {
        loop {
            let state = self.topic(key);
            match state.register(waiter.clone())? {
                Registration::Retired => continue,
                registration => return Ok((state, registration)),
            }
        }
    }

    // Register `waiter` on every topic until one resolves it.
    fn park(&self, keys: &[String], waiter: &Waiter) -> BrokerResult<WaiterGuard> {
        let mut guard = WaiterGuard {
            waiter_id: waiter.id,
            slot: waiter.slot.clone(),
            topics: Vec::with_capacity(keys.len()),
        };
        for key in keys {
            let (state, registration) = self.register(key, waiter.clone())?;
            guard.topics.push(state);
            if registration == Registration::Resolved {
                break;
            }
        }
        // A shutdown that began after `ensure_running` may have swept these
        // topics before the registrations landed.
        if self.is_shut_down() {
            guard.slot.resolve(Resolution::Aborted);
        }
        Ok(guard)
    }

    fn ensure_running(&self) -> BrokerResult<()> {
        if self.is_shut_down() {
            return Err(BrokerError::internal("broker is shut down"));
        }
        Ok(())
    }

    fn validate_topic(&self, topic: &str) -> BrokerResult<()> {
        if topic.is_empty() {
            return Err(BrokerError::invalid_argument("topic", "must not be empty"));
        }
        if topic.len() > self.inner.options.max_topic_len {
            return Err(BrokerError::invalid_argument(
                "topic",
                format!(
                    "must be at most {} bytes",
                    self.inner.options.max_topic_len
                ),
            ));
        }
        Ok(())
    }

    fn validate_topics<S: AsRef<str>>(&self, topics: &[S]) -> BrokerResult<Vec<String>> {
        if topics.is_empty() {
            return Err(BrokerError::invalid_argument(
                "topics",
                "at least one topic is required",
            ));
        }
        let mut keys: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics {
            let topic = topic.as_ref();
            self.validate_topic(topic)?;
            if !keys.iter().any(|key| key == topic) {
                keys.push(topic.to_string());
            }
        }
        Ok(keys)
    }

    fn validate_timeout(&self, timeout: Duration) -> BrokerResult<()> {
        if timeout.is_zero() {
            return Err(BrokerError::invalid_argument("timeout", "must be positive"));
        }
        if timeout > self.inner.options.max_timeout {
            return Err(BrokerError::invalid_argument(
                "timeout",
                format!("must not exceed {:?}", self.inner.options.max_timeout),
            ));
        }
        Ok(())
    }
}

// Removes a subscribe call's registrations however the call ends,
// including when its future is dropped mid-wait.
struct WaiterGuard {
    waiter_id: u64,
    slot: WaiterSlot,
    topics: Vec<Arc<TopicState>>,
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        if self.slot.close() {
            tracing::debug!("[Broker] Waiter {} abandoned", self.waiter_id);
        }
        for state in &self.topics {
            state.deregister(self.waiter_id);
        }
    }
}
