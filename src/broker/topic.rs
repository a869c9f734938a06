//! Per-topic state: the event buffer plus the waiters pending on it.
//!
//! Everything for one topic sits behind one mutex, so appends, waiter
//! registration and eviction are serialized per topic while different
//! topics never contend.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

use super::buffer::TopicBuffer;
use super::error::{BrokerError, BrokerResult};
use super::options::BrokerOptions;
use super::waiter::{Resolution, Waiter};
use crate::shared::event::{now_millis, Cursor, Event};

/// Snapshot of one topic for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    pub event_count: usize,
    pub latest_timestamp: Option<i64>,
    pub pending_waiters: usize,
}

/// Outcome of registering a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Registration {
    /// Parked until a publish, timeout or abort.
    Waiting,
    /// Data was already available; the waiter's slot has been resolved.
    Resolved,
    /// The topic was reaped concurrently; look it up again.
    Retired,
}

#[derive(Debug)]
struct TopicInner {
    buffer: TopicBuffer,
    waiters: HashMap<u64, Waiter>,
    retired: bool,
}

#[derive(Debug)]
pub(crate) struct TopicState {
    key: String,
    delete_after_first_read: bool,
    max_waiters: usize,
    inner: Mutex<TopicInner>,
}

impl TopicState {
    pub(crate) fn new(key: &str, options: &BrokerOptions) -> Self {
        Self {
            key: key.to_string(),
            delete_after_first_read: options.delete_after_first_read,
            max_waiters: options.max_waiters_per_topic,
            inner: Mutex::new(TopicInner {
                buffer: TopicBuffer::new(options.max_buffer_size, options.event_ttl),
                waiters: HashMap::new(),
                retired: false,
            }),
        }
    }

    /// Stamp, append and fan out one event.
    ///
    /// The stamp is taken under the topic lock so buffer order always
    /// matches timestamp order. Hands the payload back if the topic was
    /// retired.
    pub(crate) fn publish(
        &self,
        payload: serde_json::Value,
        stamp: impl FnOnce() -> (i64, u64),
    ) -> Result<(Event, usize), serde_json::Value> {
        let mut inner = self.inner.lock();
        if inner.retired {
            return Err(payload);
        }
        let (timestamp, sequence) = stamp();
        let event = Event::new(self.key.as_str(), payload, timestamp, sequence);
        inner.buffer.append(event.clone());
        let woken = self.wake_waiters(&mut inner);
        Ok((event, woken))
    }

    /// Events newer than `cursor`; consumed in queue mode. `None` if retired.
    pub(crate) fn collect(&self, cursor: &Cursor) -> Option<Vec<Event>> {
        let mut inner = self.inner.lock();
        if inner.retired {
            return None;
        }
        if self.delete_after_first_read {
            Some(inner.buffer.take(cursor))
        } else {
            Some(inner.buffer.query(cursor))
        }
    }

    pub(crate) fn register(&self, waiter: Waiter) -> BrokerResult<Registration> {
        let mut inner = self.inner.lock();
        if inner.retired {
            return Ok(Registration::Retired);
        }

        // Data may have landed between the caller's first look and now.
        let events = inner.buffer.query(&waiter.cursor);
        if !events.is_empty() {
            let ids: HashSet<Uuid> = events.iter().map(|event| event.id).collect();
            if waiter.slot.resolve(Resolution::Data(events)) && self.delete_after_first_read {
                inner.buffer.remove_ids(&ids);
            }
            return Ok(Registration::Resolved);
        }

        if inner.waiters.len() >= self.max_waiters {
            let now = Instant::now();
            inner.waiters.retain(|_, pending| !pending.is_stale(now));
            if inner.waiters.len() >= self.max_waiters {
                tracing::warn!(
                    "[Broker] Rejecting subscriber on '{}': {} waiters pending",
                    self.key,
                    inner.waiters.len()
                );
                return Err(BrokerError::internal(format!(
                    "too many pending subscribers on topic '{}'",
                    self.key
                )));
            }
        }

        inner.waiters.insert(waiter.id, waiter);
        Ok(Registration::Waiting)
    }

    pub(crate) fn deregister(&self, waiter_id: u64) {
        self.inner.lock().waiters.remove(&waiter_id);
    }

    /// Resolve every pending waiter as aborted.
    pub(crate) fn abort_all(&self) -> usize {
        let waiters = std::mem::take(&mut self.inner.lock().waiters);
        waiters
            .into_values()
            .filter(|waiter| waiter.slot.resolve(Resolution::Aborted))
            .count()
    }

    /// Drop expired events and stale registrations.
    pub(crate) fn purge(&self, now_ms: i64, now: Instant) -> (usize, usize) {
        let mut inner = self.inner.lock();
        let expired = inner.buffer.purge_expired(now_ms);
        let before = inner.waiters.len();
        inner.waiters.retain(|_, waiter| !waiter.is_stale(now));
        (expired, before - inner.waiters.len())
    }

    /// Mark the topic retired if it holds nothing. Returns whether it was.
    pub(crate) fn retire_if_idle(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.buffer.is_empty() && inner.waiters.is_empty() {
            inner.retired = true;
        }
        inner.retired
    }

    pub(crate) fn summary(&self) -> TopicSummary {
        let mut inner = self.inner.lock();
        inner.buffer.purge_expired(now_millis());
        TopicSummary {
            topic: self.key.clone(),
            event_count: inner.buffer.len(),
            latest_timestamp: inner.buffer.latest_timestamp(),
            pending_waiters: inner.waiters.len(),
        }
    }

    pub(crate) fn pending_waiters(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    // Resolve every waiter that now has data. Waiters whose cursor is
    // still ahead of the buffer stay parked.
    fn wake_waiters(&self, inner: &mut TopicInner) -> usize {
        if inner.waiters.is_empty() {
            return 0;
        }

        let now = now_millis();
        let mut delivered = HashSet::new();
        let mut woken = 0;
        for (id, waiter) in std::mem::take(&mut inner.waiters) {
            if waiter.slot.is_resolved() {
                continue;
            }
            let events = inner.buffer.query_at(&waiter.cursor, now);
            if events.is_empty() {
                inner.waiters.insert(id, waiter);
                continue;
            }
            let ids: Vec<Uuid> = events.iter().map(|event| event.id).collect();
            if waiter.slot.resolve(Resolution::Data(events)) {
                woken += 1;
                if self.delete_after_first_read {
                    delivered.extend(ids);
                }
            }
        }

        if !delivered.is_empty() {
            inner.buffer.remove_ids(&delivered);
        }
        woken
    }
}
