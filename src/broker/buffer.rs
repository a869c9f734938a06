//! Bounded, time-bounded event log for a single topic.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use uuid::Uuid;

use crate::shared::event::{now_millis, Cursor, Event};

/// Ordered log of the most recent events published to one topic.
///
/// Events are kept oldest first and sorted by timestamp. Appending past
/// `max_size` drops from the head. Expired events are purged from the head
/// on append and skipped by reads.
#[derive(Debug)]
pub struct TopicBuffer {
    events: VecDeque<Event>,
    max_size: usize,
    ttl_millis: Option<i64>,
}

impl TopicBuffer {
    pub fn new(max_size: usize, ttl: Option<Duration>) -> Self {
        Self {
            events: VecDeque::new(),
            max_size: max_size.max(1),
            ttl_millis: ttl.map(|ttl| i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)),
        }
    }

    /// Append at the tail, evicting from the head when over capacity.
    pub fn append(&mut self, event: Event) {
        debug_assert!(
            self.events
                .back()
                .map_or(true, |last| last.timestamp <= event.timestamp),
            "events must be appended in timestamp order"
        );
        self.events.push_back(event);

        let overflow = self.events.len().saturating_sub(self.max_size);
        if overflow > 0 {
            self.events.drain(..overflow);
        }
        self.purge_expired(now_millis());
    }

    /// All live events newer than `cursor`, oldest first.
    pub fn query(&self, cursor: &Cursor) -> Vec<Event> {
        self.query_at(cursor, now_millis())
    }

    pub fn query_at(&self, cursor: &Cursor, now: i64) -> Vec<Event> {
        let start = self.start_index(cursor);
        self.events
            .range(start..)
            .filter(|event| self.is_live(event, now))
            .cloned()
            .collect()
    }

    /// Like [`query`](Self::query) but removes the returned events.
    pub fn take(&mut self, cursor: &Cursor) -> Vec<Event> {
        self.purge_expired(now_millis());
        let start = self.start_index(cursor);
        self.events.drain(start..).collect()
    }

    /// Remove the given events, keeping everything else in order.
    pub fn remove_ids(&mut self, ids: &HashSet<Uuid>) -> usize {
        let before = self.events.len();
        self.events.retain(|event| !ids.contains(&event.id));
        before - self.events.len()
    }

    /// Drop expired events from the head. Returns how many were dropped.
    pub fn purge_expired(&mut self, now: i64) -> usize {
        let Some(ttl) = self.ttl_millis else {
            return 0;
        };
        let cutoff = now.saturating_sub(ttl);
        let expired = self.events.partition_point(|event| event.timestamp < cutoff);
        self.events.drain(..expired);
        expired
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn latest_timestamp(&self) -> Option<i64> {
        self.events.back().map(|event| event.timestamp)
    }

    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.events.front().map(|event| event.timestamp)
    }

    // Index of the first event the cursor has not seen yet.
    fn start_index(&self, cursor: &Cursor) -> usize {
        if let Some(last_id) = cursor.last_id {
            let seen = self
                .events
                .iter()
                .position(|event| event.id == last_id && event.timestamp == cursor.since);
            if let Some(position) = seen {
                return position + 1;
            }
        }
        self.events
            .partition_point(|event| event.timestamp <= cursor.since)
    }

    fn is_live(&self, event: &Event, now: i64) -> bool {
        match self.ttl_millis {
            Some(ttl) => now.saturating_sub(event.timestamp) <= ttl,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(topic: &str, timestamp: i64, sequence: u64) -> Event {
        Event::new(topic, serde_json::json!(sequence), timestamp, sequence)
    }

    fn ids(events: &[Event]) -> Vec<Uuid> {
        events.iter().map(|event| event.id).collect()
    }

    #[test]
    fn test_query_returns_insertion_order() {
        let mut buffer = TopicBuffer::new(10, None);
        let published: Vec<Event> = (1..=5).map(|i| event("news", i * 10, i as u64)).collect();
        for e in &published {
            buffer.append(e.clone());
        }
        assert_eq!(buffer.query(&Cursor::since(0)), published);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut buffer = TopicBuffer::new(3, None);
        let published: Vec<Event> = (1..=4).map(|i| event("sports", i, i as u64)).collect();
        for e in &published {
            buffer.append(e.clone());
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(ids(&buffer.query(&Cursor::since(0))), ids(&published[1..]));
        assert_eq!(buffer.oldest_timestamp(), Some(2));
        assert_eq!(buffer.latest_timestamp(), Some(4));
    }

    #[test]
    fn test_query_is_strictly_newer() {
        let mut buffer = TopicBuffer::new(10, None);
        buffer.append(event("news", 100, 1));
        buffer.append(event("news", 200, 2));
        assert_eq!(buffer.query(&Cursor::since(200)), Vec::<Event>::new());
        assert_eq!(buffer.query(&Cursor::since(199)).len(), 1);
        assert_eq!(buffer.query(&Cursor::since(99)).len(), 2);
    }

    #[test]
    fn test_same_timestamp_without_last_id_skips_ties() {
        let mut buffer = TopicBuffer::new(10, None);
        let first = event("news", 500, 1);
        let second = event("news", 500, 2);
        buffer.append(first);
        buffer.append(second);
        assert!(buffer.query(&Cursor::since(500)).is_empty());
    }

    #[test]
    fn test_same_timestamp_with_last_id_returns_later_ties() {
        let mut buffer = TopicBuffer::new(10, None);
        let first = event("news", 500, 1);
        let second = event("news", 500, 2);
        let third = event("news", 501, 3);
        buffer.append(first.clone());
        buffer.append(second.clone());
        buffer.append(third.clone());

        let result = buffer.query(&Cursor::after(&first));
        assert_eq!(ids(&result), vec![second.id, third.id]);

        let result = buffer.query(&Cursor::after(&second));
        assert_eq!(ids(&result), vec![third.id]);
    }

    #[test]
    fn test_unknown_last_id_falls_back_to_timestamp() {
        let mut buffer = TopicBuffer::new(10, None);
        buffer.append(event("news", 500, 1));
        buffer.append(event("news", 600, 2));
        let cursor = Cursor::since(500).with_last_id(Uuid::new_v4());
        assert_eq!(buffer.query(&cursor).len(), 1);
    }

    #[test]
    fn test_expired_events_are_skipped() {
        let mut buffer = TopicBuffer::new(10, Some(Duration::from_millis(1000)));
        let now = now_millis();
        buffer.events.push_back(event("news", now - 5000, 1));
        buffer.events.push_back(event("news", now, 2));

        let live = buffer.query_at(&Cursor::since(0), now);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].sequence, 2);

        assert_eq!(buffer.purge_expired(now), 1);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_take_removes_returned_events() {
        let mut buffer = TopicBuffer::new(10, None);
        buffer.append(event("jobs", 1, 1));
        buffer.append(event("jobs", 2, 2));
        buffer.append(event("jobs", 3, 3));

        let taken = buffer.take(&Cursor::since(1));
        assert_eq!(taken.len(), 2);
        assert_eq!(buffer.len(), 1);
        assert!(buffer.take(&Cursor::since(1)).is_empty());
    }

    #[test]
    fn test_remove_ids() {
        let mut buffer = TopicBuffer::new(10, None);
        let a = event("jobs", 1, 1);
        let b = event("jobs", 2, 2);
        buffer.append(a.clone());
        buffer.append(b.clone());

        let removed = buffer.remove_ids(&HashSet::from([a.id]));
        assert_eq!(removed, 1);
        assert_eq!(ids(&buffer.query(&Cursor::since(0))), vec![b.id]);
    }
}
