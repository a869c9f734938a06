//! Long-Poll Broker
//!
//! An in-memory publish/subscribe broker for HTTP long-polling. Publishers
//! append events to named topics; subscribers ask for everything newer than
//! a cursor and, when nothing is buffered yet, park until a publish, a
//! timeout, or broker shutdown.
//!
//! # Overview
//!
//! - [`Broker`] - cheaply clonable handle owning every topic
//! - [`TopicBuffer`] - bounded, optionally time-limited event log per topic
//! - [`BrokerOptions`] - buffer size, retention, timeouts and limits
//! - [`SubscribeResponse`] - `data`, `timeout` or `aborted`
//!
//! # Concurrency
//!
//! Each topic has its own mutex guarding its buffer and its pending waiters.
//! The topic map sits behind a read-write lock that is only written when a
//! topic is created or reaped. Publishing never awaits: waking a subscriber
//! is a non-blocking `oneshot` send.

pub mod buffer;
pub mod error;
pub mod options;
mod registry;
mod topic;
mod waiter;

pub use buffer::TopicBuffer;
pub use error::{BrokerError, BrokerResult};
pub use options::BrokerOptions;
pub use registry::{Broker, PurgeStats, SubscribeResponse};
pub use topic::TopicSummary;
