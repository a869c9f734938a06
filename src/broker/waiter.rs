//! Pending long-poll requests.
//!
//! A subscribe call that finds nothing to return registers one [`Waiter`]
//! per requested topic. All of them share a single [`WaiterSlot`], so the
//! first topic to resolve wins and the others become stale registrations
//! that are dropped on the next publish, on deregistration, or by the
//! reaper.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::shared::event::{Cursor, Event};

/// How a waiter was resolved by the broker side.
#[derive(Debug)]
pub(crate) enum Resolution {
    Data(Vec<Event>),
    Aborted,
}

/// Single-fire notification shared by every registration of one subscribe call.
#[derive(Debug, Clone)]
pub(crate) struct WaiterSlot {
    sender: Arc<Mutex<Option<oneshot::Sender<Resolution>>>>,
}

impl WaiterSlot {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Resolution>) {
        let (tx, rx) = oneshot::channel();
        let slot = Self {
            sender: Arc::new(Mutex::new(Some(tx))),
        };
        (slot, rx)
    }

    /// Resolve the slot. Returns whether the subscriber received the value:
    /// `false` if the slot was already resolved or its receiver is gone.
    ///
    /// Never blocks. Either way the slot is resolved afterwards.
    pub(crate) fn resolve(&self, resolution: Resolution) -> bool {
        match self.sender.lock().take() {
            Some(tx) => tx.send(resolution).is_ok(),
            None => false,
        }
    }

    /// Close the slot without sending anything. Returns `false` if a
    /// resolution was already sent.
    pub(crate) fn close(&self) -> bool {
        self.sender.lock().take().is_some()
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.sender.lock().is_none()
    }
}

/// One registration of a subscribe call against one topic.
#[derive(Debug, Clone)]
pub(crate) struct Waiter {
    pub(crate) id: u64,
    pub(crate) cursor: Cursor,
    pub(crate) deadline: Instant,
    pub(crate) slot: WaiterSlot,
}

impl Waiter {
    /// Stale registrations can be dropped without notifying anyone.
    pub(crate) fn is_stale(&self, now: Instant) -> bool {
        self.slot.is_resolved() || now >= self.deadline
    }
}
