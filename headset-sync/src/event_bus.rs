/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Broadcast channel carrying [`SyncEvent`]s out of a coordinator.
//!
//! Each coordinator owns its own bus. Subscribers get every event emitted after
//! they subscribed.
//!
//! ```ignore
//! let mut rx = coordinator.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = rx.recv().await {
//!         if let SyncEvent::SuspendIssued { wait, .. } = event {
//!             println!("suspend issued, {wait}");
//!         }
//!     }
//! });
//! ```

use crate::events::SyncEvent;
use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender, TrySendError};
use log::trace;
use std::fmt;

/// Receiving end handed out by [`EventBus::subscribe`].
pub type EventReceiver = Receiver<SyncEvent>;

pub struct EventBus {
    sender: Sender<SyncEvent>,
    // Keeps the channel open while nobody is subscribed.
    _keepalive: InactiveReceiver<SyncEvent>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (mut sender, receiver) = broadcast(capacity.max(1));
        // Drop the oldest message instead of refusing new ones.
        sender.set_overflow(true);
        Self {
            sender,
            _keepalive: receiver.deactivate(),
        }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.new_receiver()
    }

    /// Emit an event to all active subscribers. Never blocks.
    pub fn emit(&self, event: SyncEvent) {
        match self.sender.try_broadcast(event) {
            Ok(_) | Err(TrySendError::Inactive(_)) => {}
            Err(e) => trace!("sync event dropped: {e}"),
        }
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
