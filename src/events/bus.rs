//! # Event bus for broadcasting supervisor events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]: the supervisor publishes,
//! a single listener fans events out to the [`SubscriberSet`](crate::SubscriberSet), and
//! tests may subscribe directly to observe the exact transition order.
//!
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet ──► LogWriter, ...
//!                                    └───► test receiver
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits on receivers.
//! - **Bounded capacity**: receivers that fall behind see `RecvError::Lagged(n)`.
//! - **No persistence**: events sent while nobody listens are lost.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for supervisor events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_in_order() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::VersionCheckStarted));
        bus.publish(Event::new(EventKind::UpToDate));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::VersionCheckStarted);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::UpToDate);
    }

    #[test]
    fn publish_without_receivers_is_fine() {
        Bus::new(0).publish(Event::new(EventKind::Sleeping));
    }
}
