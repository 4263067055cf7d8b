//! Host event channel
//!
//! Hosting applications push platform events (scheduled notification
//! fired, app foregrounded) into the SDK through a bounded channel; the
//! embedding layer drains them and drives the coordinator, e.g. a
//! scheduled prompt starts a flow with `InitiatedBy::Scheduled`.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

/// Events originating from the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A scheduled check-in notification fired
    ScheduledPromptFired { at: DateTime<Utc> },
    /// The app returned to the foreground
    AppForegrounded,
    /// The host replaced the session catalog
    CatalogRefreshed,
}

const EVENT_BUFFER: usize = 32;

/// Sender half handed to the host; cheap to clone.
#[derive(Clone)]
pub struct HostEventSender {
    tx: mpsc::Sender<HostEvent>,
}

impl HostEventSender {
    /// Push an event without blocking. Events are dropped when the
    /// buffer is full or the SDK side is gone; host events are hints,
    /// never state the SDK depends on.
    pub fn send(&self, event: HostEvent) {
        if let Err(err) = self.tx.try_send(event) {
            warn!("dropping host event: {}", err);
        }
    }
}

/// Create the host event channel. The receiver is consumed by the
/// embedding layer's event loop.
pub fn host_event_channel() -> (HostEventSender, mpsc::Receiver<HostEvent>) {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    (HostEventSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sender, mut rx) = host_event_channel();
        let at = Utc::now();
        sender.send(HostEvent::ScheduledPromptFired { at });
        sender.send(HostEvent::AppForegrounded);

        assert_eq!(rx.recv().await, Some(HostEvent::ScheduledPromptFired { at }));
        assert_eq!(rx.recv().await, Some(HostEvent::AppForegrounded));
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped_does_not_panic() {
        let (sender, rx) = host_event_channel();
        drop(rx);
        sender.send(HostEvent::CatalogRefreshed);
    }
}
