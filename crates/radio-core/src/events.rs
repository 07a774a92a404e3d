use tokio::sync::broadcast;

use crate::station::Station;

/// Change notifications from a [`StationCollection`](crate::collection::StationCollection).
///
/// Station payloads are snapshots taken when the event was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    Loaded,
    StationAdded(Station),
    StationRemoved(Station),
    StationModified(Station),
    StationMoved(Station),
    /// User-visible, non-fatal failure (e.g. the list could not be saved).
    Error(String),
}

/// Subscription handle. Dropping it unsubscribes.
pub type Subscription = broadcast::Receiver<CollectionEvent>;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CollectionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> Subscription {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn emit(&self, event: CollectionEvent) {
        // ignore errors - no receivers is OK
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
