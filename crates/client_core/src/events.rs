use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Emitted after every state transition of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    /// Label of the controller that changed, e.g. `"now_playing"`.
    pub source: &'static str,
    /// Per-source counter, starting at 1.
    pub revision: u64,
}

/// Fan-out handle a controller uses to announce state changes.
///
/// Clones share the channel and the revision counter. Sending with no live
/// subscribers is not an error.
#[derive(Clone)]
pub struct ChangeNotifier {
    source: &'static str,
    events: broadcast::Sender<StateChanged>,
    revision: Arc<AtomicU64>,
}

impl ChangeNotifier {
    pub fn new(source: &'static str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self::with_sender(source, events)
    }

    /// Notifier that publishes into an existing channel, so several controllers
    /// can share one subscription.
    pub fn with_sender(source: &'static str, events: broadcast::Sender<StateChanged>) -> Self {
        Self {
            source,
            events,
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn notify(&self) {
        let revision = self.revision.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = self.events.send(StateChanged {
            source: self.source,
            revision,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.events.subscribe()
    }
}
