//! Typed session event bus.
//!
//! Events are a closed enum dispatched over a broadcast channel; every
//! event carries its own id and synthetic events carry an explicit causal
//! parent. Handlers match on the variant, there is no name-based method
//! resolution.

use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

/// Unique identifier of one event on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Event categories a watchdog can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StateRequested,
    NavigationCompleted,
}

/// Events observed on one browser session.
#[derive(Debug, Clone)]
pub enum BrowserEvent {
    /// The agent loop sampled page state. Emitted frequently during a run.
    StateRequested { id: EventId },
    /// A navigation finished on `target_id`. Genuine events have no parent;
    /// synthetic ones point at the state request that caused them.
    NavigationCompleted {
        id: EventId,
        parent: Option<EventId>,
        target_id: String,
        url: String,
    },
}

impl BrowserEvent {
    pub fn state_requested() -> Self {
        Self::StateRequested { id: EventId::new() }
    }

    pub fn id(&self) -> EventId {
        match self {
            Self::StateRequested { id } => *id,
            Self::NavigationCompleted { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::StateRequested { .. } => EventKind::StateRequested,
            Self::NavigationCompleted { .. } => EventKind::NavigationCompleted,
        }
    }

    pub fn parent(&self) -> Option<EventId> {
        match self {
            Self::StateRequested { .. } => None,
            Self::NavigationCompleted { parent, .. } => *parent,
        }
    }
}

/// In-process broadcast bus for one session's events.
///
/// Publishing is best-effort: a bus with no live subscribers drops the
/// event, which is a normal condition during setup and teardown.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BrowserEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: BrowserEvent) {
        if self.sender.send(event).is_err() {
            trace!("event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BrowserEvent> {
        self.sender.subscribe()
    }
}
