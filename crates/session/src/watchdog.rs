//! Download detection watchdog.
//!
//! The external download detector only reacts to completed navigations, but
//! some downloads are triggered without one (an in-viewer download button,
//! for example). The broadened strategy closes that gap: every time the
//! agent samples page state, the watchdog resolves the current page and, if
//! one exists, synthesizes a navigation-completed event on the same bus the
//! detector listens on. The detector cannot tell it from a real navigation.
//!
//! The detector is assumed to tolerate duplicate triggers for the same file;
//! this is an at-least-once bridge, not an exactly-once one.

use std::sync::Arc;

use {async_trait::async_trait, tokio::sync::Mutex, tokio::task::JoinHandle, tracing::debug};

use crate::{
    events::{BrowserEvent, EventBus, EventId, EventKind},
    types::PageRef,
};

/// Resolves the page the agent currently has focus on, if any.
///
/// A `None` is a normal transient condition (no target yet, target mid
/// teardown, blank page) and never an error.
#[async_trait]
pub trait PageProbe: Send + Sync {
    async fn current_page(&self) -> Option<PageRef>;
}

/// Download-detection strategy, selected at session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchdogStrategy {
    /// Only genuine navigation events reach the download detector.
    Navigation,
    /// Additionally synthesize navigation events from page-state samples.
    #[default]
    Broadened,
}

impl WatchdogStrategy {
    /// The event kinds this strategy subscribes to.
    pub fn subscriptions(&self) -> &'static [EventKind] {
        match self {
            Self::Navigation => &[EventKind::NavigationCompleted],
            Self::Broadened => &[EventKind::NavigationCompleted, EventKind::StateRequested],
        }
    }
}

/// Session delegate watching the event bus for download triggers.
///
/// Lives exactly as long as its session; it is never owned independently.
pub struct DownloadWatchdog {
    strategy: WatchdogStrategy,
    bus: EventBus,
    probe: Arc<dyn PageProbe>,
    last_page_url: Mutex<Option<String>>,
}

impl DownloadWatchdog {
    pub fn new(strategy: WatchdogStrategy, bus: EventBus, probe: Arc<dyn PageProbe>) -> Self {
        Self {
            strategy,
            bus,
            probe,
            last_page_url: Mutex::new(None),
        }
    }

    /// Run the watchdog until the session's bus closes.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.handle(event).await,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "watchdog lagged behind the event bus");
                    },
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// React to one bus event. Must never fail: a missing page is normal
    /// and genuine navigation events pass through untouched.
    pub async fn handle(&self, event: BrowserEvent) {
        if !self.strategy.subscriptions().contains(&event.kind()) {
            return;
        }
        match event {
            BrowserEvent::StateRequested { id } => self.bridge_state_request(id).await,
            // Genuine (and previously synthesized) navigations are the
            // detector's business; nothing to do here.
            BrowserEvent::NavigationCompleted { .. } => {},
        }
    }

    /// Synthesize a navigation-completed event for the current page, if one
    /// is resolvable right now.
    async fn bridge_state_request(&self, trigger: EventId) {
        let Some(page) = self.probe.current_page().await else {
            return;
        };
        *self.last_page_url.lock().await = Some(page.url.clone());
        debug!(url = %page.url, parent = %trigger, "synthesizing navigation event");
        self.bus.publish(BrowserEvent::NavigationCompleted {
            id: EventId::new(),
            parent: Some(trigger),
            target_id: page.target_id,
            url: page.url,
        });
    }

    /// The most recent page URL the watchdog resolved, if any.
    pub async fn last_page_url(&self) -> Option<String> {
        self.last_page_url.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(Option<PageRef>);

    #[async_trait]
    impl PageProbe for FixedProbe {
        async fn current_page(&self) -> Option<PageRef> {
            self.0.clone()
        }
    }

    fn watchdog(strategy: WatchdogStrategy, page: Option<PageRef>) -> (DownloadWatchdog, EventBus) {
        let bus = EventBus::new(16);
        let dog = DownloadWatchdog::new(strategy, bus.clone(), Arc::new(FixedProbe(page)));
        (dog, bus)
    }

    #[tokio::test]
    async fn no_resolvable_page_emits_nothing() {
        let (dog, bus) = watchdog(WatchdogStrategy::Broadened, None);
        let mut rx = bus.subscribe();

        dog.handle(BrowserEvent::state_requested()).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(dog.last_page_url().await, None);
    }

    #[tokio::test]
    async fn resolvable_page_emits_exactly_one_synthetic_navigation() {
        let page = PageRef {
            target_id: "T-77".into(),
            url: "https://example.com/doc".into(),
        };
        let (dog, bus) = watchdog(WatchdogStrategy::Broadened, Some(page));
        let mut rx = bus.subscribe();

        let trigger = BrowserEvent::state_requested();
        let trigger_id = trigger.id();
        dog.handle(trigger).await;

        match rx.try_recv().unwrap() {
            BrowserEvent::NavigationCompleted {
                parent,
                target_id,
                url,
                ..
            } => {
                assert_eq!(parent, Some(trigger_id));
                assert_eq!(target_id, "T-77");
                assert_eq!(url, "https://example.com/doc");
            },
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err(), "exactly one event expected");
        assert_eq!(
            dog.last_page_url().await.as_deref(),
            Some("https://example.com/doc")
        );
    }

    #[tokio::test]
    async fn navigation_strategy_never_synthesizes() {
        let page = PageRef {
            target_id: "T-1".into(),
            url: "https://example.com".into(),
        };
        let (dog, bus) = watchdog(WatchdogStrategy::Navigation, Some(page));
        let mut rx = bus.subscribe();

        dog.handle(BrowserEvent::state_requested()).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn genuine_navigation_events_are_left_alone() {
        let page = PageRef {
            target_id: "T-1".into(),
            url: "https://example.com".into(),
        };
        let (dog, bus) = watchdog(WatchdogStrategy::Broadened, Some(page));
        let mut rx = bus.subscribe();

        dog.handle(BrowserEvent::NavigationCompleted {
            id: EventId::new(),
            parent: None,
            target_id: "T-1".into(),
            url: "https://example.com/real".into(),
        })
        .await;

        assert!(rx.try_recv().is_err(), "watchdog must not re-publish navigations");
    }

    #[tokio::test]
    async fn spawned_watchdog_bridges_bus_events() {
        let page = PageRef {
            target_id: "T-9".into(),
            url: "https://example.com/live".into(),
        };
        let (dog, bus) = watchdog(WatchdogStrategy::Broadened, Some(page));
        let task = Arc::new(dog).spawn();
        let mut rx = bus.subscribe();

        let trigger = BrowserEvent::state_requested();
        let trigger_id = trigger.id();
        bus.publish(trigger);

        // First our own trigger echoes back, then the synthetic navigation.
        loop {
            match rx.recv().await.unwrap() {
                BrowserEvent::StateRequested { .. } => continue,
                BrowserEvent::NavigationCompleted { parent, url, .. } => {
                    assert_eq!(parent, Some(trigger_id));
                    assert_eq!(url, "https://example.com/live");
                    break;
                },
            }
        }
        task.abort();
    }
}
