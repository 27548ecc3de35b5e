//! Ephemeral remote browser sessions.
//!
//! One invocation owns exactly one [`BrowserSession`], provisioned from the
//! remote service and released on every exit path. At creation the session
//! attaches a download watchdog with a pluggable detection strategy; the
//! broadened strategy bridges page-state samples into synthetic navigation
//! events so downloads are detected even when no real navigation happens.

pub mod error;
pub mod events;
pub mod probe;
pub mod provisioner;
pub mod types;
pub mod watchdog;

pub use {
    error::SessionError,
    events::{BrowserEvent, EventBus, EventId, EventKind},
    probe::DevtoolsPageProbe,
    provisioner::{SessionHandle, SessionOptions, SessionProvisioner},
    types::{BrowserSession, PageRef},
    watchdog::{DownloadWatchdog, PageProbe, WatchdogStrategy},
};
