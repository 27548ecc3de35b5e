//! Session data types.

use std::path::PathBuf;

/// One ephemeral remote browser instance, live for exactly one invocation.
#[derive(Debug, Clone)]
pub struct BrowserSession {
    /// Session id assigned by the provisioning service.
    pub session_id: String,
    /// Opaque CDP connection endpoint (a websocket URL).
    pub cdp_url: String,
    /// Live-view URL, present only for non-headless sessions.
    pub live_view_url: Option<String>,
    /// Directory the session mirrors downloaded files into.
    pub downloads_dir: PathBuf,
}

/// A resolvable page inside the session: the devtools target currently
/// holding agent focus, and the URL it is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub target_id: String,
    pub url: String,
}
