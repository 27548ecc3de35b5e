//! Remote browser session provisioning and release.

use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tokio::task::JoinHandle,
    tracing::{info, warn},
};

use websteer_common::InvocationId;
use websteer_config::{BrowserDefaults, ProvisionerConfig};

use crate::{
    error::SessionError,
    events::EventBus,
    probe::DevtoolsPageProbe,
    types::BrowserSession,
    watchdog::{DownloadWatchdog, PageProbe, WatchdogStrategy},
};

/// Per-invocation session options.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub stealth: bool,
    pub headless: bool,
    /// Idle timeout forwarded to the provisioning service, in seconds.
    pub timeout_secs: u64,
    /// Download-detection strategy attached at creation.
    pub watchdog: WatchdogStrategy,
}

#[derive(Debug, Serialize)]
struct CreateBrowserRequest<'a> {
    headless: bool,
    stealth: bool,
    timeout_seconds: u64,
    viewport: Viewport,
    /// Omitted for local harness runs so they never pollute the
    /// provisioning system's traces.
    #[serde(skip_serializing_if = "Option::is_none")]
    invocation_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Viewport {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct CreateBrowserResponse {
    session_id: String,
    cdp_ws_url: String,
    #[serde(default)]
    browser_live_view_url: Option<String>,
}

/// Creates and releases remote browser sessions. One provisioner is built
/// at startup and shared across invocations; it holds no per-run state.
pub struct SessionProvisioner {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<Secret<String>>,
    browser: BrowserDefaults,
}

impl SessionProvisioner {
    pub fn new(cfg: &ProvisionerConfig, browser: BrowserDefaults) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            browser,
        }
    }

    /// Provision one session. Fatal on failure; no retry, since a
    /// half-created session cannot be salvaged.
    pub async fn create(
        &self,
        invocation_id: &InvocationId,
        opts: SessionOptions,
    ) -> Result<SessionHandle, SessionError> {
        let payload = self.provisioning_payload(invocation_id, &opts);
        let mut request = self
            .client
            .post(format!("{}/browsers", self.base_url))
            .json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Rejected { status, body });
        }
        let created: CreateBrowserResponse = response.json().await?;

        info!(session = %created.session_id, "created browser session");
        let live_view_url = if opts.headless {
            None
        } else {
            created.browser_live_view_url
        };
        if let Some(view) = &live_view_url {
            info!(session = %created.session_id, live_view = %view, "browser live view");
        }

        let session = BrowserSession {
            session_id: created.session_id,
            cdp_url: created.cdp_ws_url,
            live_view_url,
            downloads_dir: self.browser.downloads_dir.clone(),
        };

        // The watchdog is composed in at creation; the strategy decides
        // which event kinds it bridges.
        let bus = EventBus::new(64);
        let probe: Arc<dyn PageProbe> = Arc::new(DevtoolsPageProbe::from_cdp_url(&session.cdp_url)?);
        let watchdog = Arc::new(DownloadWatchdog::new(opts.watchdog, bus.clone(), probe));
        let watchdog_task = Arc::clone(&watchdog).spawn();

        Ok(SessionHandle {
            session,
            bus,
            watchdog,
            watchdog_task,
            releaser: Some(Releaser {
                client: self.client.clone(),
                base_url: self.base_url.clone(),
                api_key: self.api_key.clone(),
            }),
        })
    }

    fn provisioning_payload<'a>(
        &self,
        invocation_id: &'a InvocationId,
        opts: &SessionOptions,
    ) -> CreateBrowserRequest<'a> {
        CreateBrowserRequest {
            headless: opts.headless,
            stealth: opts.stealth,
            timeout_seconds: opts.timeout_secs,
            viewport: Viewport {
                width: self.browser.viewport_width,
                height: self.browser.viewport_height,
            },
            invocation_id: (!invocation_id.is_local()).then(|| invocation_id.as_str()),
        }
    }
}

struct Releaser {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<Secret<String>>,
}

impl Releaser {
    async fn release(self, session_id: &str) {
        let mut request = self
            .client
            .delete(format!("{}/browsers/{session_id}", self.base_url));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }
        match request.send().await {
            Ok(response) if response.status().is_success() => {
                info!(session = %session_id, "released browser session");
            },
            Ok(response) => {
                warn!(session = %session_id, status = %response.status(), "session release rejected");
            },
            Err(e) => {
                warn!(session = %session_id, error = %e, "session release failed");
            },
        }
    }
}

/// Owning handle for one provisioned session.
///
/// The session is released on every exit path: explicitly through
/// [`SessionHandle::release`], or from `Drop` when the invocation future is
/// cancelled or errors out before reaching the explicit call.
pub struct SessionHandle {
    session: BrowserSession,
    bus: EventBus,
    watchdog: Arc<DownloadWatchdog>,
    watchdog_task: JoinHandle<()>,
    releaser: Option<Releaser>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn watchdog(&self) -> &DownloadWatchdog {
        &self.watchdog
    }

    /// Release the remote session and stop the watchdog.
    pub async fn release(mut self) {
        self.watchdog_task.abort();
        if let Some(releaser) = self.releaser.take() {
            releaser.release(&self.session.session_id).await;
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.watchdog_task.abort();
        // Cancellation path: fire the release without awaiting it.
        if let Some(releaser) = self.releaser.take() {
            let session_id = self.session.session_id.clone();
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move { releaser.release(&session_id).await });
                },
                Err(_) => warn!(session = %session_id, "no runtime, session leaks until idle timeout"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioner(base_url: &str) -> SessionProvisioner {
        SessionProvisioner::new(
            &ProvisionerConfig {
                base_url: base_url.to_string(),
                api_key: Some(Secret::new("prov-key".into())),
            },
            BrowserDefaults::default(),
        )
    }

    fn options() -> SessionOptions {
        SessionOptions {
            stealth: true,
            headless: false,
            timeout_secs: 60,
            watchdog: WatchdogStrategy::Broadened,
        }
    }

    #[test]
    fn local_invocation_ids_are_never_forwarded() {
        let p = provisioner("https://provision.example.com");
        let local = InvocationId::local();
        let payload = p.provisioning_payload(&local, &options());
        assert!(payload.invocation_id.is_none());

        let body = serde_json::to_value(&payload).unwrap();
        assert!(body.get("invocation_id").is_none());
    }

    #[test]
    fn foreign_invocation_ids_are_forwarded() {
        let p = provisioner("https://provision.example.com");
        let id = InvocationId::from("inv-123");
        let payload = p.provisioning_payload(&id, &options());
        assert_eq!(payload.invocation_id, Some("inv-123"));

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["invocation_id"], "inv-123");
        assert_eq!(body["stealth"], true);
        assert_eq!(body["viewport"]["width"], 1440);
    }

    #[tokio::test]
    async fn create_returns_session_with_live_view() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/browsers")
            .match_header("authorization", "Bearer prov-key")
            .with_body(
                serde_json::json!({
                    "session_id": "sess-1",
                    "cdp_ws_url": "ws://10.1.2.3:9222/devtools/browser/x",
                    "browser_live_view_url": "https://view.example.com/sess-1",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let p = provisioner(&server.url());
        let handle = p.create(&InvocationId::from("inv-9"), options()).await.unwrap();
        assert_eq!(handle.session().session_id, "sess-1");
        assert_eq!(
            handle.session().live_view_url.as_deref(),
            Some("https://view.example.com/sess-1")
        );
        handle.release().await;
    }

    #[tokio::test]
    async fn headless_sessions_hide_live_view() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/browsers")
            .with_body(
                serde_json::json!({
                    "session_id": "sess-2",
                    "cdp_ws_url": "ws://10.1.2.3:9222/devtools/browser/y",
                    "browser_live_view_url": "https://view.example.com/sess-2",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let p = provisioner(&server.url());
        let opts = SessionOptions {
            headless: true,
            ..options()
        };
        let handle = p.create(&InvocationId::from("inv-10"), opts).await.unwrap();
        assert_eq!(handle.session().live_view_url, None);
        handle.release().await;
    }

    #[tokio::test]
    async fn dropped_handle_still_releases_the_session() {
        let mut server = mockito::Server::new_async().await;
        let _create = server
            .mock("POST", "/browsers")
            .with_body(
                serde_json::json!({
                    "session_id": "sess-3",
                    "cdp_ws_url": "ws://10.1.2.3:9222/devtools/browser/z",
                })
                .to_string(),
            )
            .create_async()
            .await;
        let release = server
            .mock("DELETE", "/browsers/sess-3")
            .with_status(200)
            .create_async()
            .await;

        let p = provisioner(&server.url());
        let handle = p.create(&InvocationId::from("inv-12"), options()).await.unwrap();
        drop(handle);

        // The drop path only spawns the release; give it time to land.
        for _ in 0..100 {
            if release.matched_async().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        release.assert_async().await;
    }

    #[tokio::test]
    async fn provisioning_rejection_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/browsers")
            .with_status(503)
            .with_body("at capacity")
            .create_async()
            .await;

        let p = provisioner(&server.url());
        let err = p
            .create(&InvocationId::from("inv-11"), options())
            .await
            .expect_err("expected rejection");
        match err {
            SessionError::Rejected { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "at capacity");
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
