//! Page resolution over the devtools HTTP endpoint.

use {async_trait::async_trait, serde::Deserialize, tracing::trace, url::Url};

use crate::{error::SessionError, types::PageRef, watchdog::PageProbe};

/// Resolves the current page by listing devtools targets over HTTP.
///
/// The session's CDP endpoint is a websocket URL; the same host serves the
/// `/json/list` target inventory, which is all the watchdog needs.
pub struct DevtoolsPageProbe {
    client: reqwest::Client,
    list_url: Url,
}

#[derive(Debug, Deserialize)]
struct TargetInfo {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: String,
}

impl DevtoolsPageProbe {
    /// Derive the target-list URL from the session's CDP websocket URL.
    pub fn from_cdp_url(cdp_url: &str) -> Result<Self, SessionError> {
        let mut url =
            Url::parse(cdp_url).map_err(|e| SessionError::Endpoint(e.to_string()))?;
        let scheme = match url.scheme() {
            "ws" => "http",
            "wss" => "https",
            other => other,
        }
        .to_owned();
        url.set_scheme(&scheme)
            .map_err(|()| SessionError::Endpoint(format!("unsupported scheme in {cdp_url}")))?;
        url.set_path("/json/list");
        url.set_query(None);
        Ok(Self {
            client: reqwest::Client::new(),
            list_url: url,
        })
    }
}

#[async_trait]
impl PageProbe for DevtoolsPageProbe {
    async fn current_page(&self) -> Option<PageRef> {
        let response = match self.client.get(self.list_url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                trace!(error = %e, "target list unavailable");
                return None;
            },
        };
        let targets: Vec<TargetInfo> = match response.json().await {
            Ok(t) => t,
            Err(e) => {
                trace!(error = %e, "target list unparsable");
                return None;
            },
        };
        targets
            .into_iter()
            .find(|t| t.kind == "page" && !t.url.is_empty() && t.url != "about:blank")
            .map(|t| PageRef {
                target_id: t.id,
                url: t.url,
            })
    }
}
