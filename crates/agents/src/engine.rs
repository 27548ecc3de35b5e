//! Automation engine collaborator.
//!
//! The engine owns the reasoning and tool-call loop; we hand it a task and
//! a CDP endpoint, mirror session events to it while the run is live, and
//! poll until it reports a terminal state.

use std::time::Duration;

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tokio::sync::broadcast::error::RecvError,
    tracing::{debug, warn},
};

use websteer_session::{BrowserEvent, EventBus};

use crate::{error::AgentRunError, factory::LlmSpec};

/// One unit of work submitted to the engine.
#[derive(Debug, Serialize)]
pub struct EngineTask {
    pub task: String,
    pub cdp_url: String,
    pub max_steps: u32,
    pub reasoning: bool,
    pub flash: bool,
    pub llm: LlmSpec,
}

/// What the engine measured over a completed run. A report with entries in
/// `errors` is still a completed run; `success` is the engine's own verdict.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineReport {
    pub duration_secs: f64,
    pub success: bool,
    pub result: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub steps: u32,
}

/// Drives one task to completion against a browser session.
#[async_trait]
pub trait AutomationEngine: Send + Sync {
    async fn run(&self, task: EngineTask, events: &EventBus) -> Result<EngineReport, AgentRunError>;
}

#[derive(Debug, Deserialize)]
struct CreatedRun {
    run_id: String,
}

#[derive(Debug, Deserialize)]
struct RunStatus {
    state: RunState,
    report: Option<EngineReport>,
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RunState {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Serialize)]
struct WireEvent<'a> {
    id: String,
    parent: Option<String>,
    target_id: &'a str,
    url: &'a str,
}

/// HTTP client for the engine service.
pub struct HttpEngine {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
}

impl HttpEngine {
    pub fn new(cfg: &websteer_config::EngineConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
        }
    }

    /// Forwards navigation events from the session bus to the engine's
    /// download detector. Runs until the bus closes or the run ends.
    fn spawn_relay(
        &self,
        run_id: &str,
        events: &EventBus,
    ) -> tokio::task::JoinHandle<()> {
        let client = self.client.clone();
        let url = format!("{}/v1/runs/{run_id}/events", self.base_url);
        let mut rx = events.subscribe();
        tokio::spawn(async move {
            loop {
                let event = match rx.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "event relay lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let BrowserEvent::NavigationCompleted { id, parent, target_id, url: page_url } =
                    &event
                else {
                    continue;
                };
                let body = WireEvent {
                    id: id.to_string(),
                    parent: parent.map(|p| p.to_string()),
                    target_id,
                    url: page_url,
                };
                if let Err(error) = client.post(&url).json(&body).send().await {
                    warn!(%error, "failed to relay navigation event");
                }
            }
        })
    }
}

#[async_trait]
impl AutomationEngine for HttpEngine {
    async fn run(&self, task: EngineTask, events: &EventBus) -> Result<EngineReport, AgentRunError> {
        let created: CreatedRun = self
            .client
            .post(format!("{}/v1/runs", self.base_url))
            .json(&task)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(run_id = %created.run_id, "engine run started");

        let relay = self.spawn_relay(&created.run_id, events);
        let status_url = format!("{}/v1/runs/{}", self.base_url, created.run_id);

        let outcome = loop {
            // Each poll is a page-state sample as far as the session is
            // concerned; watchdogs key off these.
            events.publish(BrowserEvent::state_requested());

            let status: RunStatus = match self
                .client
                .get(&status_url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
            {
                Ok(response) => match response.json().await {
                    Ok(status) => status,
                    Err(error) => break Err(AgentRunError::Http(error)),
                },
                Err(error) => break Err(AgentRunError::Http(error)),
            };

            match status.state {
                RunState::Running => tokio::time::sleep(self.poll_interval).await,
                RunState::Completed => match status.report {
                    Some(report) => break Ok(report),
                    None => {
                        break Err(AgentRunError::EngineFault(
                            "engine reported completion without a report".into(),
                        ));
                    }
                },
                RunState::Failed => {
                    break Err(AgentRunError::EngineFault(
                        status.error.unwrap_or_else(|| "unspecified engine failure".into()),
                    ));
                }
            }
        };

        relay.abort();
        outcome
    }
}
