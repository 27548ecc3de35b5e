//! Task composition and run coordination.

use std::sync::Arc;

use tracing::info;

use websteer_session::{BrowserSession, EventBus};

use crate::{
    engine::{AutomationEngine, EngineTask},
    error::AgentRunError,
    factory::ModelClient,
    trajectory::Trajectory,
};

/// Fixed operating policy appended to every run, after any caller-supplied
/// instructions.
const OPERATING_POLICY: &str = "\
You must keep working until the user's request is fully resolved. If the \
request has multiple parts, decompose it into sub-requests and confirm each \
one is complete before moving on. Never stop at partial completion. Plan \
before every action and reflect on the outcome after it. PDF files are \
downloaded automatically when opened and CAPTCHAs are solved automatically \
by the environment; when either appears, wait for it to finish rather than \
acting on it.";

/// Renders the task document the engine receives: caller instructions (if
/// any) followed by the operating policy, then the user's input, in tagged
/// sections.
pub fn compose_task(instructions: Option<&str>, input: &str) -> String {
    let mut directives = String::new();
    if let Some(extra) = instructions {
        let extra = extra.trim();
        if !extra.is_empty() {
            directives.push_str(extra);
            directives.push_str("\n\n");
        }
    }
    directives.push_str(OPERATING_POLICY);
    format!("<instructions>\n{directives}\n</instructions>\n<input>\n{input}\n</input>")
}

/// Caller-controlled knobs for one run.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub instructions: Option<String>,
    pub input: String,
    pub max_steps: u32,
    pub reasoning: bool,
    pub flash: bool,
}

/// Composes tasks and drives the engine for one invocation at a time.
pub struct AgentCoordinator {
    engine: Arc<dyn AutomationEngine>,
}

impl AgentCoordinator {
    pub fn new(engine: Arc<dyn AutomationEngine>) -> Self {
        Self { engine }
    }

    pub async fn run(
        &self,
        spec: RunSpec,
        session: &BrowserSession,
        client: &ModelClient,
        bus: &EventBus,
    ) -> Result<Trajectory, AgentRunError> {
        let task = EngineTask {
            task: compose_task(spec.instructions.as_deref(), &spec.input),
            cdp_url: session.cdp_url.clone(),
            max_steps: spec.max_steps,
            reasoning: spec.reasoning,
            flash: spec.flash,
            llm: client.to_spec(),
        };

        info!(
            session_id = %session.session_id,
            provider = %client.provider(),
            model = client.model(),
            max_steps = spec.max_steps,
            "starting agent run"
        );

        let report = self.engine.run(task, bus).await?;
        let trajectory = Trajectory::from_report(report);

        info!(
            session_id = %session.session_id,
            success = trajectory.success,
            steps = trajectory.steps,
            duration_secs = trajectory.duration_secs,
            "agent run finished"
        );

        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::EngineReport, factory::ModelClientFactory, provider::Provider};
    use async_trait::async_trait;
    use secrecy::Secret;

    struct FixedEngine {
        outcome: Result<EngineReport, String>,
    }

    #[async_trait]
    impl AutomationEngine for FixedEngine {
        async fn run(
            &self,
            _task: EngineTask,
            _events: &EventBus,
        ) -> Result<EngineReport, AgentRunError> {
            self.outcome
                .clone()
                .map_err(AgentRunError::EngineFault)
        }
    }

    fn session() -> BrowserSession {
        BrowserSession {
            session_id: "s-1".into(),
            cdp_url: "ws://127.0.0.1:1/devtools/browser/x".into(),
            live_view_url: None,
            downloads_dir: "/tmp/downloads".into(),
        }
    }

    fn client() -> ModelClient {
        ModelClientFactory::new(websteer_config::LlmGatewayConfig {
            base_url: "https://gw.example.com".into(),
            token: None,
        })
        .client_for(Provider::OpenAi, "gpt-x", Secret::new("k".into()))
    }

    fn spec() -> RunSpec {
        RunSpec {
            instructions: None,
            input: "download the invoice".into(),
            max_steps: 25,
            reasoning: true,
            flash: false,
        }
    }

    #[test]
    fn task_wraps_policy_and_input() {
        let task = compose_task(None, "find the latest report");
        assert!(task.starts_with("<instructions>\n"));
        assert!(task.contains("Never stop at partial completion."));
        assert!(task.ends_with("<input>\nfind the latest report\n</input>"));
    }

    #[test]
    fn caller_instructions_precede_the_policy() {
        let task = compose_task(Some("Prefer the English version."), "fetch the manual");
        let extra_at = task.find("Prefer the English version.").unwrap();
        let policy_at = task.find("Never stop at partial completion.").unwrap();
        assert!(extra_at < policy_at);
    }

    #[test]
    fn blank_instructions_are_ignored() {
        let with_blank = compose_task(Some("   "), "x");
        let without = compose_task(None, "x");
        assert_eq!(with_blank, without);
    }

    #[tokio::test]
    async fn report_errors_do_not_fail_the_run() {
        let coordinator = AgentCoordinator::new(Arc::new(FixedEngine {
            outcome: Ok(EngineReport {
                duration_secs: 4.0,
                success: false,
                result: None,
                errors: vec!["step limit reached".into()],
                steps: 25,
            }),
        }));
        let bus = EventBus::new(8);
        let trajectory = coordinator
            .run(spec(), &session(), &client(), &bus)
            .await
            .unwrap();
        assert!(!trajectory.success);
        assert_eq!(trajectory.errors, vec!["step limit reached"]);
    }

    #[tokio::test]
    async fn engine_faults_propagate() {
        let coordinator = AgentCoordinator::new(Arc::new(FixedEngine {
            outcome: Err("connection refused".into()),
        }));
        let bus = EventBus::new(8);
        let error = coordinator
            .run(spec(), &session(), &client(), &bus)
            .await
            .unwrap_err();
        assert!(matches!(error, AgentRunError::EngineFault(_)));
    }
}
