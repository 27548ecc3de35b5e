//! One-invocation orchestration.

use tracing::{info, instrument, warn};

use {
    websteer_agents::{AgentCoordinator, ModelClient, ModelClientFactory, RunSpec},
    websteer_common::InvocationId,
    websteer_session::{SessionHandle, SessionOptions, SessionProvisioner, WatchdogStrategy},
    websteer_storage::ArtifactPublisher,
};

use crate::{
    error::GatewayError,
    request::AutomationRequest,
    response::{self, AutomationResponse},
};

/// Shared, stateless run pipeline. Every invocation gets its own session;
/// the service itself holds only configuration-derived collaborators.
pub struct PerformService {
    provisioner: SessionProvisioner,
    factory: ModelClientFactory,
    coordinator: AgentCoordinator,
    publisher: ArtifactPublisher,
}

impl PerformService {
    pub fn new(
        provisioner: SessionProvisioner,
        factory: ModelClientFactory,
        coordinator: AgentCoordinator,
        publisher: ArtifactPublisher,
    ) -> Self {
        Self {
            provisioner,
            factory,
            coordinator,
            publisher,
        }
    }

    /// Runs one invocation end to end. The session is released on every
    /// exit path; cancellation falls back to the handle's drop behavior.
    #[instrument(skip_all, fields(invocation = %invocation_id))]
    pub async fn perform(
        &self,
        invocation_id: InvocationId,
        request: AutomationRequest,
    ) -> Result<AutomationResponse, GatewayError> {
        request.validate()?;

        // The model client needs no I/O, so it is ready before the browser is.
        let client =
            self.factory
                .client_for(request.provider, &request.model, request.api_key.clone());

        let handle = self
            .provisioner
            .create(
                &invocation_id,
                SessionOptions {
                    stealth: request.stealth,
                    headless: request.headless,
                    timeout_secs: request.browser_timeout,
                    watchdog: WatchdogStrategy::default(),
                },
            )
            .await?;

        let session_id = handle.session().session_id.clone();
        let outcome = self.drive(&handle, &request, &client).await;
        handle.release().await;

        let (trajectory, downloads) = outcome?;
        info!(session = %session_id, success = trajectory.success, "invocation finished");
        Ok(response::build(&session_id, &trajectory, downloads))
    }

    async fn drive(
        &self,
        handle: &SessionHandle,
        request: &AutomationRequest,
        client: &ModelClient,
    ) -> Result<
        (
            websteer_agents::Trajectory,
            std::collections::BTreeMap<String, String>,
        ),
        GatewayError,
    > {
        let trajectory = self
            .coordinator
            .run(
                RunSpec {
                    instructions: request.instructions.clone(),
                    input: request.input.clone(),
                    max_steps: request.max_steps,
                    reasoning: request.reasoning,
                    flash: request.flash,
                },
                handle.session(),
                client,
                handle.bus(),
            )
            .await?;

        if !trajectory.errors.is_empty() {
            warn!(
                session = %handle.session().session_id,
                errors = ?trajectory.errors,
                "run completed with errors"
            );
        }

        let downloads = self
            .publisher
            .publish(
                &handle.session().session_id,
                &handle.session().downloads_dir,
                &trajectory,
            )
            .await?;

        Ok((trajectory, downloads))
    }
}
