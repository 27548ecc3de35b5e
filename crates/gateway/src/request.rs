//! Inbound run request.

use {
    secrecy::Secret,
    serde::Deserialize,
};

use websteer_agents::Provider;

use crate::error::GatewayError;

/// One automation run. `provider` is a closed set; unknown names are
/// rejected during deserialization.
#[derive(Debug, Deserialize)]
pub struct AutomationRequest {
    /// The user's task, in natural language.
    pub input: String,
    /// Extra caller instructions, placed ahead of the operating policy.
    #[serde(default)]
    pub instructions: Option<String>,
    pub provider: Provider,
    pub model: String,
    /// Caller's key for the model provider, relayed through the gateway.
    pub api_key: Secret<String>,
    #[serde(default = "default_stealth")]
    pub stealth: bool,
    #[serde(default)]
    pub headless: bool,
    /// Idle timeout for the provisioned browser, in seconds.
    #[serde(default = "default_browser_timeout")]
    pub browser_timeout: u64,
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    #[serde(default = "default_reasoning")]
    pub reasoning: bool,
    #[serde(default)]
    pub flash: bool,
}

fn default_stealth() -> bool {
    true
}

fn default_browser_timeout() -> u64 {
    60
}

fn default_max_steps() -> u32 {
    100
}

fn default_reasoning() -> bool {
    true
}

impl AutomationRequest {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.input.trim().is_empty() {
            return Err(GatewayError::Validation("input must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(GatewayError::Validation("model must not be empty".into()));
        }
        Ok(())
    }
}
