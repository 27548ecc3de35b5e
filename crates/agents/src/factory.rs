//! Model client construction.

use std::collections::BTreeMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
};

use websteer_config::LlmGatewayConfig;

use crate::provider::Provider;

/// Header the LLM gateway authenticates on.
const GATEWAY_AUTH_HEADER: &str = "cf-aig-authorization";

/// A configured LLM client: the caller's model and key, routed through the
/// gateway path registered for the provider.
pub struct ModelClient {
    provider: Provider,
    model: String,
    base_url: String,
    api_key: Secret<String>,
    gateway_token: Option<Secret<String>>,
}

/// Wire form of a model client, consumed by the engine service. Secrets
/// are exposed here on purpose: this is the one place they leave the
/// process, addressed to the collaborator that needs them.
#[derive(Debug, Serialize)]
pub struct LlmSpec {
    pub provider: &'static str,
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub headers: BTreeMap<String, String>,
}

impl ModelClient {
    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn to_spec(&self) -> LlmSpec {
        let mut headers = BTreeMap::new();
        if let Some(token) = &self.gateway_token {
            headers.insert(
                GATEWAY_AUTH_HEADER.to_string(),
                token.expose_secret().clone(),
            );
        }
        LlmSpec {
            provider: self.provider.as_str(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.expose_secret().clone(),
            headers,
        }
    }
}

/// Maps a provider to a configured client. Built once at startup from the
/// gateway config; the mapping is the exhaustive [`Provider`] enum, so an
/// unroutable provider cannot exist at runtime.
pub struct ModelClientFactory {
    gateway: LlmGatewayConfig,
}

impl ModelClientFactory {
    pub fn new(gateway: LlmGatewayConfig) -> Self {
        Self { gateway }
    }

    pub fn client_for(
        &self,
        provider: Provider,
        model: &str,
        api_key: Secret<String>,
    ) -> ModelClient {
        let base = self.gateway.base_url.trim_end_matches('/');
        ModelClient {
            provider,
            model: model.to_string(),
            base_url: format!("{base}/{}", provider.gateway_path()),
            api_key,
            gateway_token: self.gateway.token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ModelClientFactory {
        ModelClientFactory::new(LlmGatewayConfig {
            base_url: "https://gw.example.com/v1/acct/llm".into(),
            token: Some(Secret::new("gw-token".into())),
        })
    }

    #[test]
    fn routes_openai_through_gateway() {
        let client = factory().client_for(Provider::OpenAi, "gpt-x", Secret::new("k".into()));
        assert_eq!(client.base_url(), "https://gw.example.com/v1/acct/llm/openai");
        assert_eq!(client.model(), "gpt-x");
    }

    #[test]
    fn routes_gemini_through_special_cased_path() {
        let client =
            factory().client_for(Provider::Gemini, "gemini-2.5-pro", Secret::new("k".into()));
        assert_eq!(
            client.base_url(),
            "https://gw.example.com/v1/acct/llm/google-ai-studio"
        );
    }

    #[test]
    fn spec_carries_key_and_gateway_header() {
        let client = factory().client_for(Provider::Anthropic, "claude-x", Secret::new("sk".into()));
        let spec = client.to_spec();
        assert_eq!(spec.provider, "anthropic");
        assert_eq!(spec.api_key, "sk");
        assert_eq!(
            spec.headers.get("cf-aig-authorization").map(String::as_str),
            Some("gw-token")
        );
    }

    #[test]
    fn spec_omits_header_without_gateway_token() {
        let factory = ModelClientFactory::new(LlmGatewayConfig {
            base_url: "https://gw.example.com".into(),
            token: None,
        });
        let spec = factory
            .client_for(Provider::Ollama, "llama3", Secret::new("unused".into()))
            .to_spec();
        assert!(spec.headers.is_empty());
    }
}
