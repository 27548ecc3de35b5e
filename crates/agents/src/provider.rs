//! Closed set of supported model providers.

use serde::{Deserialize, Serialize};

/// Supported LLM providers. The set is closed: a request naming anything
/// else fails deserialization before any external call is issued, and the
/// client factory matches exhaustively, so adding a variant without a
/// gateway route refuses to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Anthropic,
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "azure_openai")]
    AzureOpenAi,
    Groq,
    Ollama,
}

impl Provider {
    /// Canonical request-facing name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::AzureOpenAi => "azure_openai",
            Self::Groq => "groq",
            Self::Ollama => "ollama",
        }
    }

    /// Routing path on the LLM gateway. Mostly the provider name; Google's
    /// models are served under the gateway's `google-ai-studio` route, and
    /// Azure uses a hyphenated path.
    pub fn gateway_path(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Gemini => "google-ai-studio",
            Self::OpenAi => "openai",
            Self::AzureOpenAi => "azure-openai",
            Self::Groq => "groq",
            Self::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
