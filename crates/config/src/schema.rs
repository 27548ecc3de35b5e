//! Config schema types (server, provisioner, LLM gateway, storage, browser).

use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration. Built once at process start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsteerConfig {
    pub server: ServerConfig,
    pub provisioner: ProvisionerConfig,
    pub llm_gateway: LlmGatewayConfig,
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub browser: BrowserDefaults,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

/// Remote browser provisioning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Base URL of the provisioning service.
    pub base_url: String,
    /// Bearer credential for the provisioning service.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.onkernel.com".into(),
            api_key: None,
        }
    }
}

/// LLM gateway every model client is routed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmGatewayConfig {
    /// Gateway base URL; provider-specific paths are appended to it.
    pub base_url: String,
    /// Gateway authorization token, sent alongside the caller's API key.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<Secret<String>>,
}

impl Default for LlmGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gateway.ai.cloudflare.com/v1/websteer/llm".into(),
            token: None,
        }
    }
}

/// Remote automation engine service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the engine service that runs the reasoning/tool-call loop.
    pub base_url: String,
    /// Interval between run-status polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9444".into(),
            poll_interval_ms: 500,
        }
    }
}

/// Object storage for run artifacts. Leaving `bucket` unset disables
/// storage entirely; the publisher then hands back local paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket name. `None` disables persistent storage.
    pub bucket: Option<String>,
    /// Custom S3-compatible endpoint (R2, minio). `None` uses AWS.
    pub endpoint: Option<String>,
    pub region: String,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_key_id: Option<Secret<String>>,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub secret_access_key: Option<Secret<String>>,
    /// Validity window for presigned retrieval URLs, in seconds.
    pub presign_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            endpoint: None,
            region: "auto".into(),
            access_key_id: None,
            secret_access_key: None,
            presign_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl StorageConfig {
    /// Whether persistent artifact storage is configured.
    pub fn enabled(&self) -> bool {
        self.bucket.is_some()
    }
}

/// Per-session browser defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserDefaults {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Directory the remote session mirrors downloads into.
    pub downloads_dir: PathBuf,
}

impl Default for BrowserDefaults {
    fn default() -> Self {
        Self {
            viewport_width: 1440,
            viewport_height: 900,
            downloads_dir: PathBuf::from("/tmp/downloads"),
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
