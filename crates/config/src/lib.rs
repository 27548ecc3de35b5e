//! Configuration loading and schema.
//!
//! Config files: `websteer.toml` or `websteer.json`, searched in `./` then
//! `~/.config/websteer/`. Supports `${ENV_VAR}` substitution in all string
//! values. Configuration is read exactly once at process start and threaded
//! through component constructors; nothing reads the environment afterwards.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{
        BrowserDefaults, EngineConfig, LlmGatewayConfig, ProvisionerConfig, ServerConfig,
        StorageConfig, WebsteerConfig,
    },
};
