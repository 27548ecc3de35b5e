use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::WebsteerConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["websteer.toml", "websteer.json"];

/// Load config from the given path (TOML or JSON).
pub fn load_config(path: &Path) -> anyhow::Result<WebsteerConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    match ext {
        "toml" => Ok(toml::from_str(&raw)?),
        "json" => Ok(serde_json::from_str(&raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Resolve config from the first file found: project-local
/// `./websteer.{toml,json}` beats the user-global copy under
/// `~/.config/websteer/`. Falls back to built-in defaults when nothing is
/// on disk or the file fails to parse.
pub fn discover_and_load() -> WebsteerConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return WebsteerConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
        WebsteerConfig::default()
    })
}

fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|path| path.exists())
}

/// Returns the user-global config directory (`~/.config/websteer/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "websteer").map(|d| d.config_dir().to_path_buf())
}
