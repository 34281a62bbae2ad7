use anyhow::Context;
use solum_core::client::ReqwestClient;
use solum_core::config::{self, Config, Overrides, WarnLevel};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolve the config file path.
///
/// Priority:
/// 1. `--config` flag / `SOLUM_CONFIG` env var (passed in as `explicit`)
/// 2. `~/.config/solum/config.yaml`
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(config::default_path)
}

pub fn load_config(explicit: Option<&Path>, overrides: Overrides) -> anyhow::Result<Config> {
    let config = match config_path(explicit) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Config::load(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
        }
        None => Config::default(),
    };
    Ok(config.merge(overrides))
}

/// Build the HTTP transport the resource commands share.
pub fn connect(config: &Config) -> anyhow::Result<ReqwestClient> {
    for w in config.validate() {
        if w.level == WarnLevel::Error {
            anyhow::bail!("invalid configuration: {}", w.message);
        }
        warn!("{}", w.message);
    }
    let auth = config.authenticator()?;
    let client = ReqwestClient::new(auth).context("failed to build HTTP client")?;
    Ok(client)
}
