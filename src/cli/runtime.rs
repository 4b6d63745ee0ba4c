use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Project-local config, checked before the per-user one.
pub const LOCAL_CONFIG_PATH: &str = "config/formpilot.yaml";

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    // Reports go to stdout, so logs stay on stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from, `None` when running on defaults
    pub path: Option<PathBuf>,
}

/// `--config FILE` > `./config/formpilot.yaml` > `<config_dir>/formpilot/config.yaml`.
pub fn config_candidates(explicit: Option<&PathBuf>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.clone()];
    }
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_PATH)];
    if let Some(mut path) = dirs::config_dir() {
        path.push("formpilot");
        path.push("config.yaml");
        candidates.push(path);
    }
    candidates
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    if let Some(path) = config_path {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    let found = config_candidates(config_path)
        .into_iter()
        .find(|path| path.exists());

    let mut loaded = match found {
        Some(path) => {
            let config = read_config(&path).await?;
            info!("Loaded configuration from: {}", path.display());
            LoadedConfig {
                config,
                path: Some(path),
            }
        }
        None => {
            warn!("No config file found, using defaults");
            LoadedConfig {
                config: Config::default(),
                path: None,
            }
        }
    };

    loaded.config.apply_env_overrides();
    Ok(loaded)
}

async fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    Config::from_yaml(&content).with_context(|| format!("in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[tokio::test]
    #[serial]
    async fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timing:\n  listbox_open_delay_ms: 5").unwrap();
        let path = file.path().to_path_buf();

        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.timing.listbox_open_delay_ms, 5);
        assert_eq!(loaded.config.timing.inter_action_delay_ms, 250);
    }

    #[tokio::test]
    #[serial]
    async fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(load_config(Some(&path)).await.is_err());
    }

    #[test]
    fn local_config_comes_first() {
        let candidates = config_candidates(None);
        assert_eq!(candidates[0], PathBuf::from(LOCAL_CONFIG_PATH));
        let explicit = PathBuf::from("/etc/formpilot.yaml");
        assert_eq!(config_candidates(Some(&explicit)), vec![explicit]);
    }
}
