//! Configuration management module
//!
//! One YAML document with a `browser` section (Chromium launch settings) and a
//! `timing` section (executor delays). Every field has a default, so an empty
//! file and a missing file mean the same thing.

use std::env;

use action_primitives::ExecutorTiming;
use anyhow::{Context, Result};
use dom_adapter::BrowserSettings;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Path of the Chromium executable to launch.
pub const ENV_CHROME: &str = "FORMPILOT_CHROME";

/// `true`/`false`: run Chromium headless.
pub const ENV_HEADLESS: &str = "FORMPILOT_HEADLESS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserSettings,
    pub timing: ExecutorTiming,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    /// Applies `FORMPILOT_CHROME` and `FORMPILOT_HEADLESS`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var(ENV_CHROME) {
            if !path.trim().is_empty() {
                info!(path = %path, "Using Chromium from {}", ENV_CHROME);
                self.browser.executable = Some(path.into());
            }
        }

        if let Ok(raw) = env::var(ENV_HEADLESS) {
            match parse_bool(&raw) {
                Some(headless) => self.browser.headless = headless,
                None => warn!(value = %raw, "ignoring unparseable {}", ENV_HEADLESS),
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "browser:\n  headless: false\ntiming:\n  inter_action_delay_ms: 10\n",
        )
        .unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_width, 1280);
        assert_eq!(config.timing.inter_action_delay_ms, 10);
        assert_eq!(config.timing.aria_poll_attempts, 5);

        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
        assert!(Config::from_yaml("timing: [1, 2]").is_err());
    }

    #[test]
    #[serial]
    fn env_overrides_win() {
        env::set_var(ENV_CHROME, "/opt/chromium/chrome");
        env::set_var(ENV_HEADLESS, "off");
        let mut config = Config::default();
        config.apply_env_overrides();
        env::remove_var(ENV_CHROME);
        env::remove_var(ENV_HEADLESS);

        assert_eq!(
            config.browser.executable.as_deref(),
            Some(std::path::Path::new("/opt/chromium/chrome"))
        );
        assert!(!config.browser.headless);
    }

    #[test]
    #[serial]
    fn bad_headless_value_is_ignored() {
        env::set_var(ENV_HEADLESS, "sometimes");
        let mut config = Config::default();
        config.apply_env_overrides();
        env::remove_var(ENV_HEADLESS);
        assert!(config.browser.headless);
    }
}
