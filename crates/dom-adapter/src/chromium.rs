//! Chromium-backed [`ScriptEngine`] built on chromiumoxide.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{AdapterError, AdapterErrorKind};
use crate::script::{ScriptDom, ScriptEngine};

/// Browser launch settings, usually read from the `browser` config section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub launch_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            no_sandbox: false,
            window_width: 1280,
            window_height: 900,
            launch_timeout_ms: 20_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl BrowserSettings {
    fn browser_config(&self) -> Result<BrowserConfig, AdapterError> {
        if let Some(path) = &self.executable {
            if !path.exists() {
                return Err(AdapterError::new(AdapterErrorKind::Internal).with_hint(format!(
                    "chrome executable not found at {}",
                    path.display()
                )));
            }
        }

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(self.request_timeout_ms))
            .launch_timeout(Duration::from_millis(self.launch_timeout_ms))
            .window_size(self.window_width, self.window_height);
        if !self.headless {
            builder = builder.with_head();
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("browser config error: {err}"))
        })
    }
}

/// Evaluates expressions in one chromiumoxide page.
#[derive(Clone, Debug)]
pub struct ChromiumEngine {
    page: Page,
}

impl ChromiumEngine {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl ScriptEngine for ChromiumEngine {
    async fn evaluate(&self, expression: String) -> Result<Value, AdapterError> {
        let result = self.page.evaluate(expression).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::Script).with_hint(err.to_string())
        })?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}

/// A launched browser with one page open on the target URL.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    /// A fresh DOM port bound to the session's page.
    pub fn dom(&self) -> ScriptDom<ChromiumEngine> {
        ScriptDom::new(ChromiumEngine::new(self.page.clone()))
    }

    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(error = %err, "browser close returned error");
        }
        if let Err(err) = self.browser.wait().await {
            warn!(error = %err, "waiting for browser exit failed");
        }
        self.handler_task.abort();
        info!("browser closed");
    }
}

/// Launches Chromium, spawns the CDP handler loop and opens `url`.
pub async fn launch_page(
    settings: &BrowserSettings,
    url: &str,
) -> Result<ChromiumSession, AdapterError> {
    let config = settings.browser_config()?;
    info!(
        headless = settings.headless,
        executable = ?settings.executable,
        "launching chromium"
    );
    let (browser, mut handler) = Browser::launch(config).await.map_err(|err| {
        AdapterError::new(AdapterErrorKind::Internal)
            .with_hint(format!("failed to launch chromium: {err}"))
    })?;
    let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

    let page = match browser.new_page(url).await {
        Ok(page) => page,
        Err(err) => {
            handler_task.abort();
            return Err(AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("failed to open {url}: {err}")));
        }
    };
    if let Err(err) = page.wait_for_navigation().await {
        warn!(%url, error = %err, "navigation did not settle");
    }
    info!(%url, "page ready");

    Ok(ChromiumSession {
        browser,
        page,
        handler_task,
    })
}
