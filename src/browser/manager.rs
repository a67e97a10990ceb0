//! Browser manager for coordinating headless browser sessions.
//!
//! Each render spawns one Playwright helper process, owned by a
//! [`BrowserProcess`] guard, and sessions are capped by a semaphore.

use crate::config::Config;
use crate::types::RenderedPage;
use crate::viewport::DeviceProfile;
use crate::{PageScopeError, Result, Viewport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::playwright::{
    ensure_node_available, ensure_playwright_available, map_playwright_error,
    map_playwright_status_error, ScriptResult, RENDER_SCRIPT, SCREENSHOT_SCRIPT,
};
use super::process::{BrowserProcess, HelperOutput};
use super::PageRenderer;

/// Default timeout for page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for the entire helper process.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration options for browser sessions.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// The Node.js command to use (default: "node").
    pub node_command: String,
    /// Viewport for the desktop render.
    pub viewport: Viewport,
    /// Playwright device descriptor used for the mobile probe.
    pub mobile_device: String,
    pub headless: bool,
    pub navigation_timeout: Duration,
    /// Pause after navigation, before scrolling.
    pub settle: Duration,
    /// Pause after the scroll-to-bottom.
    pub scroll_settle: Duration,
    /// Pause after navigation in the mobile probe.
    pub mobile_settle: Duration,
    pub process_timeout: Duration,
    pub max_concurrent_sessions: usize,
    /// Serve this file as the rendered DOM instead of launching a browser.
    pub mock_html: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for BrowserOptions {
    fn from(config: &Config) -> Self {
        Self {
            node_command: config.browser.node_command.clone(),
            viewport: config.viewport,
            mobile_device: config.browser.mobile_device.clone(),
            headless: config.browser.headless,
            navigation_timeout: config.timeouts.navigation,
            settle: config.timeouts.settle,
            scroll_settle: config.timeouts.scroll_settle,
            mobile_settle: config.timeouts.mobile_settle,
            process_timeout: config.timeouts.process,
            max_concurrent_sessions: config.browser.max_sessions,
            mock_html: config.browser.mock_html.clone(),
        }
    }
}

/// Which of the two helper modes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderMode {
    Dom,
    Probe,
}

impl RenderMode {
    fn as_arg(self) -> &'static str {
        match self {
            RenderMode::Dom => "dom",
            RenderMode::Probe => "probe",
        }
    }
}

/// Manages concurrent browser sessions with semaphore-based limiting.
#[derive(Debug, Clone)]
pub struct BrowserManager {
    options: BrowserOptions,
    semaphore: Arc<Semaphore>,
}

impl BrowserManager {
    pub fn new(options: BrowserOptions) -> Self {
        let permits = options.max_concurrent_sessions.max(1);
        Self {
            options,
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    /// Opens a browser session on `url`, runs the settle sequence and returns
    /// the serialized DOM with the navigation time.
    pub async fn open(&self, url: &str, profile: &DeviceProfile) -> Result<RenderedPage> {
        if let Some(path) = &self.options.mock_html {
            return self.mock_render(url, path).await;
        }

        let started = Instant::now();
        log::info!(
            "Launching headless browser for {} ({}, nav {}s)",
            url,
            profile.script_arg(),
            self.options.navigation_timeout.as_secs()
        );
        let output = self.run_render(url, profile, RenderMode::Dom).await?;
        let payload = parse_payload(&output)?;

        let html = payload.html.ok_or_else(|| {
            PageScopeError::render("Playwright returned ok status but no DOM".to_string())
        })?;
        let load_time = Duration::from_millis(payload.load_time_ms.unwrap_or_default());
        log::info!(
            "Render of {} finished in {:.1}s (navigation {:.2}s, {} bytes of DOM)",
            url,
            started.elapsed().as_secs_f32(),
            load_time.as_secs_f64(),
            html.len()
        );

        Ok(RenderedPage {
            final_url: payload.url.unwrap_or_else(|| url.to_string()),
            html,
            load_time,
        })
    }

    /// Loads `url` under the mobile device profile. Any successful load counts
    /// as mobile friendly; any failure does not.
    pub async fn probe_mobile(&self, url: &str) -> bool {
        if self.options.mock_html.is_some() {
            return true;
        }

        let profile = DeviceProfile::mobile(self.options.mobile_device.clone());
        let result = match self.run_render(url, &profile, RenderMode::Probe).await {
            Ok(output) => parse_payload(&output).map(|_| ()),
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Mobile render of {} failed: {}", url, err);
                false
            }
        }
    }

    /// Saves a full-page PNG of `url` to `path`.
    pub async fn capture_screenshot(&self, url: &str, path: &Path, delay: Duration) -> Result<()> {
        if self.options.mock_html.is_some() {
            return Err(PageScopeError::render(
                "Screenshot capture is unavailable with mock rendering",
            ));
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut cmd = Command::new(&self.options.node_command);
        cmd.arg("-e")
            .arg(SCREENSHOT_SCRIPT)
            .arg(url)
            .arg(self.options.viewport.to_string())
            .arg(self.options.navigation_timeout.as_millis().to_string())
            .arg(delay.as_millis().to_string())
            .arg(headless_flag(self.options.headless))
            .arg(path.to_string_lossy().to_string());

        let output = self.run_helper(cmd).await?;
        parse_payload(&output).map(|_| ())
    }

    async fn run_render(
        &self,
        url: &str,
        profile: &DeviceProfile,
        mode: RenderMode,
    ) -> Result<HelperOutput> {
        let (settle, scroll_settle) = match mode {
            RenderMode::Dom => (self.options.settle, self.options.scroll_settle),
            RenderMode::Probe => (self.options.mobile_settle, Duration::ZERO),
        };

        let mut cmd = Command::new(&self.options.node_command);
        cmd.arg("-e")
            .arg(RENDER_SCRIPT)
            .arg(url)
            .arg(profile.script_arg())
            .arg(self.options.navigation_timeout.as_millis().to_string())
            .arg(settle.as_millis().to_string())
            .arg(scroll_settle.as_millis().to_string())
            .arg(headless_flag(self.options.headless))
            .arg(mode.as_arg());

        self.run_helper(cmd).await
    }

    async fn run_helper(&self, cmd: Command) -> Result<HelperOutput> {
        // Fail fast if Node is missing to avoid spawning Playwright unnecessarily.
        ensure_node_available(&self.options.node_command).await?;
        ensure_playwright_available(&self.options.node_command).await?;

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| PageScopeError::render("Browser manager unavailable"))?;

        let process = BrowserProcess::spawn(cmd, &self.options.node_command)?;
        process.wait_with_output(self.options.process_timeout).await
    }

    async fn mock_render(&self, url: &str, path: &Path) -> Result<RenderedPage> {
        log::debug!("Serving mock DOM from {} for {}", path.display(), url);
        let html = tokio::fs::read_to_string(path).await.map_err(|e| {
            PageScopeError::render(format!("Failed to read mock HTML {}: {}", path.display(), e))
        })?;
        Ok(RenderedPage {
            final_url: url.to_string(),
            html,
            load_time: Duration::ZERO,
        })
    }
}

impl PageRenderer for BrowserManager {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        let profile = DeviceProfile::Desktop(self.options.viewport);
        self.open(url, &profile).await
    }

    async fn probe_mobile(&self, url: &str) -> bool {
        BrowserManager::probe_mobile(self, url).await
    }
}

fn headless_flag(headless: bool) -> &'static str {
    if headless {
        "1"
    } else {
        "0"
    }
}

fn parse_payload(output: &HelperOutput) -> Result<ScriptResult> {
    if !output.status.success() {
        return Err(map_playwright_error(
            output.status.to_string(),
            &output.stderr,
        ));
    }

    let payload: ScriptResult = serde_json::from_str(output.stdout.trim()).map_err(|e| {
        PageScopeError::render(format!(
            "Failed to parse Playwright output: {} - raw: {}",
            e,
            truncate(output.stdout.trim(), 200)
        ))
    })?;

    if payload.status != "ok" {
        let detail = payload
            .message
            .clone()
            .unwrap_or_else(|| "no additional details".to_string());
        return Err(map_playwright_status_error(&payload.status, detail));
    }

    Ok(payload)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
