use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{PageScopeError, Result, Viewport};

/// Env var holding the screenshot API access key.
pub const SCREENSHOT_KEY_ENV: &str = "PAGESCOPE_SCREENSHOT_ACCESS_KEY";

/// Env var pointing at an HTML file served instead of a real browser render.
pub const MOCK_HTML_ENV: &str = "PAGESCOPE_MOCK_HTML";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_viewport")]
    pub viewport: Viewport,
    pub timeouts: Timeouts,
    pub browser: BrowserConfig,
    pub links: LinkConfig,
    pub images: ImageConfig,
    pub sitemap: SitemapConfig,
    pub screenshot: ScreenshotConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    /// Pause right after navigation, before the scroll.
    #[serde(with = "humantime_serde")]
    pub settle: Duration,
    /// Pause after scrolling to the bottom so lazy content can populate.
    #[serde(with = "humantime_serde")]
    pub scroll_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub mobile_settle: Duration,
    /// Upper bound on a whole helper process run.
    #[serde(with = "humantime_serde")]
    pub process: Duration,
    #[serde(with = "humantime_serde")]
    pub link_check: Duration,
    #[serde(with = "humantime_serde")]
    pub sitemap: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            settle: Duration::from_secs(2),
            scroll_settle: Duration::from_secs(5),
            mobile_settle: Duration::from_secs(2),
            process: Duration::from_secs(60),
            link_check: Duration::from_secs(5),
            sitemap: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    pub node_command: String,
    pub headless: bool,
    pub mobile_device: String,
    pub max_sessions: usize,
    pub mock_html: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            headless: true,
            mobile_device: "Nexus 5".to_string(),
            max_sessions: 2,
            mock_html: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    pub concurrency: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    pub excluded_pattern: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            excluded_pattern: "inita_CP.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    /// Bodies longer than this many characters are reported by sentinel only.
    pub max_inline_len: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            max_inline_len: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenshotConfig {
    pub endpoint: String,
    pub access_key: Option<String>,
    pub full_page: bool,
    pub delay_secs: u32,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.apiflash.com/v1/urltoimage".to_string(),
            access_key: None,
            full_page: true,
            delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub screenshots_dir: PathBuf,
    pub capture_local: bool,
    /// Base URL clients reach the service at, used for local screenshot
    /// links. Without it links are built from the request's `Host` header.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5002".to_string(),
            screenshots_dir: PathBuf::from("screenshots"),
            capture_local: false,
            public_url: None,
        }
    }
}

fn deserialize_viewport<'de, D>(deserializer: D) -> std::result::Result<Viewport, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl Config {
    /// `$XDG_CONFIG_HOME/pagescope/config.toml` (or the platform equivalent).
    pub fn central_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pagescope").join("config.toml"))
    }

    /// Loads an explicit file, else the central config if it exists, else defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.is_file()),
        };

        let mut config = match source {
            Some(p) => {
                let raw = std::fs::read_to_string(&p).map_err(|e| {
                    PageScopeError::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                Self::from_toml(&raw).map_err(|e| match e {
                    PageScopeError::Config(msg) => {
                        PageScopeError::Config(format!("{} ({})", msg, p.display()))
                    }
                    other => other,
                })?
            }
            None => Config::default(),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| PageScopeError::Config(format!("Invalid config: {}", e)))
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(SCREENSHOT_KEY_ENV) {
            if !key.is_empty() {
                self.screenshot.access_key = Some(key);
            }
        }
        if let Ok(path) = std::env::var(MOCK_HTML_ENV) {
            if !path.is_empty() {
                self.browser.mock_html = Some(PathBuf::from(path));
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("navigation", self.timeouts.navigation),
            ("process", self.timeouts.process),
            ("link_check", self.timeouts.link_check),
            ("sitemap", self.timeouts.sitemap),
        ];
        for (name, value) in timeouts {
            if value.is_zero() {
                return Err(PageScopeError::Config(format!(
                    "timeouts.{name} must be greater than zero"
                )));
            }
        }
        if self.links.concurrency == 0 {
            return Err(PageScopeError::Config(
                "links.concurrency must be at least 1".to_string(),
            ));
        }
        if self.browser.node_command.trim().is_empty() {
            return Err(PageScopeError::Config(
                "browser.node_command cannot be empty".to_string(),
            ));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(PageScopeError::Config(
                "viewport dimensions must be positive".to_string(),
            ));
        }
        if let Some(public_url) = &self.server.public_url {
            let parsed = url::Url::parse(public_url).map_err(|e| {
                PageScopeError::Config(format!("server.public_url '{public_url}': {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
                return Err(PageScopeError::Config(format!(
                    "server.public_url '{public_url}' must be an http(s) base URL"
                )));
            }
        }
        Ok(())
    }
}
