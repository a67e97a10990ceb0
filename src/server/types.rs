//! Shared state and request bodies for the HTTP service.

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::analyzer::PageAnalyzer;
use crate::browser::BrowserManager;
use crate::config::Config;
use crate::Result;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<PageAnalyzer<BrowserManager>>,
    pub screenshots_dir: Arc<PathBuf>,
    /// Capture a local full-page screenshot after each successful analysis.
    pub capture_local: bool,
    pub screenshot_delay: Duration,
    /// Base for local screenshot links; `None` falls back to the `Host` header.
    pub public_url: Option<Arc<Url>>,
}

impl AppState {
    pub fn new(analyzer: PageAnalyzer<BrowserManager>, config: &Config) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            screenshots_dir: Arc::new(config.server.screenshots_dir.clone()),
            capture_local: config.server.capture_local,
            screenshot_delay: Duration::from_secs(config.screenshot.delay_secs.into()),
            public_url: config
                .server
                .public_url
                .as_deref()
                .and_then(|raw| Url::parse(raw).ok())
                .map(Arc::new),
        }
    }

    /// Builds the production analyzer from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let manager = BrowserManager::new(config.into());
        let analyzer = PageAnalyzer::new(manager, config)?;
        Ok(Self::new(analyzer, config))
    }
}

/// JSON body of `POST /parse`
#[derive(Debug, Default, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl ParseRequest {
    /// The requested URL, if the body is JSON with a non-blank `url`.
    pub fn url_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ParseRequest>(body)
            .ok()
            .and_then(|request| request.url)
            .filter(|url| !url.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_from_body_requires_non_blank_url() {
        assert_eq!(
            ParseRequest::url_from_body(br#"{"url":"https://example.test"}"#).as_deref(),
            Some("https://example.test")
        );
        assert_eq!(ParseRequest::url_from_body(br#"{"url":""}"#), None);
        assert_eq!(ParseRequest::url_from_body(br#"{"url":"   "}"#), None);
        assert_eq!(ParseRequest::url_from_body(br#"{}"#), None);
        assert_eq!(ParseRequest::url_from_body(br#"{"url":null}"#), None);
        assert_eq!(ParseRequest::url_from_body(b"url=https://x.test"), None);
        assert_eq!(ParseRequest::url_from_body(b""), None);
    }
}
