use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageScopeError {
    #[error("Render error: {0}")]
    Render(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PageScopeError {
    pub fn render(message: impl Into<String>) -> Self {
        PageScopeError::Render(message.into())
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        PageScopeError::Analysis(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            PageScopeError::Render(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("playwright npm package is missing") {
                    ErrorPayload::new(
                        ErrorCategory::Render,
                        msg.to_string(),
                        "Install Playwright (e.g., `npm install playwright` and `npx playwright install chromium`).",
                    )
                } else if lower.contains("chromium executable")
                    || lower.contains("executable doesn't exist")
                {
                    ErrorPayload::new(
                        ErrorCategory::Render,
                        msg.to_string(),
                        "Run `npx playwright install chromium` to download the browser.",
                    )
                } else if lower.contains("not found on path") || lower.contains("node command") {
                    ErrorPayload::new(
                        ErrorCategory::Render,
                        msg.to_string(),
                        "Install Node.js and ensure the node binary is on PATH (or set browser.node_command).",
                    )
                } else if lower.contains("timeout") || lower.contains("timed out") {
                    ErrorPayload::new(
                        ErrorCategory::Render,
                        msg.to_string(),
                        "The page did not finish loading in time; try --nav-timeout/--process-timeout or check the URL.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Render,
                        msg.to_string(),
                        "Verify the URL is reachable and includes http(s)://.",
                    )
                }
            }
            PageScopeError::Analysis(msg) => ErrorPayload::new(
                ErrorCategory::Analysis,
                msg.to_string(),
                "Re-run with --verbose for details.",
            ),
            PageScopeError::InvalidRequest(msg) => ErrorPayload::new(
                ErrorCategory::Request,
                msg.to_string(),
                "Provide a non-empty page URL (e.g., https://example.com).",
            ),
            PageScopeError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            PageScopeError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            PageScopeError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check flags (e.g., --viewport WIDTHxHEIGHT) and the config file.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, PageScopeError>;

/// Failure of a single outbound fetch (robots.txt, sitemap candidate, link check).
///
/// Never escapes the component that produced it; callers turn it into a skip
/// or a "broken" classification.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot resolve '{reference}': {message}")]
    Unresolvable { reference: String, message: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Render,
    Analysis,
    Request,
    Config,
    Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_payload_includes_playwright_remediation() {
        let err = PageScopeError::render(
            "Playwright npm package is missing; install with `npm install playwright`.",
        );
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Render);
        let remediation = payload.remediation.unwrap_or_default();
        assert!(
            remediation.contains("npm install playwright"),
            "expected remediation to mention npm install playwright, got: {remediation}"
        );
    }

    #[test]
    fn render_payload_includes_timeout_hint() {
        let err = PageScopeError::render(
            "Playwright error (status error): Timeout 30000ms exceeded navigating to https://example.com",
        );
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("--nav-timeout"),
            "expected timeout remediation, got: {remediation}"
        );
    }

    #[test]
    fn render_payload_includes_node_hint() {
        let err = PageScopeError::render(
            "Unable to spawn Playwright helper; 'node' was not found on PATH",
        );
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("Node.js"),
            "expected node install remediation, got: {remediation}"
        );
    }

    #[test]
    fn render_payload_falls_back_to_url_hint() {
        let err = PageScopeError::render("net::ERR_NAME_NOT_RESOLVED at http://nope.invalid");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(remediation.contains("http(s)://"));
    }

    #[test]
    fn analysis_payload_uses_analysis_category() {
        let payload = PageScopeError::analysis("bad base url").to_payload();
        assert_eq!(payload.category, ErrorCategory::Analysis);
        assert_eq!(payload.message, "bad base url");
    }

    #[test]
    fn invalid_request_payload_serializes_lowercase_category() {
        let payload = PageScopeError::InvalidRequest("URL not provided".into()).to_payload();
        let json = serde_json::to_string(&payload).expect("serialize payload");
        assert!(json.contains("\"category\":\"request\""));
        assert!(json.contains("\"remediation\""));
    }

    #[test]
    fn unresolvable_transport_error_mentions_reference() {
        let err = TransportError::Unresolvable {
            reference: "http://[::1".into(),
            message: "invalid IPv6 address".into(),
        };
        assert!(err.to_string().contains("http://[::1"));
    }
}
