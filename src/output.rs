use crate::error::ErrorPayload;
use crate::types::Report;
use serde::{Deserialize, Serialize};

/// Schema version for CLI output payloads.
pub const PAGESCOPE_OUTPUT_VERSION: &str = "0.1.0";

/// Top-level CLI payload, tagged by `mode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PageScopeOutput {
    Analyze(AnalyzeOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    pub version: String,
    pub url: String,
    /// Report fields keep their wire names at the top level.
    #[serde(flatten)]
    pub report: Report,
}

impl AnalyzeOutput {
    pub fn new(url: impl Into<String>, report: Report) -> Self {
        Self {
            version: PAGESCOPE_OUTPUT_VERSION.to_string(),
            url: url.into(),
            report,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

impl ErrorOutput {
    pub fn from_payload(error: ErrorPayload) -> Self {
        Self {
            version: PAGESCOPE_OUTPUT_VERSION.to_string(),
            message: Some(error.message.clone()),
            error,
        }
    }
}

/// Body of a successful `POST /parse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    #[serde(flatten)]
    pub report: Report,
    /// Locally served screenshot, when one was captured.
    pub screenshot_url: Option<String>,
}

/// Body of a failed HTTP request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpError {
    pub error: String,
}
