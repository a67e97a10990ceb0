//! Request handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::types::{AppState, ParseRequest};
use crate::output::{HttpError, ParseResponse};

/// Analyzes the page named in the JSON body.
pub async fn parse_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(url) = ParseRequest::url_from_body(&body) else {
        log::info!("POST /parse rejected: no URL");
        return error_response(StatusCode::BAD_REQUEST, "URL not provided");
    };

    log::info!("POST /parse {}", url);
    let report = match state.analyzer.analyze(&url).await {
        Ok(report) => report,
        Err(err) => {
            log::error!("Analysis of {} failed: {}", url, err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string());
        }
    };

    let screenshot_url = if state.capture_local {
        capture_screenshot(&state, &headers, &url).await
    } else {
        None
    };

    (
        StatusCode::OK,
        Json(ParseResponse {
            report,
            screenshot_url,
        }),
    )
        .into_response()
}

/// Serves a previously captured screenshot.
pub async fn screenshot_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    if !is_plain_file_name(&filename) {
        log::warn!("Rejected screenshot path {:?}", filename);
        return error_response(StatusCode::NOT_FOUND, "Screenshot not found");
    }

    let path = state.screenshots_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(&filename))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            log::debug!("Screenshot {} unavailable: {}", path.display(), e);
            error_response(StatusCode::NOT_FOUND, "Screenshot not found")
        }
    }
}

pub async fn health_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// Failures are logged and yield `None`; they never fail the request.
async fn capture_screenshot(state: &AppState, headers: &HeaderMap, url: &str) -> Option<String> {
    let filename = format!("{}.png", Uuid::new_v4());
    let path = state.screenshots_dir.join(&filename);

    match state
        .analyzer
        .renderer()
        .capture_screenshot(url, &path, state.screenshot_delay)
        .await
    {
        Ok(()) => Some(screenshot_link(
            state.public_url.as_deref(),
            headers,
            &filename,
        )),
        Err(err) => {
            log::warn!("Screenshot capture for {} failed: {}", url, err);
            None
        }
    }
}

/// Link to a served screenshot. The configured public URL wins; otherwise
/// the client's `Host` header is trusted and the scheme is assumed `http`.
fn screenshot_link(public_url: Option<&Url>, headers: &HeaderMap, filename: &str) -> String {
    if let Some(base) = public_url {
        let mut link = base.clone();
        let prefix = base.path().trim_end_matches('/');
        link.set_path(&format!("{prefix}/screenshots/{filename}"));
        link.set_query(None);
        return link.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}/screenshots/{}", host, filename)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(HttpError {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// A single path component: no separators, no dot entries.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
