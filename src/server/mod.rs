//! HTTP front end for page analysis.
//!
//! Endpoints:
//! - `POST /parse` - analyze the page named by `{"url": ...}`
//! - `GET /screenshots/:filename` - locally captured screenshots
//! - `GET /health` - liveness probe

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::{PageScopeError, Result};
use handlers::{health_handler, parse_handler, screenshot_handler};
pub use types::{AppState, ParseRequest};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/parse", post(parse_handler))
        .route("/screenshots/:filename", get(screenshot_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Binds `bind` and serves until the process is stopped.
pub async fn start_server(bind: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind).await.map_err(|e| {
        PageScopeError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to bind {}: {}", bind, e),
        ))
    })?;
    let local = listener.local_addr()?;

    log::info!("Listening on http://{}/", local);
    log::info!("  - Analyze: POST http://{}/parse", local);
    log::info!("  - Screenshots: http://{}/screenshots/<file>", local);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| {
            PageScopeError::Io(std::io::Error::new(
                e.kind(),
                format!("Server error: {}", e),
            ))
        })
}
