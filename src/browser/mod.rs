//! Browser automation module for headless page rendering.
//!
//! Pages are rendered by Chromium driven through a short-lived Playwright
//! helper (Node.js) process per session.
//!
//! # Module Structure
//!
//! - [`manager`] - Session management, settle sequence and concurrency control
//! - [`playwright`] - Helper scripts, error mapping and availability checks
//! - [`process`] - Scoped ownership of the helper process
//!
//! # Example
//!
//! ```no_run
//! use pagescope_lib::{BrowserManager, BrowserOptions, DeviceProfile};
//!
//! # async fn example() -> pagescope_lib::Result<()> {
//! let manager = BrowserManager::new(BrowserOptions::default());
//! let page = manager.open("https://example.com", &DeviceProfile::default()).await?;
//! println!("{} bytes of DOM in {:?}", page.html.len(), page.load_time);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use crate::types::RenderedPage;
use crate::Result;

mod manager;
mod playwright;
mod process;

pub use manager::{
    BrowserManager, BrowserOptions, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_PROCESS_TIMEOUT,
};

/// Something that can turn a URL into a rendered DOM.
///
/// [`BrowserManager`] is the production implementation; tests substitute
/// static renderers.
pub trait PageRenderer: Send + Sync {
    /// Desktop render with the settle sequence applied.
    fn render(&self, url: &str) -> impl Future<Output = Result<RenderedPage>> + Send;

    /// Whether the page loads under mobile emulation.
    fn probe_mobile(&self, url: &str) -> impl Future<Output = bool> + Send;
}
