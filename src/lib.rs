//! PageScope Library
//!
//! Renders a single web page in headless Chromium and reports what it finds:
//! visible text, the best-resolution variant of each image, the sitemap,
//! broken outbound links, meta tags, load time and basic SSL/mobile signals.
//!
//! # Module Overview
//!
//! - [`browser`] - Headless rendering through a Playwright helper process
//! - [`images`] - Image discovery and resolution-variant deduplication
//! - [`links`] - Outbound link validation
//! - [`sitemap`] - Sitemap discovery via `sitemap.xml` and `robots.txt`
//! - [`analyzer`] - The end-to-end page analysis
//! - [`server`] - HTTP front end
//! - [`config`] - Configuration file support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use pagescope_lib::{BrowserManager, BrowserOptions, Config, PageAnalyzer};
//!
//! # async fn example() -> pagescope_lib::Result<()> {
//! let config = Config::default();
//! let manager = BrowserManager::new(BrowserOptions::from(&config));
//! let analyzer = PageAnalyzer::new(manager, &config)?;
//!
//! let report = analyzer.analyze("https://example.com").await?;
//! println!("{} images, {} broken links", report.images.len(), report.broken_links.len());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod images;
pub mod links;
pub mod logging;
pub mod output;
pub mod screenshot;
pub mod server;
pub mod sitemap;
pub mod types;
pub mod viewport;

pub use analyzer::PageAnalyzer;
pub use browser::{
    BrowserManager, BrowserOptions, PageRenderer, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_PROCESS_TIMEOUT,
};
pub use config::Config;
pub use error::{ErrorCategory, ErrorPayload, PageScopeError, Result, TransportError};
pub use images::{ImageCandidate, ImageResolver};
pub use links::{LinkCheckOutcome, LinkValidator};
pub use output::{
    AnalyzeOutput, ErrorOutput, HttpError, PageScopeOutput, ParseResponse,
    PAGESCOPE_OUTPUT_VERSION,
};
pub use screenshot::ScreenshotLink;
pub use sitemap::{SitemapLocator, SitemapResult, SITEMAP_NOT_FOUND, SITEMAP_PRESENT};
pub use types::{RenderedPage, Report};
pub use viewport::{DeviceProfile, Viewport};
