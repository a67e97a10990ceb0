//! Page analysis orchestration.
//!
//! One render produces the DOM that text, meta tags, images and links are read
//! from. The mobile probe, link checks and sitemap lookup then run
//! concurrently since none depends on another.

use reqwest::Client;
use scraper::Html;
use std::time::Instant;
use url::Url;

use crate::browser::PageRenderer;
use crate::config::Config;
use crate::extract::{meta_tags, visible_text};
use crate::images::ImageResolver;
use crate::links::{anchor_targets, broken_links, LinkValidator};
use crate::screenshot::ScreenshotLink;
use crate::sitemap::SitemapLocator;
use crate::types::Report;
use crate::{PageScopeError, Result};

const USER_AGENT: &str = concat!("pagescope/", env!("CARGO_PKG_VERSION"));

pub struct PageAnalyzer<R> {
    renderer: R,
    images: ImageResolver,
    links: LinkValidator,
    sitemap: SitemapLocator,
    screenshot: ScreenshotLink,
}

impl<R: PageRenderer> PageAnalyzer<R> {
    pub fn new(renderer: R, config: &Config) -> Result<Self> {
        // Redirects are followed by reqwest's default policy.
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            renderer,
            images: ImageResolver::new(config.images.excluded_pattern.clone()),
            links: LinkValidator::new(
                client.clone(),
                config.timeouts.link_check,
                config.links.concurrency,
            ),
            sitemap: SitemapLocator::new(
                client,
                config.timeouts.sitemap,
                config.sitemap.max_inline_len,
            ),
            screenshot: ScreenshotLink::from_config(&config.screenshot)?,
        })
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Renders `url` and builds its [`Report`].
    ///
    /// Render failures come back unchanged (normally [`PageScopeError::Render`]).
    /// Unreachable links and sitemap candidates never fail the analysis.
    pub async fn analyze(&self, url: &str) -> Result<Report> {
        if url.trim().is_empty() {
            return Err(PageScopeError::InvalidRequest(
                "URL not provided".to_string(),
            ));
        }

        let started = Instant::now();
        let page = self.renderer.render(url).await?;

        let base = Url::parse(url).map_err(|e| {
            PageScopeError::analysis(format!(
                "Cannot resolve references against '{}': {}",
                url, e
            ))
        })?;

        // `Html` is not Send; it must be gone before the first await below.
        let (text, meta_tags, images, anchors) = {
            let document = Html::parse_document(&page.html);
            (
                visible_text(&document),
                meta_tags(&document),
                self.images.resolve(&document, &base),
                anchor_targets(&document, &base),
            )
        };
        log::debug!(
            "Extracted {} chars of text, {} meta tags, {} images, {} links from {}",
            text.len(),
            meta_tags.len(),
            images.len(),
            anchors.len(),
            page.final_url
        );

        let (mobile_friendly, outcomes, sitemap) = tokio::join!(
            self.renderer.probe_mobile(url),
            self.links.check_all(anchors),
            self.sitemap.locate(&base),
        );

        let report = Report {
            text,
            images,
            sitemap: sitemap.into_report_value(),
            screenshot: self.screenshot.for_page(url),
            page_load_time: page.load_time.as_secs_f64(),
            meta_tags,
            ssl: base.scheme() == "https",
            mobile_friendly,
            broken_links: broken_links(&outcomes),
        };

        log::info!(
            "Analyzed {} in {:.1}s: {} images, {} of {} links broken, mobile friendly: {}",
            url,
            started.elapsed().as_secs_f32(),
            report.images.len(),
            report.broken_links.len(),
            outcomes.len(),
            report.mobile_friendly
        );
        Ok(report)
    }
}
