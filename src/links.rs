//! Outbound link validation.
//!
//! Every `<a href>` is resolved against the page URL and probed with a HEAD
//! request (redirects followed). A link is broken when the probe fails at the
//! transport level or answers with a status of 400 or above. Each probe is
//! independent: one failure never stops the others.

use futures::{stream, StreamExt};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;
use crate::extract::static_selector;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("a[href]"));

/// Result of probing one link.
#[derive(Debug)]
pub struct LinkCheckOutcome {
    pub url: String,
    pub result: Result<StatusCode, TransportError>,
}

impl LinkCheckOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(&self.result, Ok(status) if status.as_u16() < 400)
    }
}

/// Absolute targets of every anchor with a non-empty `href`, in DOM order.
/// Duplicates are kept. An `href` that cannot be resolved is returned as-is
/// so that its probe reports it as broken.
pub fn anchor_targets(document: &Html, base: &Url) -> Vec<String> {
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| match base.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => href.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct LinkValidator {
    client: Client,
    timeout: Duration,
    concurrency: usize,
}

impl LinkValidator {
    pub fn new(client: Client, timeout: Duration, concurrency: usize) -> Self {
        Self {
            client,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Broken link URLs of a rendered page, in anchor order.
    pub async fn validate(&self, html: &str, base: &Url) -> Vec<String> {
        let targets = {
            let document = Html::parse_document(html);
            anchor_targets(&document, base)
        };
        let outcomes = self.check_all(targets).await;
        broken_links(&outcomes)
    }

    /// Probes every URL with at most `concurrency` requests in flight.
    /// Outcomes come back in input order.
    pub async fn check_all(&self, urls: Vec<String>) -> Vec<LinkCheckOutcome> {
        log::debug!(
            "Checking {} links ({} concurrent, {:?} timeout)",
            urls.len(),
            self.concurrency,
            self.timeout
        );
        stream::iter(urls)
            .map(|url| self.check(url))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    pub async fn check(&self, url: String) -> LinkCheckOutcome {
        let result = match Url::parse(&url) {
            Ok(parsed) => self
                .client
                .head(parsed)
                .timeout(self.timeout)
                .send()
                .await
                .map(|response| response.status())
                .map_err(|source| TransportError::Request {
                    url: url.clone(),
                    source,
                }),
            Err(e) => Err(TransportError::Unresolvable {
                reference: url.clone(),
                message: e.to_string(),
            }),
        };

        match &result {
            Ok(status) if status.as_u16() >= 400 => {
                log::debug!("Broken link {} ({})", url, status)
            }
            Ok(_) => {}
            Err(err) => log::debug!("Broken link {}: {}", url, err),
        }

        LinkCheckOutcome { url, result }
    }
}

/// URLs of the outcomes that are not reachable, preserving order.
pub fn broken_links(outcomes: &[LinkCheckOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter(|outcome| !outcome.is_reachable())
        .map(|outcome| outcome.url.clone())
        .collect()
}
