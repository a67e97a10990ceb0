//! Sitemap discovery.
//!
//! Candidates are tried in a fixed order: `{origin}/sitemap.xml`, then every
//! `Sitemap:` line of `{origin}/robots.txt` in file order. The first candidate
//! answering 200 wins. Transport errors and other statuses skip to the next one.

use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;

/// Reported instead of the body when it is longer than the inline limit.
pub const SITEMAP_PRESENT: &str = "Sitemap is present and of good quality";

/// Reported when no candidate answered 200.
pub const SITEMAP_NOT_FOUND: &str = "Sitemap not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapResult {
    /// Raw body, at most the inline limit in characters.
    Content(String),
    /// Found, but too large to inline.
    Present,
    NotFound,
}

impl SitemapResult {
    pub fn into_report_value(self) -> String {
        match self {
            SitemapResult::Content(body) => body,
            SitemapResult::Present => SITEMAP_PRESENT.to_string(),
            SitemapResult::NotFound => SITEMAP_NOT_FOUND.to_string(),
        }
    }
}

impl fmt::Display for SitemapResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SitemapResult::Content(body) => {
                write!(f, "inline sitemap ({} chars)", body.chars().count())
            }
            SitemapResult::Present => f.write_str(SITEMAP_PRESENT),
            SitemapResult::NotFound => f.write_str(SITEMAP_NOT_FOUND),
        }
    }
}

/// `scheme://host[:port]` of a page URL, or `None` for host-less URLs.
pub fn site_origin(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Values of `Sitemap:` directives (prefix matched case-insensitively at the
/// start of the line), trimmed, in file order. Empty values are dropped.
pub fn robots_sitemaps(robots: &str) -> Vec<String> {
    robots
        .split('\n')
        .filter(|line| {
            line.get(..8)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("sitemap:"))
        })
        .filter_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct SitemapLocator {
    client: Client,
    timeout: Duration,
    max_inline_len: usize,
}

impl SitemapLocator {
    pub fn new(client: Client, timeout: Duration, max_inline_len: usize) -> Self {
        Self {
            client,
            timeout,
            max_inline_len,
        }
    }

    pub async fn locate(&self, page_url: &Url) -> SitemapResult {
        let Some(origin) = site_origin(page_url) else {
            log::debug!("{} has no host; skipping sitemap lookup", page_url);
            return SitemapResult::NotFound;
        };

        for candidate in self.candidates(&origin).await {
            match self.fetch_candidate(&candidate).await {
                Ok(Some(result)) => {
                    log::debug!("Sitemap found at {}: {}", candidate, result);
                    return result;
                }
                Ok(None) => {}
                Err(err) => log::debug!("Sitemap candidate skipped: {}", err),
            }
        }
        SitemapResult::NotFound
    }

    /// Default sitemap URL followed by any robots.txt declarations.
    pub async fn candidates(&self, origin: &str) -> Vec<String> {
        let mut candidates = vec![format!("{}/sitemap.xml", origin)];
        match self.fetch_robots(origin).await {
            Ok(Some(robots)) => candidates.extend(robots_sitemaps(&robots)),
            Ok(None) => {}
            Err(err) => log::debug!("robots.txt unavailable: {}", err),
        }
        candidates
    }

    async fn fetch_robots(&self, origin: &str) -> Result<Option<String>, TransportError> {
        let url = format!("{}/robots.txt", origin);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;
        if response.status() != StatusCode::OK {
            log::debug!("{} answered {}", url, response.status());
            return Ok(None);
        }
        response
            .text()
            .await
            .map(Some)
            .map_err(|source| TransportError::Request { url, source })
    }

    /// `Ok(None)` for a non-200 answer. Bodies are read only until they are
    /// known to exceed the inline limit.
    async fn fetch_candidate(&self, url: &str) -> Result<Option<SitemapResult>, TransportError> {
        let transport = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;
        if response.status() != StatusCode::OK {
            log::debug!("Sitemap candidate {} answered {}", url, response.status());
            return Ok(None);
        }

        // Every char is at most 4 bytes, so past this many bytes the body is
        // certainly over the character limit.
        let byte_cap = self.max_inline_len.saturating_mul(4);
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            body.extend_from_slice(&chunk);
            if body.len() > byte_cap {
                return Ok(Some(SitemapResult::Present));
            }
        }

        let text = String::from_utf8_lossy(&body);
        if text.chars().count() > self.max_inline_len {
            Ok(Some(SitemapResult::Present))
        } else {
            Ok(Some(SitemapResult::Content(text.into_owned())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> SitemapLocator {
        SitemapLocator::new(Client::new(), Duration::from_secs(10), 3000)
    }

    #[test]
    fn origin_keeps_explicit_port_only() {
        let url = Url::parse("https://user:pw@example.test:8443/a/b?q=1").unwrap();
        assert_eq!(site_origin(&url).as_deref(), Some("https://example.test:8443"));

        let url = Url::parse("http://example.test:80/").unwrap();
        assert_eq!(site_origin(&url).as_deref(), Some("http://example.test"));

        let url = Url::parse("file:///tmp/page.html").unwrap();
        assert_eq!(site_origin(&url), None);
    }

    #[test]
    fn robots_directives_are_case_insensitive_and_ordered() {
        let robots = "User-agent: *\r\n\
                      Disallow: /private\r\n\
                      SITEMAP:  https://example.test/a.xml \r\n\
                      # Sitemap: https://example.test/commented.xml\n \
                      Sitemap: https://example.test/indented.xml\n\
                      sitemap:https://example.test/b.xml\n\
                      Sitemap:\n";
        assert_eq!(
            robots_sitemaps(robots),
            vec!["https://example.test/a.xml", "https://example.test/b.xml"]
        );
    }

    #[test]
    fn report_values_use_sentinels() {
        assert_eq!(
            SitemapResult::Present.into_report_value(),
            "Sitemap is present and of good quality"
        );
        assert_eq!(
            SitemapResult::NotFound.into_report_value(),
            "Sitemap not found"
        );
        assert_eq!(
            SitemapResult::Content("<urlset/>".into()).into_report_value(),
            "<urlset/>"
        );
    }

    #[tokio::test]
    async fn falls_back_to_robots_declarations_in_order() {
        let mut server = mockito::Server::new_async().await;
        let default = server
            .mock("GET", "/sitemap.xml")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let robots = format!(
            "Sitemap: {0}/broken.xml\nSitemap: {0}/first.xml\nSitemap: {0}/second.xml\n",
            server.url()
        );
        server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body(robots)
            .create_async()
            .await;
        server
            .mock("GET", "/broken.xml")
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("GET", "/first.xml")
            .with_status(200)
            .with_body("<urlset>first</urlset>")
            .create_async()
            .await;
        let second = server
            .mock("GET", "/second.xml")
            .with_status(200)
            .with_body("<urlset>second</urlset>")
            .expect(0)
            .create_async()
            .await;

        let page = Url::parse(&format!("{}/blog/post", server.url())).unwrap();
        let result = locator().locate(&page).await;

        assert_eq!(result, SitemapResult::Content("<urlset>first</urlset>".into()));
        default.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn body_of_exactly_the_limit_is_inlined() {
        let mut server = mockito::Server::new_async().await;
        let body = "x".repeat(3000);
        server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let page = Url::parse(&server.url()).unwrap();
        assert_eq!(locator().locate(&page).await, SitemapResult::Content(body));
    }

    #[tokio::test]
    async fn body_one_over_the_limit_is_reported_present() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_body("x".repeat(3001))
            .create_async()
            .await;

        let page = Url::parse(&server.url()).unwrap();
        let result = locator().locate(&page).await;
        assert_eq!(result, SitemapResult::Present);
        assert_eq!(result.into_report_value(), SITEMAP_PRESENT);
    }

    #[tokio::test]
    async fn limit_counts_characters_not_bytes() {
        let mut server = mockito::Server::new_async().await;
        let body = "é".repeat(3000);
        server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let page = Url::parse(&server.url()).unwrap();
        assert_eq!(locator().locate(&page).await, SitemapResult::Content(body));
    }

    #[tokio::test]
    async fn missing_everything_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/sitemap.xml")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/robots.txt")
            .with_status(404)
            .with_body("Sitemap: http://127.0.0.1:1/never.xml")
            .create_async()
            .await;

        let page = Url::parse(&server.url()).unwrap();
        assert_eq!(locator().locate(&page).await, SitemapResult::NotFound);
    }

    #[tokio::test]
    async fn unreachable_site_is_not_found() {
        let page = Url::parse("http://127.0.0.1:1/").unwrap();
        assert_eq!(locator().locate(&page).await, SitemapResult::NotFound);
    }
}
