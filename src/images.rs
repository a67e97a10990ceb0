//! Image discovery and resolution-variant deduplication.
//!
//! References come from `img`/`source` attributes (`src`, `data-src`,
//! `data-original`, `srcset`) and from `url(...)` inside inline `style`
//! attributes. Variants such as `hero-300x200.jpg` and `hero-1024x683.jpg`
//! share the logical name `hero`; only the widest one is reported.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

use crate::extract::static_selector;

/// Attributes scanned on every `img` and `source` element, in this order.
pub const IMAGE_ATTRIBUTES: [&str; 4] = ["src", "data-src", "data-original", "srcset"];

static IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("img, source"));
static STYLED_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("[style]"));

static SIZE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| static_regex(r"-\d+x\d+$"));
static SIZE_TOKEN: LazyLock<Regex> = LazyLock::new(|| static_regex(r"-(\d+)x\d+"));
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| static_regex(r#"url\(['"]?(.*?)['"]?\)"#));

fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex '{}': {}. This is a programming error.",
            pattern, e
        )
    })
}

/// One resolved image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// File stem with any trailing `-{W}x{H}` removed.
    pub name: String,
    pub url: String,
    /// Width taken from the first `-{W}x{H}` in the URL, 0 when absent.
    pub resolution: u64,
}

impl ImageCandidate {
    pub fn new(url: &Url) -> Self {
        Self {
            name: logical_name(url),
            url: url.to_string(),
            resolution: inferred_resolution(url.as_str()),
        }
    }
}

/// File name of the URL path without extension and without a trailing
/// `-{digits}x{digits}` size suffix.
pub fn logical_name(url: &Url) -> String {
    let path = url.path();
    let file = path.rsplit('/').next().unwrap_or(path);
    SIZE_SUFFIX.replace(strip_extension(file), "").into_owned()
}

/// `W` from the first `-{W}x{H}` anywhere in the URL; 0 when there is none.
/// Widths too large for `u64` saturate to `u64::MAX`, so two such variants
/// of one image tie and the first one seen is kept.
pub fn inferred_resolution(url: &str) -> u64 {
    SIZE_TOKEN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|width| width.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Drops the last `.ext`, ignoring leading dots (`.hidden` has no extension).
fn strip_extension(file: &str) -> &str {
    let leading = file.len() - file.trim_start_matches('.').len();
    match file[leading..].rfind('.') {
        Some(idx) => &file[..leading + idx],
        None => file,
    }
}

/// Logical-name-keyed table that remembers first-insertion order.
#[derive(Debug, Default)]
struct CandidateTable {
    entries: Vec<ImageCandidate>,
    positions: HashMap<String, usize>,
}

impl CandidateTable {
    /// Keeps the candidate only if its name is new or it is strictly wider
    /// than the current holder; a replacement keeps the original slot.
    fn offer(&mut self, candidate: ImageCandidate) {
        match self.positions.get(&candidate.name) {
            Some(&idx) => {
                if candidate.resolution > self.entries[idx].resolution {
                    self.entries[idx] = candidate;
                }
            }
            None => {
                self.positions
                    .insert(candidate.name.clone(), self.entries.len());
                self.entries.push(candidate);
            }
        }
    }

    fn into_urls(self) -> Vec<String> {
        self.entries.into_iter().map(|c| c.url).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    excluded_pattern: String,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new("inita_CP.png")
    }
}

impl ImageResolver {
    /// References containing `excluded_pattern` are dropped. An empty pattern
    /// disables the exclusion.
    pub fn new(excluded_pattern: impl Into<String>) -> Self {
        Self {
            excluded_pattern: excluded_pattern.into(),
        }
    }

    pub fn resolve_html(&self, html: &str, base: &Url) -> Vec<String> {
        self.resolve(&Html::parse_document(html), base)
    }

    /// Best-resolution URL per logical image, in order of first appearance.
    pub fn resolve(&self, document: &Html, base: &Url) -> Vec<String> {
        let mut table = CandidateTable::default();
        for reference in raw_references(document) {
            if self.is_excluded(&reference) {
                log::debug!("Skipping excluded image reference {}", reference);
                continue;
            }
            match base.join(&reference) {
                Ok(url) => table.offer(ImageCandidate::new(&url)),
                Err(e) => log::debug!("Skipping unresolvable image '{}': {}", reference, e),
            }
        }
        let urls = table.into_urls();
        log::debug!("Resolved {} distinct images", urls.len());
        urls
    }

    fn is_excluded(&self, reference: &str) -> bool {
        !self.excluded_pattern.is_empty() && reference.contains(&self.excluded_pattern)
    }
}

/// Raw references in scan order: element attributes first (document order,
/// then attribute order), then inline style `url(...)` values.
fn raw_references(document: &Html) -> Vec<String> {
    let mut references = Vec::new();

    for element in document.select(&IMAGE_SELECTOR) {
        for attr in IMAGE_ATTRIBUTES {
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            if attr == "srcset" {
                references.extend(
                    value
                        .split(',')
                        .filter_map(|entry| entry.split_whitespace().next())
                        .map(str::to_string),
                );
            } else if let Some(token) = value.split_whitespace().next() {
                references.push(token.to_string());
            }
        }
    }

    for element in document.select(&STYLED_SELECTOR) {
        let Some(style) = element.value().attr("style") else {
            continue;
        };
        references.extend(
            CSS_URL
                .captures_iter(style)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|reference| !reference.is_empty()),
        );
    }

    references
}
