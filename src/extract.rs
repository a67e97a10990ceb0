//! Text and meta-tag extraction from a rendered DOM.

use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Elements whose text is never part of the visible page text.
const HIDDEN_TEXT_TAGS: &[&str] = &["script", "style", "noscript"];

static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("meta"));

/// Parses a selector literal. A failure here is a programming error.
pub(crate) fn static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}': {}. This is a programming error.",
            css, e
        )
    })
}

/// Joins every non-blank text node outside `script`/`style`/`noscript`,
/// each trimmed, with single spaces.
pub fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TEXT_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

/// Collects `<meta>` tags keyed by `name`, or by `property` when there is no
/// `name`. Missing `content` maps to an empty string; later tags win.
pub fn meta_tags(document: &Html) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for element in document.select(&META_SELECTOR) {
        let attrs = element.value();
        let Some(key) = attrs.attr("name").or_else(|| attrs.attr("property")) else {
            continue;
        };
        let content = attrs.attr("content").unwrap_or_default();
        tags.insert(key.to_string(), content.to_string());
    }
    log::debug!("Extracted {} meta tags", tags.len());
    tags
}
