use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything learned about one page. Built once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Visible text, whitespace-normalized.
    pub text: String,
    /// Highest-resolution URL per logical image, in first-seen order.
    pub images: Vec<String>,
    /// Raw sitemap body or one of the sitemap sentinels.
    pub sitemap: String,
    /// Screenshot collaborator URL.
    pub screenshot: String,
    /// Navigation time in seconds.
    pub page_load_time: f64,
    pub meta_tags: BTreeMap<String, String>,
    /// True when the URL scheme is `https`. No certificate check is made.
    pub ssl: bool,
    pub mobile_friendly: bool,
    pub broken_links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let report = Report {
            text: "Hello".into(),
            images: vec!["https://example.test/a.jpg".into()],
            sitemap: "Sitemap not found".into(),
            screenshot: "https://shots.test/?url=x".into(),
            page_load_time: 1.25,
            meta_tags: BTreeMap::from([("og:title".to_string(), "Hi".to_string())]),
            ssl: true,
            mobile_friendly: false,
            broken_links: vec![],
        };

        let json = serde_json::to_value(&report).expect("serialize report");
        for key in [
            "text",
            "images",
            "sitemap",
            "screenshot",
            "page_load_time",
            "meta_tags",
            "ssl",
            "mobile_friendly",
            "broken_links",
        ] {
            assert!(json.get(key).is_some(), "missing field {key} in {json}");
        }
        assert_eq!(json["page_load_time"], 1.25);
        assert_eq!(json["meta_tags"]["og:title"], "Hi");
    }
}
