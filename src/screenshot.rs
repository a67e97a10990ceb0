//! URL of the external image-capture service for a page.

use url::Url;

use crate::config::ScreenshotConfig;
use crate::{PageScopeError, Result};

#[derive(Debug, Clone)]
pub struct ScreenshotLink {
    endpoint: Url,
    access_key: Option<String>,
    full_page: bool,
    delay_secs: u32,
}

impl ScreenshotLink {
    pub fn from_config(config: &ScreenshotConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            PageScopeError::Config(format!(
                "screenshot.endpoint '{}' is not a valid URL: {}",
                config.endpoint, e
            ))
        })?;
        if config.access_key.is_none() {
            log::debug!("No screenshot access key configured; links will omit it");
        }
        Ok(Self {
            endpoint,
            access_key: config.access_key.clone().filter(|k| !k.is_empty()),
            full_page: config.full_page,
            delay_secs: config.delay_secs,
        })
    }

    /// `{endpoint}?access_key=..&url=..&full_page=..&delay=..`, form-encoded.
    /// Parameters already present on the endpoint are kept ahead of these.
    pub fn for_page(&self, page_url: &str) -> String {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.access_key {
                query.append_pair("access_key", key);
            }
            query
                .append_pair("url", page_url)
                .append_pair("full_page", if self.full_page { "true" } else { "false" })
                .append_pair("delay", &self.delay_secs.to_string());
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> ScreenshotConfig {
        ScreenshotConfig {
            access_key: key.map(str::to_string),
            ..ScreenshotConfig::default()
        }
    }

    #[test]
    fn builds_apiflash_url_with_encoded_target() {
        let link = ScreenshotLink::from_config(&config(Some("k3y"))).unwrap();
        assert_eq!(
            link.for_page("https://example.test/a?b=1&c=2"),
            "https://api.apiflash.com/v1/urltoimage?access_key=k3y\
             &url=https%3A%2F%2Fexample.test%2Fa%3Fb%3D1%26c%3D2&full_page=true&delay=5"
        );
    }

    #[test]
    fn missing_key_is_omitted() {
        let link = ScreenshotLink::from_config(&config(None)).unwrap();
        let url = link.for_page("http://example.test");
        assert!(!url.contains("access_key"));
        assert!(url.ends_with("url=http%3A%2F%2Fexample.test&full_page=true&delay=5"));
    }

    #[test]
    fn custom_endpoint_and_flags() {
        let link = ScreenshotLink::from_config(&ScreenshotConfig {
            endpoint: "https://shots.test/capture?format=png".to_string(),
            access_key: Some(String::new()),
            full_page: false,
            delay_secs: 0,
        })
        .unwrap();
        assert_eq!(
            link.for_page("x"),
            "https://shots.test/capture?format=png&url=x&full_page=false&delay=0"
        );
    }

    #[test]
    fn invalid_endpoint_is_a_config_error() {
        let err = ScreenshotLink::from_config(&ScreenshotConfig {
            endpoint: "not a url".to_string(),
            ..ScreenshotConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, PageScopeError::Config(_)));
    }
}
