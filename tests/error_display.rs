use pagescope_lib::{ErrorCategory, PageScopeError, SitemapResult};

#[test]
fn config_error_display_includes_message() {
    let err = PageScopeError::Config("missing viewport".to_string());

    assert_eq!(format!("{}", err), "Configuration error: missing viewport");
}

#[test]
fn io_error_display_wraps_source() {
    let io_err = std::io::Error::other("disk full");
    let err: PageScopeError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("IO error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn render_helper_uses_message() {
    let err = PageScopeError::render("navigation timed out");

    assert_eq!(format!("{}", err), "Render error: navigation timed out");
    assert_eq!(err.to_payload().category, ErrorCategory::Render);
}

#[test]
fn analysis_helper_uses_message() {
    let err = PageScopeError::analysis("bad base url");

    assert_eq!(format!("{}", err), "Analysis error: bad base url");
}

#[test]
fn invalid_request_maps_to_request_category() {
    let err = PageScopeError::InvalidRequest("URL not provided".to_string());

    assert_eq!(format!("{}", err), "Invalid request: URL not provided");
    assert_eq!(err.to_payload().category, ErrorCategory::Request);
}

#[test]
fn sitemap_sentinels_display_verbatim() {
    assert_eq!(
        SitemapResult::Present.to_string(),
        "Sitemap is present and of good quality"
    );
    assert_eq!(SitemapResult::NotFound.to_string(), "Sitemap not found");
}
