use pagescope_lib::PageScopeOutput;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn pagescope(dir: &Path, mock_html: Option<&Path>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pagescope"));
    cmd.args(args)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("PAGESCOPE_MOCK_HTML")
        .env_remove("PAGESCOPE_SCREENSHOT_ACCESS_KEY")
        .env_remove("RUST_LOG");
    if let Some(path) = mock_html {
        cmd.env("PAGESCOPE_MOCK_HTML", path);
    }
    cmd.output().expect("run pagescope")
}

fn write_page(dir: &Path, html: &str) -> std::path::PathBuf {
    let path = dir.join("page.html");
    std::fs::write(&path, html).expect("write html");
    path
}

#[test]
fn missing_url_is_a_usage_error() {
    let dir = TempDir::new().expect("tempdir");
    let output = pagescope(dir.path(), None, &["analyze"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn empty_url_is_rejected_with_error_payload() {
    let dir = TempDir::new().expect("tempdir");
    let output = pagescope(dir.path(), None, &["analyze", "--url", ""]);
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json error");
    assert_eq!(payload["mode"], "error");
    assert_eq!(payload["error"]["category"], "request");
}

#[test]
fn analyze_with_mock_render_prints_report() {
    let mut site = mockito::Server::new();
    site.mock("GET", "/sitemap.xml")
        .with_status(200)
        .with_body("<urlset><url><loc>/</loc></url></urlset>")
        .create();
    site.mock("HEAD", "/about").with_status(200).create();

    let dir = TempDir::new().expect("tempdir");
    let html = write_page(
        dir.path(),
        r#"<html><head><meta name="description" content="Demo"></head>
           <body><h1>Demo page</h1><a href="/about">About</a>
           <img src="/hero-300x200.jpg"><img data-src="/hero-1200x800.jpg"></body></html>"#,
    );

    let url = site.url();
    let output = pagescope(dir.path(), Some(&html), &["analyze", "--url", &url]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json report");
    assert_eq!(json["mode"], "analyze");
    assert_eq!(json["text"], "Demo page About");
    assert_eq!(json["images"], serde_json::json!([format!("{url}/hero-1200x800.jpg")]));
    assert_eq!(json["sitemap"], "<urlset><url><loc>/</loc></url></urlset>");
    assert_eq!(json["broken_links"], serde_json::json!([]));
    assert_eq!(json["meta_tags"]["description"], "Demo");
    assert_eq!(json["ssl"], false);
    assert_eq!(json["mobile_friendly"], true);

    let parsed: PageScopeOutput = serde_json::from_str(stdout.trim()).expect("typed output");
    assert!(matches!(parsed, PageScopeOutput::Analyze(_)));
}

#[test]
fn fail_on_broken_links_exits_one() {
    let mut site = mockito::Server::new();
    site.mock("HEAD", "/missing").with_status(404).create();

    let dir = TempDir::new().expect("tempdir");
    let html = write_page(dir.path(), r#"<a href="/missing">gone</a>"#);
    let url = site.url();

    let lenient = pagescope(dir.path(), Some(&html), &["analyze", "--url", &url]);
    assert_eq!(lenient.status.code(), Some(0));

    let strict = pagescope(
        dir.path(),
        Some(&html),
        &["analyze", "--url", &url, "--fail-on-broken-links"],
    );
    assert_eq!(strict.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&strict.stdout);
    assert!(stdout.contains(&format!("{url}/missing")));
}

#[test]
fn unreadable_mock_page_is_a_render_error() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("absent.html");
    let output = pagescope(
        dir.path(),
        Some(&missing),
        &["analyze", "--url", "http://example.test"],
    );
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json error");
    assert_eq!(payload["error"]["category"], "render");
}

#[test]
fn invalid_config_file_exits_two() {
    let dir = TempDir::new().expect("tempdir");
    let cfg = dir.path().join("pagescope.toml");
    std::fs::write(&cfg, "[links]\nconcurrency = 0\n").expect("write config");

    let output = pagescope(
        dir.path(),
        None,
        &[
            "analyze",
            "--url",
            "http://example.test",
            "--config",
            cfg.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"category\":\"config\""));
}

#[test]
fn output_flag_writes_report_file() {
    let site = mockito::Server::new();
    let dir = TempDir::new().expect("tempdir");
    let html = write_page(dir.path(), "<p>file output</p>");
    let report_path = dir.path().join("report.json");
    let url = site.url();

    let output = pagescope(
        dir.path(),
        Some(&html),
        &[
            "analyze",
            "--url",
            &url,
            "--output",
            report_path.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(0));

    let written = std::fs::read_to_string(&report_path).expect("report written");
    let json: serde_json::Value = serde_json::from_str(&written).expect("json");
    assert_eq!(json["text"], "file output");
    assert_eq!(json["sitemap"], "Sitemap not found");
}
