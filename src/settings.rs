use std::path::Path;
use std::time::Duration;

use pagescope_lib::{Config, PageScopeError};

use crate::cli::{AnalyzeArgs, ServeArgs};

/// Tracks which CLI flags were explicitly provided vs. defaulted.
#[derive(Debug, Default)]
pub struct AnalyzeFlagSources {
    pub viewport: bool,
    pub nav_timeout: bool,
    pub process_timeout: bool,
    pub link_concurrency: bool,
}

impl AnalyzeFlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            viewport: flag_present(args, "--viewport"),
            nav_timeout: flag_present(args, "--nav-timeout"),
            process_timeout: flag_present(args, "--process-timeout"),
            link_concurrency: flag_present(args, "--link-concurrency"),
        }
    }
}

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Applies explicitly given `analyze` flags on top of `config`, then
/// re-validates the result.
pub fn apply_analyze_overrides(
    config: &mut Config,
    args: &AnalyzeArgs,
    flags: &AnalyzeFlagSources,
) -> Result<(), PageScopeError> {
    if flags.viewport {
        config.viewport = args.viewport;
    }
    if flags.nav_timeout {
        config.timeouts.navigation = Duration::from_secs(args.nav_timeout);
    }
    if flags.process_timeout {
        config.timeouts.process = Duration::from_secs(args.process_timeout);
    }
    if flags.link_concurrency {
        config.links.concurrency = args.link_concurrency;
    }
    config.validate()
}

/// Applies `serve` flags on top of `config`. `--bind` always wins since
/// clap fills in its default.
pub fn apply_serve_overrides(config: &mut Config, args: &ServeArgs, bind_given: bool) {
    if bind_given {
        config.server.bind = args.bind.clone();
    }
    if let Some(dir) = &args.screenshots_dir {
        config.server.screenshots_dir = dir.clone();
    }
    if args.capture_screenshots {
        config.server.capture_local = true;
    }
    if let Some(public_url) = &args.public_url {
        config.server.public_url = Some(public_url.clone());
    }
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/pagescope/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, PageScopeError> {
    Config::load(path)
}

/// Format effective config as a single-line string.
pub fn format_effective_config(config: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: viewport={}, timeouts: nav={}s, process={}s, link={}s, sitemap={}s, links: concurrency={}, browser: node={}, sessions={}, mock={}",
        config.viewport,
        config.timeouts.navigation.as_secs(),
        config.timeouts.process.as_secs(),
        config.timeouts.link_check.as_secs(),
        config.timeouts.sitemap.as_secs(),
        config.links.concurrency,
        config.browser.node_command,
        config.browser.max_sessions,
        config.browser.mock_html.is_some()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use pagescope_lib::Viewport;

    fn analyze_args() -> AnalyzeArgs {
        AnalyzeArgs {
            url: "https://example.com".to_string(),
            format: OutputFormat::Json,
            output: None,
            viewport: Viewport {
                width: 10,
                height: 20,
            },
            nav_timeout: 50,
            process_timeout: 70,
            link_concurrency: 3,
            fail_on_broken_links: false,
        }
    }

    #[test]
    fn flag_present_matches_both_spellings() {
        let args: Vec<String> = ["pagescope", "analyze", "--nav-timeout=5", "--viewport", "1x1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let flags = AnalyzeFlagSources::from_args(&args);
        assert!(flags.nav_timeout);
        assert!(flags.viewport);
        assert!(!flags.process_timeout);
        assert!(!flags.link_concurrency);
    }

    #[test]
    fn config_wins_when_flags_absent() {
        let mut cfg = Config::default();
        cfg.viewport = Viewport {
            width: 111,
            height: 222,
        };
        cfg.timeouts.navigation = Duration::from_secs(5);
        cfg.links.concurrency = 4;

        apply_analyze_overrides(&mut cfg, &analyze_args(), &AnalyzeFlagSources::default())
            .expect("valid");

        assert_eq!(cfg.viewport.width, 111);
        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(5));
        assert_eq!(cfg.timeouts.process, Duration::from_secs(60));
        assert_eq!(cfg.links.concurrency, 4);
    }

    #[test]
    fn cli_wins_when_flags_present() {
        let mut cfg = Config::default();
        let flags = AnalyzeFlagSources {
            viewport: true,
            nav_timeout: true,
            process_timeout: true,
            link_concurrency: true,
        };

        apply_analyze_overrides(&mut cfg, &analyze_args(), &flags).expect("valid");

        assert_eq!(cfg.viewport.width, 10);
        assert_eq!(cfg.viewport.height, 20);
        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(50));
        assert_eq!(cfg.timeouts.process, Duration::from_secs(70));
        assert_eq!(cfg.links.concurrency, 3);
    }

    #[test]
    fn zero_overrides_fail_validation() {
        let mut cfg = Config::default();
        let mut args = analyze_args();
        args.link_concurrency = 0;
        let flags = AnalyzeFlagSources {
            link_concurrency: true,
            ..AnalyzeFlagSources::default()
        };

        let err = apply_analyze_overrides(&mut cfg, &args, &flags).unwrap_err();
        assert!(matches!(err, PageScopeError::Config(_)));
    }

    #[test]
    fn serve_overrides_apply() {
        let mut cfg = Config::default();
        let args = ServeArgs {
            bind: "127.0.0.1:9000".to_string(),
            screenshots_dir: Some("shots".into()),
            capture_screenshots: true,
            public_url: Some("https://scope.example.com/".to_string()),
        };

        apply_serve_overrides(&mut cfg, &args, false);
        assert_eq!(cfg.server.bind, "0.0.0.0:5002");
        assert!(cfg.server.capture_local);
        assert_eq!(cfg.server.screenshots_dir, std::path::PathBuf::from("shots"));
        assert_eq!(
            cfg.server.public_url.as_deref(),
            Some("https://scope.example.com/")
        );

        apply_serve_overrides(&mut cfg, &args, true);
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn format_effective_config_includes_key_fields() {
        let summary = format_effective_config(&Config::default(), Some(Path::new("ps.toml")));
        assert!(summary.contains("1440x900"));
        assert!(summary.contains("nav=30s"));
        assert!(summary.contains("process=60s"));
        assert!(summary.contains("concurrency=8"));
        assert!(summary.contains("ps.toml"));
    }
}
