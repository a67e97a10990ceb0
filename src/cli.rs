use clap::{Args, Parser, Subcommand, ValueEnum};
use pagescope_lib::Viewport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagescope")]
#[command(
    version,
    about = "PageScope - Render a web page and report its content, images, links and sitemap",
    long_about = "PageScope\n\nModes:\n- analyze: render one URL in headless Chromium and print a JSON report (text, best-resolution images, sitemap, broken links, meta tags, load time, SSL and mobile signals).\n- serve: expose the same analysis over HTTP (POST /parse).\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for viewport/timeouts/links/server; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a single page
    Analyze(AnalyzeArgs),

    /// Run the HTTP analysis service
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(long, help = "Page URL to analyze (http:// or https://)")]
    pub url: String,

    #[arg(long, value_enum, default_value = "json", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, short, help = "Output file path (stdout if omitted)")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        default_value = "1440x900",
        help = "Desktop viewport dimensions (WIDTHxHEIGHT)"
    )]
    pub viewport: Viewport,

    #[arg(
        long,
        default_value = "30",
        help = "Navigation timeout (seconds) for the page load"
    )]
    pub nav_timeout: u64,

    #[arg(
        long,
        default_value = "60",
        help = "Process timeout (seconds) for each Playwright invocation"
    )]
    pub process_timeout: u64,

    #[arg(
        long,
        default_value = "8",
        help = "Maximum number of link checks in flight"
    )]
    pub link_concurrency: usize,

    #[arg(long, help = "Exit with code 1 when the report lists broken links")]
    pub fail_on_broken_links: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0:5002", help = "Address to listen on")]
    pub bind: String,

    #[arg(
        long,
        value_name = "PATH",
        help = "Directory for locally captured screenshots"
    )]
    pub screenshots_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Capture a local full-page screenshot for every analyzed page"
    )]
    pub capture_screenshots: bool,

    #[arg(
        long,
        value_name = "URL",
        help = "Public base URL used in local screenshot links (defaults to the request Host)"
    )]
    pub public_url: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
