use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pagescope_lib::{
    ErrorOutput, PageScopeError, PageScopeOutput, SITEMAP_NOT_FOUND, SITEMAP_PRESENT,
};

use crate::cli::OutputFormat;

/// How many images and broken links the human summary lists.
const PRETTY_LIST_LIMIT: usize = 10;

/// Write output in the requested format.
pub fn write_output(
    body: &PageScopeOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(
    err: PageScopeError,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    log::debug!("Command failed: {}", err);
    let payload = PageScopeOutput::Error(ErrorOutput::from_payload(err.to_payload()));

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Exit code 2 is reserved for errors; broken-link failures use 1.
    ExitCode::from(2)
}

fn write_json_output(
    body: &PageScopeOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn write_pretty_output(body: &PageScopeOutput, output: Option<&Path>) -> io::Result<()> {
    let use_human = output.is_none() && io::stdout().is_terminal();

    if use_human {
        println!("{}", format_pretty(body, true));
        return Ok(());
    }

    // Files and pipes keep the JSON shape.
    let content = serde_json::to_string_pretty(body)
        .unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &PageScopeOutput, colorize: bool) -> String {
    let flag = |value: bool| {
        if value {
            color("yes", "32", colorize)
        } else {
            color("no", "31", colorize)
        }
    };

    match body {
        PageScopeOutput::Analyze(out) => {
            let report = &out.report;
            let mut buf = String::new();
            let status_ok = report.broken_links.is_empty();
            let status = color(
                if status_ok { "OK" } else { "BROKEN LINKS" },
                if status_ok { "32" } else { "33" },
                colorize,
            );
            writeln!(buf, "{} {}", status, out.url).ok();
            writeln!(buf, "Load time: {:.2}s", report.page_load_time).ok();
            writeln!(
                buf,
                "SSL: {}  Mobile friendly: {}",
                flag(report.ssl),
                flag(report.mobile_friendly)
            )
            .ok();
            writeln!(buf, "Sitemap: {}", sitemap_summary(&report.sitemap)).ok();
            writeln!(
                buf,
                "Text: {} words, Meta tags: {}",
                report.text.split_whitespace().count(),
                report.meta_tags.len()
            )
            .ok();

            write_list(&mut buf, "Images", &report.images);
            if !report.broken_links.is_empty() {
                let header = color("Broken links", "31", colorize);
                write_list(&mut buf, &header, &report.broken_links);
            }
            writeln!(buf, "Screenshot: {}", report.screenshot).ok();
            buf
        }
        PageScopeOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or(out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn sitemap_summary(sitemap: &str) -> String {
    match sitemap {
        SITEMAP_PRESENT | SITEMAP_NOT_FOUND => sitemap.to_string(),
        body => format!("inline ({} chars)", body.chars().count()),
    }
}

fn write_list(buf: &mut String, title: &str, items: &[String]) {
    writeln!(buf, "{} ({}):", title, items.len()).ok();
    for item in items.iter().take(PRETTY_LIST_LIMIT) {
        writeln!(buf, "- {item}").ok();
    }
    if items.len() > PRETTY_LIST_LIMIT {
        writeln!(buf, "  ... {} more", items.len() - PRETTY_LIST_LIMIT).ok();
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Exit code for a finished analysis.
pub fn exit_code_for_analysis(broken_links: usize, fail_on_broken_links: bool) -> ExitCode {
    if fail_on_broken_links && broken_links > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
