//! Playwright integration for headless browser automation.
//!
//! Holds the inline helper scripts run with `node -e`, the mapping from helper
//! failures to [`PageScopeError::Render`], and the Node/Playwright availability
//! checks.

use crate::{PageScopeError, Result};
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Renders a page, runs the settle sequence and prints the DOM as JSON.
///
/// argv: url, profile (`WIDTHxHEIGHT` or a Playwright device name), nav timeout
/// ms, settle ms, scroll settle ms, headless flag, mode (`dom` or `probe`).
/// In `probe` mode the script stops after the first pause and prints only the status.
pub(crate) const RENDER_SCRIPT: &str = r#"
const [, url, profile, navTimeout, settleMs, scrollSettleMs, headlessFlag, mode] = process.argv;

function contextOptions(playwright, profile) {
  const size = /^(\d+)x(\d+)$/.exec(profile);
  if (size) {
    return { viewport: { width: parseInt(size[1], 10), height: parseInt(size[2], 10) } };
  }
  const device = playwright.devices[profile];
  if (!device) {
    throw new Error(`Unknown device profile: ${profile}`);
  }
  return { ...device };
}

async function run() {
  let browser;
  try {
    const playwright = require('playwright');
    browser = await playwright.chromium.launch({
      headless: headlessFlag !== '0',
      args: ['--no-sandbox', '--disable-dev-shm-usage']
    });
    const context = await browser.newContext(contextOptions(playwright, profile));
    const page = await context.newPage();

    const started = Date.now();
    await page.goto(url, { waitUntil: 'load', timeout: parseInt(navTimeout, 10) });
    const loadTimeMs = Date.now() - started;

    await page.waitForTimeout(parseInt(settleMs, 10));
    if (mode === 'probe') {
      console.log(JSON.stringify({ status: 'ok' }));
      return;
    }

    await page.evaluate(() => {
      window.scrollTo(0, document.body ? document.body.scrollHeight : 0);
    });
    await page.waitForTimeout(parseInt(scrollSettleMs, 10));

    const html = await page.content();
    console.log(JSON.stringify({ status: 'ok', url: page.url(), html, loadTimeMs }));
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    console.error(JSON.stringify({ status: 'error', message }));
    process.exitCode = 1;
  } finally {
    if (browser) {
      await browser.close();
    }
  }
}

run();
"#;

/// Full-page screenshot capture.
///
/// argv: url, profile, nav timeout ms, delay ms, headless flag, output path.
pub(crate) const SCREENSHOT_SCRIPT: &str = r#"
const [, url, profile, navTimeout, delayMs, headlessFlag, screenshotPath] = process.argv;

async function run() {
  let browser;
  try {
    const { chromium } = require('playwright');
    browser = await chromium.launch({
      headless: headlessFlag !== '0',
      args: ['--no-sandbox', '--disable-dev-shm-usage']
    });
    const size = /^(\d+)x(\d+)$/.exec(profile) || [null, '1440', '900'];
    const context = await browser.newContext({
      viewport: { width: parseInt(size[1], 10), height: parseInt(size[2], 10) }
    });
    const page = await context.newPage();

    await page.goto(url, { waitUntil: 'load', timeout: parseInt(navTimeout, 10) });
    await page.waitForTimeout(parseInt(delayMs, 10));
    await page.screenshot({ path: screenshotPath, fullPage: true });

    console.log(JSON.stringify({ status: 'ok' }));
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    console.error(JSON.stringify({ status: 'error', message }));
    process.exitCode = 1;
  } finally {
    if (browser) {
      await browser.close();
    }
  }
}

run();
"#;

/// Timeout for checking node/playwright availability.
pub(crate) const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

/// Payload printed on stdout by the helper scripts.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScriptResult {
    pub status: String,
    pub message: Option<String>,
    pub url: Option<String>,
    pub html: Option<String>,
    pub load_time_ms: Option<u64>,
}

/// Error payload printed on stderr by the helper scripts.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ScriptError {
    pub status: String,
    pub message: String,
}

pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> PageScopeError {
    if err.kind() == io::ErrorKind::NotFound {
        PageScopeError::render(format!(
            "Unable to spawn Playwright helper; '{}' was not found on PATH",
            command
        ))
    } else {
        PageScopeError::render(format!("Unable to spawn Playwright helper: {}", err))
    }
}

/// Maps helper stderr to a render error, preferring the structured payload.
pub(crate) fn map_playwright_error(status_text: impl Into<String>, stderr: &str) -> PageScopeError {
    let structured = stderr
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<ScriptError>(line.trim()).ok());
    if let Some(error) = structured {
        return map_playwright_status_error(&error.status, error.message);
    }

    if stderr
        .to_ascii_lowercase()
        .contains("cannot find module 'playwright'")
    {
        return PageScopeError::render(
            "Playwright npm package is missing; install with `npm install playwright`.",
        );
    }

    PageScopeError::render(format!(
        "Playwright exited with status {}: {}",
        status_text.into(),
        stderr.trim()
    ))
}

pub(crate) fn map_playwright_status_error(status: &str, message: String) -> PageScopeError {
    if message
        .to_ascii_lowercase()
        .contains("cannot find module 'playwright'")
    {
        PageScopeError::render(
            "Playwright npm package is missing; install with `npm install playwright`.",
        )
    } else {
        PageScopeError::render(format!("Playwright error (status {}): {}", status, message))
    }
}

pub(crate) async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            PageScopeError::render(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(PageScopeError::render(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }

    Ok(())
}

pub(crate) async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            PageScopeError::render(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_playwright_error(
            format!("{:?}", output.status),
            &stderr,
        ));
    }

    Ok(())
}
