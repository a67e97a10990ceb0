//! Scoped ownership of the browser helper process.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;

use super::playwright::map_spawn_error;
use crate::{PageScopeError, Result};

/// Time the helper gets after SIGTERM to close Chromium before it is killed.
const TERMINATE_GRACE: Duration = Duration::from_secs(3);

/// Captured output of a helper run that exited on its own.
#[derive(Debug)]
pub(crate) struct HelperOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// A running helper process (Node + Chromium).
///
/// Playwright starts Chromium detached from the helper, so the helper must be
/// asked to shut down (SIGTERM runs its browser cleanup) before it is killed.
/// Dropping the guard does the same on a background task, so every exit path
/// out of a render (timeout, error, panic, caller cancellation) tears down
/// the browser as well.
#[derive(Debug)]
pub(crate) struct BrowserProcess {
    child: Option<Child>,
}

impl BrowserProcess {
    pub(crate) fn spawn(mut cmd: Command, program: &str) -> Result<Self> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let child = cmd.spawn().map_err(|err| map_spawn_error(err, program))?;
        log::debug!("spawned browser helper (pid {:?})", child.id());
        Ok(Self { child: Some(child) })
    }

    /// Waits up to `limit` for the helper to exit and collects its output.
    /// On timeout the helper is terminated and reaped before returning.
    pub(crate) async fn wait_with_output(mut self, limit: Duration) -> Result<HelperOutput> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| PageScopeError::render("Browser helper was already released"))?;
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout_pipe {
                let _ = out.read_to_end(&mut buf).await;
            }
            buf
        });

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr_pipe {
                let _ = err.read_to_end(&mut buf).await;
            }
            buf
        });

        let waited = timeout(limit, child.wait()).await;
        let status = match waited {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => {
                return Err(PageScopeError::render(format!(
                    "Failed waiting for browser helper: {}",
                    err
                )))
            }
            Err(_) => {
                if let Some(child) = self.child.take() {
                    terminate(child, TERMINATE_GRACE).await;
                }
                return Err(PageScopeError::render(format!(
                    "Browser helper timed out after {:?}; process killed",
                    limit
                )));
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        Ok(HelperOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

impl Drop for BrowserProcess {
    fn drop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if !matches!(child.try_wait(), Ok(None)) {
            return;
        }
        log::debug!("dropping live browser helper (pid {:?})", child.id());
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(terminate(child, TERMINATE_GRACE));
            }
            // No runtime left to wait on: SIGTERM now, SIGKILL follows.
            Err(_) => {
                send_sigterm(child.id());
                let _ = child.start_kill();
            }
        }
    }
}

/// SIGTERM, wait up to `grace`, then SIGKILL. Always reaps the helper.
async fn terminate(mut child: Child, grace: Duration) {
    let pid = child.id();
    log::warn!("stopping browser helper (pid {:?})", pid);
    if send_sigterm(pid) {
        match timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                log::debug!("browser helper exited after SIGTERM ({})", status);
                return;
            }
            Ok(Err(err)) => log::debug!("wait after SIGTERM failed: {}", err),
            Err(_) => log::warn!(
                "browser helper ignored SIGTERM for {:?}; killing",
                grace
            ),
        }
    }
    if let Err(err) = child.kill().await {
        log::debug!("kill failed: {}", err);
    }
}

/// `pid` is `None` once tokio has reaped the child, so a recycled pid is
/// never signalled.
#[cfg(unix)]
fn send_sigterm(pid: Option<u32>) -> bool {
    let Some(pid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return false;
    };
    // SAFETY: kill(2) has no memory-safety preconditions.
    unsafe { libc::kill(pid, libc::SIGTERM) == 0 }
}

#[cfg(not(unix))]
fn send_sigterm(_pid: Option<u32>) -> bool {
    false
}
