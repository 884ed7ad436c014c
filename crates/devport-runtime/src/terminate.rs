//! Forced process termination.
//!
//! Reclamation kills are deliberately non-graceful: the owner of the port
//! is in the way and the operator asked for the port back. On unix that is
//! `SIGKILL`; on Windows a forced `taskkill`. Delivery of a kill signal is
//! asynchronous, so the unix path polls until the pid disappears — the
//! orchestrator must observe completion before it starts settling.

use std::time::Duration;

use async_trait::async_trait;
use devport_core::ports::{ProcessTerminator, TerminateError};

/// Platform-appropriate forced terminator.
#[derive(Debug, Clone, Copy)]
pub struct ForcedTerminator {
    exit_poll_timeout: Duration,
}

impl ForcedTerminator {
    /// Create a terminator that polls up to `exit_poll_timeout` for a
    /// killed pid to actually disappear.
    pub const fn new(exit_poll_timeout: Duration) -> Self {
        Self { exit_poll_timeout }
    }
}

#[async_trait]
impl ProcessTerminator for ForcedTerminator {
    async fn terminate(&self, pid: u32) -> Result<(), TerminateError> {
        #[cfg(unix)]
        {
            self.terminate_unix(pid).await
        }

        #[cfg(not(unix))]
        {
            self.terminate_windows(pid).await
        }
    }
}

#[cfg(unix)]
impl ForcedTerminator {
    async fn terminate_unix(&self, pid: u32) -> Result<(), TerminateError> {
        use nix::errno::Errno;
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        let target = Pid::from_raw(pid as i32);
        match signal::kill(target, Signal::SIGKILL) {
            Ok(()) => {}
            // Already gone counts as success.
            Err(Errno::ESRCH) => return Ok(()),
            Err(e) => {
                return Err(TerminateError::Signal {
                    pid,
                    message: e.to_string(),
                });
            }
        }

        // Poll with the null signal until the pid stops existing. SIGKILL
        // cannot be refused, but the kernel delivers it asynchronously.
        let poll_interval = Duration::from_millis(100);
        let mut waited = Duration::ZERO;
        while waited < self.exit_poll_timeout {
            tokio::time::sleep(poll_interval).await;
            waited += poll_interval;

            match signal::kill(target, None) {
                Err(Errno::ESRCH) => return Ok(()),
                // Still present (or present but unsignalable); keep polling.
                Ok(()) | Err(_) => {}
            }
        }

        Err(TerminateError::DidNotExit {
            pid,
            waited_ms: self.exit_poll_timeout.as_millis() as u64,
        })
    }
}

#[cfg(not(unix))]
impl ForcedTerminator {
    async fn terminate_windows(&self, pid: u32) -> Result<(), TerminateError> {
        use tokio::process::Command;

        let output = Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/F"])
            .output()
            .await
            .map_err(|e| TerminateError::CommandFailed {
                pid,
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(TerminateError::CommandFailed {
                pid,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
