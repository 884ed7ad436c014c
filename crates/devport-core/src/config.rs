//! Launch configuration values.
//!
//! These are intent-based configurations — they express what the caller
//! wants launched, not how the OS work is carried out.

use std::path::PathBuf;
use std::time::Duration;

/// Immutable description of one dev-server launch.
///
/// Constructed once at startup from static configuration and passed into
/// the reclamation orchestrator and the supervisor. Never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Short service label used in log lines (e.g. `api`, `web`).
    pub service_name: String,
    /// TCP port the child must end up bound to.
    pub target_port: u16,
    /// Program to spawn; a bare name is resolved on `PATH`.
    pub command: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Extra environment entries for the child. The supervisor pins `PORT`
    /// to `target_port` after applying these, so an override here cannot
    /// redirect the child to another port.
    pub env_overrides: Vec<(String, String)>,
    /// Working directory for the child (inherited when `None`).
    pub working_dir: Option<PathBuf>,
}

impl LaunchRequest {
    /// Create a new launch request with required fields.
    pub fn new(service_name: impl Into<String>, target_port: u16, command: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            target_port,
            command: command.into(),
            args: Vec::new(),
            env_overrides: Vec::new(),
            working_dir: None,
        }
    }

    /// Set the arguments passed to the spawned program.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add an environment entry for the child.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_overrides.push((key.into(), value.into()));
        self
    }

    /// Set the working directory for the child.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Timing knobs for the reclamation pass.
///
/// The defaults are what the launchers ship with; tests shrink them.
#[derive(Debug, Clone, Copy)]
pub struct ReclaimSettings {
    /// Deadline on the availability probe's bind attempt.
    pub probe_timeout: Duration,
    /// Fixed wait after all terminations complete, allowing OS-level
    /// socket teardown before re-verifying.
    pub settle_delay: Duration,
    /// How long the terminator polls for a killed pid to disappear.
    pub exit_poll_timeout: Duration,
}

impl Default for ReclaimSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
            exit_poll_timeout: Duration::from_secs(2),
        }
    }
}

impl ReclaimSettings {
    /// Set the settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the probe deadline.
    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the post-kill exit poll window.
    #[must_use]
    pub const fn with_exit_poll_timeout(mut self, timeout: Duration) -> Self {
        self.exit_poll_timeout = timeout;
        self
    }
}
