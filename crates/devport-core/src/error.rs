//! Error taxonomy for the launcher.
//!
//! Only two conditions abort a launch before the child runs: a port that
//! stays occupied after a full reclamation pass, and a failed spawn. The
//! child's own exit disposition is relayed, not treated as an error.

use thiserror::Error;

/// Fatal outcome of a reclamation pass.
#[derive(Debug, Error)]
pub enum ReclaimError {
    /// The port survived a full check/kill/settle/re-check pass.
    ///
    /// Deliberately non-retried: binding a port still owned by another
    /// process would corrupt that process's traffic.
    #[error("port {port} is still in use after reclamation; stop the owning process manually and retry")]
    StillInUse {
        /// The port that could not be freed.
        port: u16,
    },
}

/// Top-level launcher error.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Reclamation failed; the child was never spawned.
    #[error(transparent)]
    Reclaim(#[from] ReclaimError),

    /// The child process could not be spawned.
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        /// The program that failed to start.
        command: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the spawned child failed.
    #[error("failed while waiting for child process: {source}")]
    Wait {
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Map the error to the launcher's process exit code.
    ///
    /// Every fatal-before-spawn condition exits `1`; a running child's own
    /// exit code is propagated elsewhere and never reaches this mapping.
    pub const fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Reclaim(_) | LaunchError::Spawn { .. } | LaunchError::Wait { .. } => 1,
        }
    }
}
