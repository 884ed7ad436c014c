//! Port (trait) definitions for the OS-facing capabilities.
//!
//! The reclamation orchestrator is written against these seams so the
//! platform adapters can be swapped for fakes in tests. Implementations
//! live in `devport-runtime`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

/// Probe whether a TCP port is currently bound on the local interface.
#[async_trait]
pub trait PortProber: Send + Sync {
    /// `true` when the port cannot be bound right now.
    ///
    /// Implementations must release any transient socket before returning
    /// and must answer within a bounded time; an indeterminate result is
    /// reported as "in use" (the conservative default).
    async fn is_port_in_use(&self, port: u16) -> bool;
}

/// Discover the process ids currently owning sockets on a port.
///
/// Infallible by contract: a failed or unsupported lookup is observably
/// identical to "nothing found" from the caller's perspective, so both
/// degrade to the empty set rather than surfacing an error.
#[async_trait]
pub trait OwningProcessResolver: Send + Sync {
    /// Process ids holding the port; deduplicated, never containing `0`.
    async fn find_processes_on_port(&self, port: u16) -> BTreeSet<u32>;
}

/// Failure of one termination attempt.
///
/// Kept OS-agnostic (message strings, not platform error types) so the
/// domain layer stays free of `nix`/Windows specifics.
#[derive(Debug, Error)]
pub enum TerminateError {
    /// The kill signal could not be delivered.
    #[error("signal delivery to pid {pid} failed: {message}")]
    Signal {
        /// Target process id.
        pid: u32,
        /// OS error text.
        message: String,
    },

    /// The process was signalled but never disappeared.
    #[error("pid {pid} did not exit within {waited_ms} ms of being killed")]
    DidNotExit {
        /// Target process id.
        pid: u32,
        /// How long the terminator polled before giving up.
        waited_ms: u64,
    },

    /// The platform's termination command failed.
    #[error("termination command for pid {pid} failed: {message}")]
    CommandFailed {
        /// Target process id.
        pid: u32,
        /// Command error text.
        message: String,
    },
}

/// Forcefully terminate a single process.
#[async_trait]
pub trait ProcessTerminator: Send + Sync {
    /// Issue a forced, non-graceful kill and wait for it to take effect.
    ///
    /// A process that is already gone is a success. Each call is
    /// independent; callers may issue several concurrently.
    async fn terminate(&self, pid: u32) -> Result<(), TerminateError>;
}

/// Result of one successful reclamation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// The port was free on the first check (or no owner was found);
    /// nothing was killed.
    AlreadyFree,
    /// Owners were terminated and the port re-verified as free.
    Reclaimed {
        /// How many owning processes were successfully killed.
        killed: usize,
    },
}
