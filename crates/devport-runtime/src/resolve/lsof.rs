//! Unix owning-process resolver backed by `lsof`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use devport_core::ports::OwningProcessResolver;
use tokio::process::Command;
use tracing::debug;

/// Resolver invoking `lsof -ti :<port>`.
///
/// With `-t`, lsof prints one process id per line and nothing else, which
/// keeps parsing trivial. lsof also exits non-zero when nothing matches,
/// so stdout is authoritative and the exit status is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsofResolver;

impl LsofResolver {
    /// Create the resolver.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OwningProcessResolver for LsofResolver {
    async fn find_processes_on_port(&self, port: u16) -> BTreeSet<u32> {
        let output = match Command::new("lsof")
            .arg("-ti")
            .arg(format!(":{port}"))
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                // "Command unsupported" and "nothing found" are observably
                // identical to the caller; degrade to silence.
                debug!(port = %port, error = %e, "lsof unavailable, assuming no owning processes");
                return BTreeSet::new();
            }
        };

        parse_pid_lines(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse one pid per line; malformed lines are skipped, not fatal.
fn parse_pid_lines(stdout: &str) -> BTreeSet<u32> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .collect()
}
