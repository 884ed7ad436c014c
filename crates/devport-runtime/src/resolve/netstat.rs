//! Windows owning-process resolver backed by `netstat`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use devport_core::ports::OwningProcessResolver;
use tokio::process::Command;
use tracing::debug;

/// Resolver invoking `netstat -ano` and filtering the connection table.
///
/// Rows look like:
///
/// ```text
///   TCP    0.0.0.0:5173    0.0.0.0:0    LISTENING    4821
/// ```
///
/// The local-address column is matched by port suffix and the trailing
/// column is the owning pid. Pid `0` is the System Idle pseudo-process and
/// is never a kill candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetstatResolver;

impl NetstatResolver {
    /// Create the resolver.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OwningProcessResolver for NetstatResolver {
    async fn find_processes_on_port(&self, port: u16) -> BTreeSet<u32> {
        let output = match Command::new("netstat").arg("-ano").output().await {
            Ok(output) => output,
            Err(e) => {
                debug!(port = %port, error = %e, "netstat unavailable, assuming no owning processes");
                return BTreeSet::new();
            }
        };

        parse_netstat(&String::from_utf8_lossy(&output.stdout), port)
    }
}

/// Extract owning pids for `port` from `netstat -ano` output.
///
/// Malformed rows are skipped. Matching is on the local-address port
/// suffix (`:<port>` at the end of the column), which covers `0.0.0.0`,
/// `127.0.0.1` and bracketed IPv6 forms without also matching longer
/// ports that merely start with the same digits.
fn parse_netstat(stdout: &str, port: u16) -> BTreeSet<u32> {
    let suffix = format!(":{port}");
    let mut pids = BTreeSet::new();

    for line in stdout.lines() {
        let columns: Vec<&str> = line.split_whitespace().collect();
        // TCP rows carry proto/local/foreign/state/pid; UDP rows omit the
        // state column. Anything shorter is a header or banner line.
        if columns.len() < 4 {
            continue;
        }
        let Some(local_address) = columns.get(1) else {
            continue;
        };
        if !local_address.ends_with(&suffix) {
            continue;
        }
        let Some(pid) = columns.last().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        if pid == 0 {
            continue;
        }
        pids.insert(pid);
    }

    pids
}
