//! Port availability probing.
//!
//! Checks availability by attempting to bind a listener and immediately
//! releasing it. Binding success means the port is free; an address-in-use
//! error — or any other bind error — means it is not. Treating unknown
//! errors as "in use" keeps the launcher from proceeding unsafely.

use std::time::Duration;

use async_trait::async_trait;
use devport_core::ports::PortProber;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::debug;

/// Bind-and-release prober on the loopback interface.
#[derive(Debug, Clone, Copy)]
pub struct TcpPortProber {
    probe_timeout: Duration,
}

impl TcpPortProber {
    /// Create a prober with a deadline on the bind attempt.
    ///
    /// The bind syscall is not expected to block, but a hung bind would
    /// stall the whole launcher, so the deadline guards against it.
    pub const fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }
}

#[async_trait]
impl PortProber for TcpPortProber {
    async fn is_port_in_use(&self, port: u16) -> bool {
        match timeout(self.probe_timeout, TcpListener::bind(("127.0.0.1", port))).await {
            Ok(Ok(listener)) => {
                // Release immediately; the probe must leave nothing bound.
                drop(listener);
                false
            }
            Ok(Err(e)) => {
                debug!(port = %port, error = %e, "bind failed, treating port as in use");
                true
            }
            Err(_) => {
                debug!(port = %port, "bind did not complete in time, treating port as in use");
                true
            }
        }
    }
}
