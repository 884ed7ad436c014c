//! Shared driver for the launcher binaries.
//!
//! Both binaries do the same thing with different static configuration:
//! reclaim the target port, then spawn and supervise the dev server. This
//! crate is the composition root — the only place the OS adapters are
//! wired together.

use devport_core::config::{LaunchRequest, ReclaimSettings};
use devport_core::error::LaunchError;
use devport_runtime::{Reclaimer, supervise};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize logging and load `.env` if present.
///
/// Progress lines are emitted at `info`, so that is the default filter
/// when `RUST_LOG` is unset.
pub fn init() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Reclaim the request's port, launch the dev server, and return the exit
/// code the process should finish with.
///
/// Fatal pre-spawn conditions (port still in use, spawn failure) exit `1`
/// with the error reported; a running child's own exit code is relayed
/// unchanged.
pub async fn run(request: LaunchRequest) -> i32 {
    let reclaimer = Reclaimer::for_host(ReclaimSettings::default());
    match launch(&reclaimer, &request).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    }
}

async fn launch(reclaimer: &Reclaimer, request: &LaunchRequest) -> Result<i32, LaunchError> {
    reclaimer.reclaim(request.target_port).await?;
    supervise(request).await
}
