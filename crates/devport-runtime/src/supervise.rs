//! Child process spawn and signal relay.
//!
//! After reclamation the supervisor owns the only child process. The child
//! inherits our stdio so its own logs stay visible, gets `PORT` pinned to
//! the target port, and receives any interrupt/termination signal sent to
//! the launcher. The launcher never hard-exits on a signal itself — the
//! child's exit is what drives the final exit code.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use devport_core::config::LaunchRequest;
use devport_core::error::LaunchError;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Environment variable pinned to the target port for the child.
const PORT_ENV: &str = "PORT";

/// Spawn the dev server described by `request` and supervise it to exit.
///
/// Returns the exit code the launcher itself should report: the child's
/// own code on natural exit, or `128 + signal` when the child dies to a
/// signal on unix.
pub async fn supervise(request: &LaunchRequest) -> Result<i32, LaunchError> {
    let program = resolve_program(&request.command)?;

    let mut cmd = Command::new(&program);
    cmd.args(&request.args);
    if let Some(dir) = &request.working_dir {
        cmd.current_dir(dir);
    }
    for (key, value) in &request.env_overrides {
        cmd.env(key, value);
    }
    // Pinned last so nothing — ambient environment or override — can
    // point the child at a different port.
    cmd.env(PORT_ENV, request.target_port.to_string());
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        command: request.command.clone(),
        source,
    })?;
    info!(
        service = %request.service_name,
        port = %request.target_port,
        pid = ?child.id(),
        "dev server started"
    );

    let status = wait_relaying_signals(&mut child)
        .await
        .map_err(|source| LaunchError::Wait { source })?;

    let code = exit_code(status);
    info!(service = %request.service_name, code = %code, "dev server exited");
    Ok(code)
}

/// Resolve a bare command name on `PATH`; paths pass through untouched.
///
/// Failing here instead of at spawn time turns "No such file or
/// directory" into a message that names the missing tool.
fn resolve_program(command: &str) -> Result<PathBuf, LaunchError> {
    if command.contains(std::path::MAIN_SEPARATOR) {
        return Ok(PathBuf::from(command));
    }

    which::which(command).map_err(|_| LaunchError::Spawn {
        command: command.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "not found on PATH"),
    })
}

/// Wait for the child while relaying launcher-directed signals to it.
#[cfg(unix)]
async fn wait_relaying_signals(child: &mut Child) -> io::Result<ExitStatus> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    // The pid is captured up front; after the child exits the relay
    // becomes a harmless ESRCH that is only logged.
    let pid = child.id();

    loop {
        tokio::select! {
            status = child.wait() => return status,
            _ = interrupt.recv() => relay(pid, nix::sys::signal::Signal::SIGINT),
            _ = terminate.recv() => relay(pid, nix::sys::signal::Signal::SIGTERM),
        }
    }
}

#[cfg(unix)]
fn relay(pid: Option<u32>, signal: nix::sys::signal::Signal) {
    let Some(pid) = pid else {
        return;
    };
    debug!(pid = %pid, signal = ?signal, "relaying signal to child");
    if let Err(e) = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), signal) {
        warn!(pid = %pid, error = %e, "failed to relay signal to child");
    }
}

/// Windows has no relayable SIGINT/SIGTERM; a forced kill on ctrl-c is
/// the closest equivalent, and the child's resulting exit still drives
/// the launcher's exit code.
#[cfg(not(unix))]
async fn wait_relaying_signals(child: &mut Child) -> io::Result<ExitStatus> {
    loop {
        let ctrl_c = tokio::select! {
            status = child.wait() => return status,
            _ = tokio::signal::ctrl_c() => true,
        };
        if ctrl_c {
            debug!("ctrl-c received, terminating child");
            if let Err(e) = child.start_kill() {
                warn!(error = %e, "failed to terminate child");
            }
        }
    }
}

/// Map a child exit status to the launcher's own exit code.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    // No code means the child died to a signal; report it shell-style.
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }

    1
}
