//! Port reclamation orchestrator.
//!
//! Drives the single-pass sequence: check, resolve owners, terminate them
//! all, settle, re-verify. There is no retry beyond this one pass — a port
//! that survives it is an operator problem, and looping here would risk
//! binding a port still owned by another process.

use devport_core::config::ReclaimSettings;
use devport_core::error::ReclaimError;
use devport_core::ports::{
    OwningProcessResolver, PortProber, ProcessTerminator, ReclaimOutcome,
};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::probe::TcpPortProber;
use crate::resolve::platform_resolver;
use crate::terminate::ForcedTerminator;

/// Single-pass port reclaimer.
pub struct Reclaimer {
    prober: Box<dyn PortProber>,
    resolver: Box<dyn OwningProcessResolver>,
    terminator: Box<dyn ProcessTerminator>,
    settings: ReclaimSettings,
}

impl Reclaimer {
    /// Build a reclaimer from explicit capabilities.
    pub fn new(
        prober: Box<dyn PortProber>,
        resolver: Box<dyn OwningProcessResolver>,
        terminator: Box<dyn ProcessTerminator>,
        settings: ReclaimSettings,
    ) -> Self {
        Self {
            prober,
            resolver,
            terminator,
            settings,
        }
    }

    /// Build a reclaimer wired to the OS adapters for this host.
    pub fn for_host(settings: ReclaimSettings) -> Self {
        Self::new(
            Box::new(TcpPortProber::new(settings.probe_timeout)),
            platform_resolver(),
            Box::new(ForcedTerminator::new(settings.exit_poll_timeout)),
            settings,
        )
    }

    /// Run one reclamation pass for `port`.
    ///
    /// Individual kill failures are logged and do not abort the pass; the
    /// re-verification probe is the arbiter. `Err(StillInUse)` is fatal
    /// and must stop the launcher before any child is spawned.
    pub async fn reclaim(&self, port: u16) -> Result<ReclaimOutcome, ReclaimError> {
        info!(port = %port, "checking port availability");
        if !self.prober.is_port_in_use(port).await {
            info!(port = %port, "port is free");
            return Ok(ReclaimOutcome::AlreadyFree);
        }

        let pids = self.resolver.find_processes_on_port(port).await;
        if pids.is_empty() {
            // The probe and the resolver are not atomic and may disagree;
            // nothing to kill means the launch proceeds.
            info!(port = %port, "port looked busy but no owning process was found, proceeding");
            return Ok(ReclaimOutcome::AlreadyFree);
        }
        info!(port = %port, count = %pids.len(), "found {} process(es) on port", pids.len());

        // Terminations target distinct pids and are independent; issue
        // them concurrently but await every outcome before settling.
        let outcomes = join_all(pids.iter().map(|&pid| async move {
            info!(pid = %pid, "killing process");
            (pid, self.terminator.terminate(pid).await)
        }))
        .await;

        let mut killed = 0usize;
        for (pid, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    info!(pid = %pid, "killed");
                    killed += 1;
                }
                Err(e) => warn!(pid = %pid, error = %e, "failed to kill process"),
            }
        }

        debug!(
            delay_ms = %self.settings.settle_delay.as_millis(),
            "waiting for socket teardown"
        );
        tokio::time::sleep(self.settings.settle_delay).await;

        if self.prober.is_port_in_use(port).await {
            return Err(ReclaimError::StillInUse { port });
        }

        info!(port = %port, "port is now free");
        Ok(ReclaimOutcome::Reclaimed { killed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use devport_core::ports::TerminateError;
    use std::collections::{BTreeSet, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Prober answering from a script of responses.
    struct ScriptedProber {
        responses: Mutex<VecDeque<bool>>,
    }

    impl ScriptedProber {
        fn new(responses: impl IntoIterator<Item = bool>) -> Box<Self> {
            Box::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
            })
        }
    }

    #[async_trait]
    impl PortProber for ScriptedProber {
        async fn is_port_in_use(&self, _port: u16) -> bool {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("probe called more often than scripted")
        }
    }

    /// Resolver returning a fixed pid set and counting invocations.
    struct FixedResolver {
        pids: BTreeSet<u32>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedResolver {
        fn new(pids: impl IntoIterator<Item = u32>, calls: Arc<AtomicUsize>) -> Box<Self> {
            Box::new(Self {
                pids: pids.into_iter().collect(),
                calls,
            })
        }
    }

    #[async_trait]
    impl OwningProcessResolver for FixedResolver {
        async fn find_processes_on_port(&self, _port: u16) -> BTreeSet<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pids.clone()
        }
    }

    /// Terminator recording every attempt, failing for scripted pids.
    struct ScriptedTerminator {
        fail_for: BTreeSet<u32>,
        attempts: Arc<Mutex<Vec<u32>>>,
    }

    impl ScriptedTerminator {
        fn new(
            fail_for: impl IntoIterator<Item = u32>,
            attempts: Arc<Mutex<Vec<u32>>>,
        ) -> Box<Self> {
            Box::new(Self {
                fail_for: fail_for.into_iter().collect(),
                attempts,
            })
        }
    }

    #[async_trait]
    impl ProcessTerminator for ScriptedTerminator {
        async fn terminate(&self, pid: u32) -> Result<(), TerminateError> {
            self.attempts.lock().unwrap().push(pid);
            if self.fail_for.contains(&pid) {
                return Err(TerminateError::Signal {
                    pid,
                    message: "Operation not permitted".to_string(),
                });
            }
            Ok(())
        }
    }

    fn fast_settings() -> ReclaimSettings {
        ReclaimSettings::default().with_settle_delay(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn free_port_skips_resolver_and_terminator() {
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let reclaimer = Reclaimer::new(
            ScriptedProber::new([false]),
            FixedResolver::new([], resolver_calls.clone()),
            ScriptedTerminator::new([], attempts.clone()),
            fast_settings(),
        );

        let outcome = reclaimer.reclaim(3001).await.expect("reclaim failed");

        assert_eq!(outcome, ReclaimOutcome::AlreadyFree);
        assert_eq!(resolver_calls.load(Ordering::SeqCst), 0);
        assert!(attempts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reclaim_is_idempotent_on_a_free_port() {
        // Two passes in a row on a free port must both be no-ops.
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let reclaimer = Reclaimer::new(
            ScriptedProber::new([false, false]),
            FixedResolver::new([4821], resolver_calls.clone()),
            ScriptedTerminator::new([], attempts.clone()),
            fast_settings(),
        );

        for _ in 0..2 {
            let outcome = reclaimer.reclaim(3001).await.expect("reclaim failed");
            assert_eq!(outcome, ReclaimOutcome::AlreadyFree);
        }
        assert_eq!(resolver_calls.load(Ordering::SeqCst), 0);
        assert!(attempts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn busy_port_with_no_owners_proceeds_as_free() {
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let reclaimer = Reclaimer::new(
            ScriptedProber::new([true]),
            FixedResolver::new([], resolver_calls.clone()),
            ScriptedTerminator::new([], attempts.clone()),
            fast_settings(),
        );

        let outcome = reclaimer.reclaim(5173).await.expect("reclaim failed");

        assert_eq!(outcome, ReclaimOutcome::AlreadyFree);
        assert_eq!(resolver_calls.load(Ordering::SeqCst), 1);
        assert!(attempts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn occupied_port_is_killed_settled_and_reverified() {
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let settings = fast_settings();
        let reclaimer = Reclaimer::new(
            ScriptedProber::new([true, false]),
            FixedResolver::new([4821], resolver_calls),
            ScriptedTerminator::new([], attempts.clone()),
            settings,
        );

        let started = Instant::now();
        let outcome = reclaimer.reclaim(5173).await.expect("reclaim failed");

        assert_eq!(outcome, ReclaimOutcome::Reclaimed { killed: 1 });
        assert_eq!(*attempts.lock().unwrap(), vec![4821]);
        assert!(started.elapsed() >= settings.settle_delay);
    }

    #[tokio::test]
    async fn one_failed_kill_does_not_stop_the_others() {
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let reclaimer = Reclaimer::new(
            ScriptedProber::new([true, false]),
            FixedResolver::new([100, 200], resolver_calls),
            ScriptedTerminator::new([100], attempts.clone()),
            fast_settings(),
        );

        let outcome = reclaimer.reclaim(5173).await.expect("reclaim failed");

        // Both ids received independent attempts despite 100 failing.
        let mut seen = attempts.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![100, 200]);
        assert_eq!(outcome, ReclaimOutcome::Reclaimed { killed: 1 });
    }

    #[tokio::test]
    async fn port_still_in_use_after_the_pass_is_fatal() {
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let reclaimer = Reclaimer::new(
            ScriptedProber::new([true, true]),
            FixedResolver::new([100], resolver_calls),
            ScriptedTerminator::new([100], attempts),
            fast_settings(),
        );

        let err = reclaimer.reclaim(5173).await.expect_err("should fail");
        assert!(matches!(err, ReclaimError::StillInUse { port: 5173 }));
    }
}
