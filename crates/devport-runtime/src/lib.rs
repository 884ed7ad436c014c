//! OS-level adapters for port reclamation and dev-server supervision.
//!
//! This crate implements the ports defined in `devport-core` against the
//! real operating system: a bind-based availability prober, the
//! platform-specific owning-process resolvers, a forced terminator, the
//! reclamation orchestrator that ties them together, and the child
//! supervisor that spawns the dev server and relays signals to it.

pub mod probe;
pub mod reclaim;
pub mod resolve;
pub mod supervise;
pub mod terminate;

// Re-export the pieces the launcher binaries compose
pub use probe::TcpPortProber;
pub use reclaim::Reclaimer;
pub use resolve::{LsofResolver, NetstatResolver, platform_resolver};
pub use supervise::supervise;
pub use terminate::ForcedTerminator;
