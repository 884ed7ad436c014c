//! Owning-process discovery.
//!
//! Two resolver variants exist, one per platform family. Both are compiled
//! everywhere (their parsers are pure and unit-tested on every platform);
//! `platform_resolver` picks the one that matches the host once at startup
//! so no call site branches on the operating system.

mod lsof;
mod netstat;

pub use lsof::LsofResolver;
pub use netstat::NetstatResolver;

use devport_core::ports::OwningProcessResolver;

/// Select the resolver for the current platform.
pub fn platform_resolver() -> Box<dyn OwningProcessResolver> {
    #[cfg(windows)]
    {
        Box::new(NetstatResolver::new())
    }

    #[cfg(not(windows))]
    {
        Box::new(LsofResolver::new())
    }
}
