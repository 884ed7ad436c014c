//! Domain types and port definitions for devport.
//!
//! This crate holds the pure domain layer: launch configuration values,
//! the error taxonomy, and the trait seams the OS-facing adapters in
//! `devport-runtime` implement. No OS calls live here.

pub mod config;
pub mod error;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{LaunchRequest, ReclaimSettings};
pub use error::{LaunchError, ReclaimError};
pub use ports::{
    OwningProcessResolver, PortProber, ProcessTerminator, ReclaimOutcome, TerminateError,
};
