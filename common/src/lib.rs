//! Shared model and configuration for the `netscout` workspace.
//!
//! Everything here is plain data: the scan configuration and its validation,
//! the address-range enumeration used by the discovery sweep, and the result
//! types the engine hands back to the display layer.

pub mod config;
pub mod error;
pub mod findings;
pub mod log;
pub mod network;
pub mod result;
pub mod stats;
pub mod utils;

#[doc(hidden)]
pub use tracing as __tracing;
