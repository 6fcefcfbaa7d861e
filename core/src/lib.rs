//! # netscout engine
//!
//! The concurrent probing engine: discovery sweep, bounded port sweep,
//! banner-based service classification and the weak-credential probe, tied
//! together by [`scanner::ScanCoordinator`].
//!
//! Leaf probes sit behind the traits in [`probe`] so the orchestration can be
//! driven against a simulated network in tests.

pub mod credentials;
pub mod discovery;
pub mod events;
pub mod network;
pub mod pool;
pub mod ports;
pub mod probe;
pub mod scanner;
pub mod service;

pub use scanner::{ScanCoordinator, run_scan};
