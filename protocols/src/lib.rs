//! Wire-level helpers shared by the probes.
//!
//! Nothing in here opens a socket: these functions build request bytes and
//! interpret response bytes so the probing code in `netscout-core` stays small
//! and the parsing stays unit-testable.

pub mod banner;
pub mod dns;
pub mod http;
pub mod login;
