//! Aggregate counters for one scan run.
//!
//! Workers never touch [`ScanStatistics`] directly. Each sweep returns a
//! [`Tally`] built from its own results and the coordinator merges it in one
//! place, so counters only ever grow and no update can be lost.

use std::time::Duration;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    pub hosts_total: u64,
    pub hosts_alive: u64,
    pub ports_total: u64,
    pub ports_open: u64,
    pub vulnerabilities_found: u64,
    #[serde(rename = "scan_time", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
}

/// Per-sweep counts: how many units were attempted and how many hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub attempted: u64,
    pub hits: u64,
}

impl Tally {
    pub fn record(&mut self, hit: bool) {
        self.attempted += 1;
        if hit {
            self.hits += 1;
        }
    }
}

impl FromIterator<bool> for Tally {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut tally = Tally::default();
        for hit in iter {
            tally.record(hit);
        }
        tally
    }
}

impl ScanStatistics {
    /// `hosts_total` counts every address handed to the sweep; `alive` only the
    /// ones that answered.
    pub fn record_discovery(&mut self, hosts_total: u64, alive: u64) {
        self.hosts_total += hosts_total;
        self.hosts_alive += alive;
    }

    /// Adds one host's requested port range and the ports found open in it.
    pub fn record_ports(&mut self, requested: u64, open: u64) {
        self.ports_total += requested;
        self.ports_open += open;
    }

    pub fn record_vulnerability(&mut self) {
        self.vulnerabilities_found += 1;
    }

    /// Stamps the elapsed time and returns the frozen snapshot.
    pub fn finish(mut self, elapsed: Duration) -> ScanStatistics {
        self.elapsed = elapsed;
        self
    }
}

fn as_secs_f64<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
