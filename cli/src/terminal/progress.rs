//! Progress bar driven by the engine's [`ScanEvent`] stream.
//!
//! The bar is a `tracing-indicatif` span, so log lines printed meanwhile go
//! above it instead of tearing it.

use colored::*;
use indicatif::ProgressStyle;
use netscout_core::events::ScanEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {wide_bar:.cyan/blue} {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICKS)
        .progress_chars("━╸─")
}

pub fn scan_span(name: &'static str) -> Span {
    let span = info_span!("scan", indicatif.pb_show = true, kind = name);
    span.pb_set_style(&style());
    span
}

/// Consumes events until the run reports `Finished` or the sender is gone.
pub fn track(span: Span, mut rx: UnboundedReceiver<ScanEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut alive: u64 = 0;
        while let Some(event) = rx.recv().await {
            match event {
                ScanEvent::DiscoveryStarted { hosts } => {
                    span.pb_set_length(hosts);
                    span.pb_set_position(0);
                    span.pb_set_message("Probing hosts");
                }
                ScanEvent::HostProbed { reachable, .. } => {
                    span.pb_inc(1);
                    if reachable {
                        alive += 1;
                        span.pb_set_message(&format!(
                            "Probing hosts, {} alive",
                            alive.to_string().green().bold()
                        ));
                    }
                }
                ScanEvent::PortSweepStarted { addr, ports } => {
                    span.pb_set_length(ports);
                    span.pb_set_position(0);
                    span.pb_set_message(&format!(
                        "Sweeping ports on {}",
                        addr.to_string().color(colors::PRIMARY)
                    ));
                }
                ScanEvent::PortProbed { .. } => span.pb_inc(1),
                ScanEvent::CredentialTried {
                    addr,
                    port,
                    username,
                } => {
                    span.pb_set_message(&format!(
                        "Trying default login '{}' on {addr}:{port}",
                        username.italic()
                    ));
                }
                ScanEvent::Finished => break,
            }
        }
    })
}
