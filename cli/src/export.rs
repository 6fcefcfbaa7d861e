//! JSON export of a finished run.
//!
//! Layout: `{ "timestamp", "statistics", "results": [[kind, target, findings]] }`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use netscout_common::result::ScanResult;
use netscout_common::stats::ScanStatistics;
use serde::Serialize;

/// What the run was, as recorded in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Ping,
    DeepScan,
    CustomScan,
    TargetScan,
}

#[derive(Serialize)]
struct ScanRecord<'a>(ScanKind, &'a str, &'a ScanResult);

#[derive(Serialize)]
struct ExportDocument<'a> {
    timestamp: String,
    statistics: ScanStatistics,
    results: Vec<ScanRecord<'a>>,
}

pub fn default_file_name(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("scan_results_{}.json", now.format("%Y%m%d_%H%M%S")))
}

pub fn to_json(kind: ScanKind, target: &str, result: &ScanResult, now: DateTime<Local>) -> anyhow::Result<String> {
    let document = ExportDocument {
        timestamp: now.to_rfc3339(),
        statistics: result.statistics,
        results: vec![ScanRecord(kind, target, result)],
    };
    serde_json::to_string_pretty(&document).context("serialising scan results")
}

/// Writes the export and returns the path it went to.
pub fn save(
    path: Option<&Path>,
    kind: ScanKind,
    target: &str,
    result: &ScanResult,
) -> anyhow::Result<PathBuf> {
    let now = Local::now();
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => default_file_name(now),
    };
    let json = to_json(kind, target, result, now)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
