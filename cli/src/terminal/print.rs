//! Report rendering. Every line goes through [`print`], so it lands above the
//! progress bar instead of tearing it.

use std::fmt::Display;

use colored::*;
use netscout_common::findings::PortFinding;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;
use crate::terminal::format::{self, Detail};
use crate::terminal::logging::PRINT_TARGET;

pub const REPORT_WIDTH: usize = 64;

const FIELD_WIDTH: usize = 15;
const DETAIL_WIDTH: usize = 9;
const PORT_COLUMN: usize = 9;
const RISK_COLUMN: usize = 8;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

const LOGO: &str = r#"
    _   __     __  _____                  __
   / | / /__  / /_/ ___/_________  __  __/ /_
  /  |/ / _ \/ __/\__ \/ ___/ __ \/ / / / __/
 / /|  /  __/ /_ ___/ / /__/ /_/ / /_/ / /_
/_/ |_/\___/\__//____/\___/\____/\__,_/\__/
"#;

pub fn banner() {
    let tagline = format!("lan recon v{}", env!("CARGO_PKG_VERSION"));
    let pad = REPORT_WIDTH.saturating_sub(UnicodeWidthStr::width(tagline.as_str()) + 1);
    print(&LOGO.color(colors::PRIMARY).bold().to_string());
    print(&format!(
        "{} {}",
        "━".repeat(pad).color(colors::SEPARATOR),
        tagline.color(colors::ACCENT)
    ));
}

/// `━━ TITLE ━━━━━━━━━━━━`, filled out to the report width.
pub fn section(title: &str) {
    let title = title.to_uppercase();
    let used = UnicodeWidthStr::width(title.as_str()) + 4;
    print(&format!(
        "{} {} {}",
        "━━".color(colors::SEPARATOR),
        title.color(colors::PRIMARY).bold(),
        "━".repeat(REPORT_WIDTH.saturating_sub(used)).color(colors::SEPARATOR)
    ));
}

pub fn rule() {
    print(&"═".repeat(REPORT_WIDTH).color(colors::SEPARATOR).to_string());
}

/// `Key.......... value` for run parameters and statistics.
pub fn field(key: &str, value: impl Display) {
    let dots = ".".repeat(FIELD_WIDTH.saturating_sub(key.chars().count()));
    print(&format!(
        "  {}{} {}",
        key.color(colors::TEXT_DEFAULT),
        dots.color(colors::SEPARATOR),
        value
    ));
}

/// A numbered host heading followed by its details as a one-level tree.
pub fn host_entry(idx: usize, label: &str, details: &[Detail]) {
    print(&format!(
        "{} {}",
        format!("[{idx}]").color(colors::ACCENT),
        label.color(colors::PRIMARY).bold()
    ));
    for (i, (key, value)) in details.iter().enumerate() {
        let branch = if i + 1 == details.len() { "└─" } else { "├─" };
        let dots = ".".repeat(DETAIL_WIDTH.saturating_sub(key.chars().count()));
        print(&format!(
            " {} {}{}: {}",
            branch.color(colors::SEPARATOR),
            key,
            dots.color(colors::SEPARATOR),
            value
        ));
    }
}

/// Open ports of one host as `PORT  RISK  SERVICE` columns.
pub fn port_table(findings: &[PortFinding]) {
    print(
        &format!(
            "    {:<PORT_COLUMN$}{:<RISK_COLUMN$}{}",
            "PORT", "RISK", "SERVICE"
        )
        .color(colors::SEPARATOR)
        .to_string(),
    );
    for finding in findings {
        print(&port_row(finding));
    }
}

fn port_row(finding: &PortFinding) -> String {
    // Pad before colouring; escape codes would throw the widths off.
    let port = format!("{:<PORT_COLUMN$}", format!("{}/tcp", finding.port));
    let risk = format!("{:<RISK_COLUMN$}", finding.risk_tier.to_string());
    format!(
        "    {}{}{}",
        port.color(colors::ACCENT),
        format::risk_colored(finding.risk_tier, risk),
        finding.service_label
    )
}

/// A finding the operator has to act on.
pub fn alert(msg: &str) {
    print(&format!("  {} {}", "!!".color(colors::RISK_HIGH).bold(), msg));
}

pub fn centered(msg: &str) {
    let space = " ".repeat(REPORT_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{space}{msg}"));
}

pub fn nothing_found(what: &str) {
    let line = format!("no {what} answered");
    centered(&line.color(colors::RISK_HIGH).bold().to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use netscout_common::findings::RiskTier;

    #[test]
    fn port_rows_line_up_in_columns() {
        colored::control::set_override(false);
        let row = |port, tier, label: &str| {
            port_row(&PortFinding {
                port,
                service_label: label.to_string(),
                banner_text: None,
                risk_tier: tier,
            })
        };

        assert_eq!(row(22, RiskTier::Medium, "SSH"), "    22/tcp   Medium  SSH");
        assert_eq!(row(8080, RiskTier::Low, "HTTP-Alt"), "    8080/tcp Low     HTTP-Alt");
    }
}
