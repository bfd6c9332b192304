use anyhow::Error;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

use crate::core::{HealthStatus, Severity};
use crate::render::{SeveritySection, SummaryBlock, card_lines};

mod console;

pub use console::ConsoleView;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(stderr, "  - rerun with `--verbose` for details");
    let _ = writeln!(
        stderr,
        "  - see `secuscan --help` for available commands and options"
    );
}

pub fn print_health(base_url: &str, health: &HealthStatus, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let status = if health.status.eq_ignore_ascii_case("healthy") {
        paint(&health.status, "32", cfg.color)
    } else {
        paint(&health.status, "33", cfg.color)
    };
    let _ = writeln!(out, "server: {base_url}");
    let _ = writeln!(out, "status: {status}");
    if let Some(ip) = &health.server_ip {
        let _ = writeln!(out, "server_ip: {ip}");
    }
    if let Some(ts) = &health.timestamp {
        let _ = writeln!(out, "timestamp: {ts}");
    }
}

pub(crate) fn summary_lines(summary: &SummaryBlock, color: bool) -> Vec<String> {
    let label_w = Severity::ALL
        .iter()
        .map(|s| visible_width_ansi(s.label()))
        .max()
        .unwrap_or(0);

    let mut lines = vec![paint("Scan Summary", "1", color)];
    for severity in Severity::ALL {
        let count = summary.counts.count(severity).to_string();
        lines.push(format!(
            "  {}  {}",
            pad_end_display(severity.label(), label_w),
            paint(&count, severity_color(severity), color && count != "0")
        ));
    }
    lines.push(format!("Total Vulnerabilities: {}", summary.counts.total));
    lines
}

pub(crate) fn section_lines(section: &SeveritySection, color: bool) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        paint(section.title(), severity_color(section.severity), color),
    ];
    for card in &section.cards {
        lines.extend(card_lines(card));
    }
    lines
}

pub(crate) fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "31",
        Severity::Medium => "33",
        Severity::Low => "32",
    }
}

fn paint(s: &str, code: &str, color: bool) -> String {
    if !color {
        return s.to_string();
    }
    format!("\x1b[{code}m{s}\x1b[0m")
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn visible_width_ansi(s: &str) -> usize {
    let mut width: usize = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            let _ = chars.next();
            for ch2 in chars.by_ref() {
                if ch2 == 'm' {
                    break;
                }
            }
            continue;
        }
        width = width.saturating_add(UnicodeWidthChar::width(ch).unwrap_or(0));
    }
    width
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        return format!("{bytes} B");
    }
    if b < MB {
        return format!("{:.1} KiB", b / KB);
    }
    format!("{:.1} MiB", b / MB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SummaryCounts;

    #[test]
    fn visible_width_ignores_ansi() {
        assert_eq!(visible_width_ansi(&paint("High", "31", true)), 4);
        assert_eq!(visible_width_ansi("High"), 4);
    }

    #[test]
    fn summary_lines_align_labels() {
        let block = SummaryBlock::new(SummaryCounts {
            total: 3,
            high_risk: 1,
            medium_risk: 2,
            low_risk: 0,
        });
        let lines = summary_lines(&block, false);
        assert_eq!(lines[1], "  High Risk    1");
        assert_eq!(lines[2], "  Medium Risk  2");
        assert_eq!(lines[3], "  Low Risk     0");
        assert_eq!(lines[4], "Total Vulnerabilities: 3");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(12), "12 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }
}
