use serde::Serialize;
use tracing::debug;

use crate::core::{Charts, ScanResult, Severity, SummaryCounts, Vulnerability, VulnerabilityGroups};
use crate::state::UiState;
use crate::view::{ChartSlot, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportAction {
    TextReport,
    PdfReport,
}

impl ExportAction {
    pub const fn label(self) -> &'static str {
        match self {
            ExportAction::TextReport => "Download Text Report",
            ExportAction::PdfReport => "Download PDF Report",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryBlock {
    pub counts: SummaryCounts,
    pub actions: Vec<ExportAction>,
}

impl SummaryBlock {
    pub fn new(counts: SummaryCounts) -> Self {
        Self {
            counts,
            actions: vec![ExportAction::TextReport, ExportAction::PdfReport],
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["Scan Summary".to_string()];
        for severity in Severity::ALL {
            lines.push(format!(
                "  {}: {}",
                severity.label(),
                self.counts.count(severity)
            ));
        }
        lines.push(format!("Total Vulnerabilities: {}", self.counts.total));
        let buttons: Vec<String> = self
            .actions
            .iter()
            .map(|a| format!("[{}]", a.label()))
            .collect();
        lines.push(buttons.join(" "));
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeveritySection {
    pub severity: Severity,
    pub cards: Vec<Vulnerability>,
}

impl SeveritySection {
    pub fn title(&self) -> &'static str {
        self.severity.section_title()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![String::new(), self.title().to_string()];
        for card in &self.cards {
            lines.extend(card_lines(card));
        }
        lines
    }
}

pub fn card_lines(card: &Vulnerability) -> Vec<String> {
    vec![
        format!("  {}", card.name),
        format!("    Description: {}", card.description),
        format!("    Evidence: {}", card.evidence),
        format!("    Fix: {}", card.fix_recommendation),
    ]
}

/// One section per non-empty severity level, in high/medium/low order.
pub fn sections(groups: &VulnerabilityGroups) -> Vec<SeveritySection> {
    Severity::ALL
        .into_iter()
        .filter_map(|severity| {
            let cards = groups.get(severity);
            (!cards.is_empty()).then(|| SeveritySection {
                severity,
                cards: cards.to_vec(),
            })
        })
        .collect()
}

/// Replaces the results area with `result` and keeps it as the session's latest result.
pub fn render<V: View>(state: &mut UiState, view: &mut V, result: ScanResult) {
    view.clear_results();

    view.append_summary(&SummaryBlock::new(result.summary));
    let sections = sections(&result.vulnerabilities);
    for section in &sections {
        view.append_section(section);
    }
    debug!(
        sections = sections.len(),
        vulnerabilities = result.vulnerabilities.len(),
        "rendered scan result"
    );

    view.reveal_results();

    if let Some(charts) = &result.charts {
        set_charts(view, charts);
    }

    state.retain(result);
}

fn set_charts<V: View>(view: &mut V, charts: &Charts) {
    let slots = [(ChartSlot::Pie, &charts.pie), (ChartSlot::Bar, &charts.bar)];
    for (slot, payload) in slots {
        let Some(payload) = payload else { continue };
        if !view.set_chart(slot, &Charts::data_uri(payload)) {
            debug!(?slot, "view has no chart slot");
        }
    }
}
