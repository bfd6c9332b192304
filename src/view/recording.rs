use std::io;

use crate::export::Download;
use crate::render::{SeveritySection, SummaryBlock};
use crate::view::{ChartSlot, View};

/// In-memory view that records everything the controller does to it.
#[derive(Debug, Clone)]
pub struct RecordingView {
    pub url: String,
    pub mode: String,
    /// Index 0 is step 1.
    pub panels: Vec<bool>,
    pub form_resets: usize,
    pub loading: bool,
    pub loading_shown: usize,
    pub error: Option<String>,
    pub alerts: Vec<String>,
    pub summary: Option<SummaryBlock>,
    pub sections: Vec<SeveritySection>,
    pub results_visible: bool,
    pub chart_slots: bool,
    pub pie_chart: Option<String>,
    pub bar_chart: Option<String>,
    pub downloads: Vec<Download>,
    pub fail_downloads: bool,
}

impl RecordingView {
    pub fn new(panel_count: usize) -> Self {
        let mut panels = vec![false; panel_count];
        if let Some(first) = panels.first_mut() {
            *first = true;
        }
        Self {
            url: String::new(),
            mode: "passive".to_string(),
            panels,
            form_resets: 0,
            loading: false,
            loading_shown: 0,
            error: None,
            alerts: Vec::new(),
            summary: None,
            sections: Vec::new(),
            results_visible: false,
            chart_slots: true,
            pie_chart: None,
            bar_chart: None,
            downloads: Vec::new(),
            fail_downloads: false,
        }
    }

    pub fn with_input(mut self, url: &str, mode: &str) -> Self {
        self.url = url.to_string();
        self.mode = mode.to_string();
        self
    }

    pub fn visible_panels(&self) -> Vec<usize> {
        self.panels
            .iter()
            .enumerate()
            .filter_map(|(idx, on)| on.then_some(idx + 1))
            .collect()
    }

    /// Everything the results area would display, one line per entry.
    pub fn rendered_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(summary) = &self.summary {
            lines.extend(summary.lines());
        }
        for section in &self.sections {
            lines.extend(section.lines());
        }
        lines.join("\n")
    }
}

impl View for RecordingView {
    fn url_value(&self) -> String {
        self.url.clone()
    }

    fn mode_value(&self) -> String {
        self.mode.clone()
    }

    fn set_panel_visible(&mut self, step: usize, visible: bool) -> bool {
        match step.checked_sub(1).and_then(|idx| self.panels.get_mut(idx)) {
            Some(panel) => {
                *panel = visible;
                true
            }
            None => false,
        }
    }

    fn reset_form(&mut self) {
        self.url.clear();
        self.mode = "passive".to_string();
        self.form_resets += 1;
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            self.loading_shown += 1;
        }
        self.loading = loading;
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn hide_error(&mut self) {
        self.error = None;
    }

    fn show_alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn clear_results(&mut self) {
        self.summary = None;
        self.sections.clear();
    }

    fn append_summary(&mut self, summary: &SummaryBlock) {
        self.summary = Some(summary.clone());
    }

    fn append_section(&mut self, section: &SeveritySection) {
        self.sections.push(section.clone());
    }

    fn reveal_results(&mut self) {
        self.results_visible = true;
    }

    fn hide_results(&mut self) {
        self.results_visible = false;
    }

    fn set_chart(&mut self, slot: ChartSlot, data_uri: &str) -> bool {
        if !self.chart_slots {
            return false;
        }
        let target = match slot {
            ChartSlot::Pie => &mut self.pie_chart,
            ChartSlot::Bar => &mut self.bar_chart,
        };
        *target = Some(data_uri.to_string());
        true
    }

    fn deliver_download(&mut self, download: Download) -> io::Result<()> {
        if self.fail_downloads {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.downloads.push(download);
        Ok(())
    }
}
