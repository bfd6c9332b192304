use std::io;
use std::path::PathBuf;

use crate::core::ScanMode;
use crate::export::{Download, save_download};
use crate::render::{SeveritySection, SummaryBlock};
use crate::view::{ChartSlot, View};

pub(crate) const PANEL_COUNT: usize = 3;

/// Widget state for the terminal wizard. Drawing reads it; the controller writes it.
#[derive(Debug)]
pub(crate) struct TuiView {
    pub(crate) panels: [bool; PANEL_COUNT],
    pub(crate) url: String,
    pub(crate) mode: ScanMode,
    pub(crate) default_mode: ScanMode,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) alert: Option<String>,
    pub(crate) notice: Option<String>,
    pub(crate) summary: Option<SummaryBlock>,
    pub(crate) sections: Vec<SeveritySection>,
    pub(crate) results_visible: bool,
    pub(crate) results_scroll: u16,
    pub(crate) pie_chart: Option<usize>,
    pub(crate) bar_chart: Option<usize>,
    pub(crate) output_dir: PathBuf,
}

impl TuiView {
    pub(crate) fn new(default_mode: ScanMode, output_dir: PathBuf) -> Self {
        Self {
            panels: [true, false, false],
            url: String::new(),
            mode: default_mode,
            default_mode,
            loading: false,
            error: None,
            alert: None,
            notice: None,
            summary: None,
            sections: Vec::new(),
            results_visible: false,
            results_scroll: 0,
            pie_chart: None,
            bar_chart: None,
            output_dir,
        }
    }

    /// The single visible panel, if any.
    pub(crate) fn visible_panel(&self) -> Option<usize> {
        self.panels.iter().position(|on| *on).map(|idx| idx + 1)
    }
}

impl View for TuiView {
    fn url_value(&self) -> String {
        self.url.clone()
    }

    fn mode_value(&self) -> String {
        self.mode.as_str().to_string()
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
        self.mode = self.default_mode;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn hide_error(&mut self) {
        self.error = None;
    }

    fn show_alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }

    fn clear_results(&mut self) {
        self.summary = None;
        self.sections.clear();
        self.pie_chart = None;
        self.bar_chart = None;
        self.results_scroll = 0;
    }

    fn append_summary(&mut self, summary: &SummaryBlock) {
        self.summary = Some(summary.clone());
    }

    fn append_section(&mut self, section: &SeveritySection) {
        self.sections.push(section.clone());
    }

    fn reveal_results(&mut self) {
        self.results_visible = true;
        self.results_scroll = 0;
    }

    fn hide_results(&mut self) {
        self.results_visible = false;
    }

    fn set_chart(&mut self, slot: ChartSlot, data_uri: &str) -> bool {
        let len = data_uri.len();
        match slot {
            ChartSlot::Pie => self.pie_chart = Some(len),
            ChartSlot::Bar => self.bar_chart = Some(len),
        }
        true
    }

    fn deliver_download(&mut self, download: Download) -> io::Result<()> {
        let path = save_download(&self.output_dir, &download)?;
        self.notice = Some(format!("Saved {}", path.display()));
        Ok(())
    }
}
