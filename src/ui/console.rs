use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget};

use crate::export::{Download, save_download};
use crate::render::{SeveritySection, SummaryBlock};
use crate::ui::{UiConfig, format_bytes, section_lines, summary_lines};
use crate::view::{ChartSlot, View};

/// Line-oriented view for one-shot commands: results on stdout, status on stderr.
pub struct ConsoleView {
    cfg: UiConfig,
    url: String,
    mode: String,
    output_dir: PathBuf,
    print_results: bool,
    spinner: Option<ProgressBar>,
    results: Vec<String>,
}

impl ConsoleView {
    pub fn new(cfg: UiConfig, url: String, mode: String, output_dir: PathBuf) -> Self {
        Self {
            cfg,
            url,
            mode,
            output_dir,
            print_results: true,
            spinner: None,
            results: Vec::new(),
        }
    }

    /// Keeps results off stdout, for `--json` output.
    pub fn without_results(mut self) -> Self {
        self.print_results = false;
        self
    }
}

impl View for ConsoleView {
    fn url_value(&self) -> String {
        self.url.clone()
    }

    fn mode_value(&self) -> String {
        self.mode.clone()
    }

    fn set_panel_visible(&mut self, step: usize, _visible: bool) -> bool {
        step == 1
    }

    fn reset_form(&mut self) {
        self.url.clear();
    }

    fn set_loading(&mut self, loading: bool) {
        if !loading {
            if let Some(pb) = self.spinner.take() {
                pb.finish_and_clear();
            }
            return;
        }
        if self.spinner.is_some() || self.cfg.quiet || !self.cfg.stderr_is_tty {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_message(format!("Scanning {} ...", self.url.trim()));
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(pb);
    }

    fn show_error(&mut self, message: &str) {
        let _ = writeln!(io::stderr().lock(), "error: {message}");
    }

    fn hide_error(&mut self) {}

    fn show_alert(&mut self, message: &str) {
        let _ = writeln!(io::stderr().lock(), "alert: {message}");
    }

    fn clear_results(&mut self) {
        self.results.clear();
    }

    fn append_summary(&mut self, summary: &SummaryBlock) {
        self.results.extend(summary_lines(summary, self.cfg.color));
    }

    fn append_section(&mut self, section: &SeveritySection) {
        self.results.extend(section_lines(section, self.cfg.color));
    }

    fn reveal_results(&mut self) {
        if !self.print_results || self.cfg.quiet {
            return;
        }
        let mut out = io::stdout().lock();
        for line in &self.results {
            let _ = writeln!(out, "{line}");
        }
    }

    fn hide_results(&mut self) {}

    fn set_chart(&mut self, _slot: ChartSlot, _data_uri: &str) -> bool {
        false
    }

    fn deliver_download(&mut self, download: Download) -> io::Result<()> {
        let path = save_download(&self.output_dir, &download)?;
        if !self.cfg.quiet {
            let _ = writeln!(
                io::stderr().lock(),
                "saved: {} ({})",
                path.display(),
                format_bytes(download.bytes.len() as u64)
            );
        }
        Ok(())
    }
}
