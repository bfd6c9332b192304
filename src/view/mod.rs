//! The set of UI roles the controller drives. Every front-end binds its widgets once behind this
//! trait; the wizard, dispatcher, renderer and exporter never look anything up themselves.

use std::io;

use crate::export::Download;
use crate::render::{SeveritySection, SummaryBlock};

mod recording;

pub use recording::RecordingView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Pie,
    Bar,
}

pub trait View {
    /// Raw, untrimmed contents of the URL input.
    fn url_value(&self) -> String;

    fn mode_value(&self) -> String;

    /// Shows or hides the panel for a 1-based wizard step. Returns `false` when no such panel exists.
    fn set_panel_visible(&mut self, step: usize, visible: bool) -> bool;

    fn reset_form(&mut self);

    fn set_loading(&mut self, loading: bool);

    fn show_error(&mut self, message: &str);

    fn hide_error(&mut self);

    /// Modal notice, used by the server-generated export path.
    fn show_alert(&mut self, message: &str);

    fn clear_results(&mut self);

    fn append_summary(&mut self, summary: &SummaryBlock);

    fn append_section(&mut self, section: &SeveritySection);

    /// Makes the results area visible and brings it into view.
    fn reveal_results(&mut self);

    fn hide_results(&mut self);

    /// Returns `false` when the view has no such slot.
    fn set_chart(&mut self, slot: ChartSlot, data_uri: &str) -> bool;

    fn deliver_download(&mut self, download: Download) -> io::Result<()>;
}
