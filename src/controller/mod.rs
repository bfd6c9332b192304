use time::OffsetDateTime;
use tracing::{info, warn};

use crate::backend::ScanBackend;
use crate::core::{ScanRequest, ScanResponse, merge_with_defaults};
use crate::error::{ScanError, TransportError};
use crate::export::PdfExportRequest;
use crate::state::UiState;
use crate::view::View;

/// Which UI element started a scan. Only the empty-URL message differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The standalone "start scan" action.
    Generic,
    /// Submission of the wizard form.
    Form,
}

impl SubmitTrigger {
    pub const fn required_message(self) -> &'static str {
        match self {
            SubmitTrigger::Generic => "URL is required",
            SubmitTrigger::Form => "Please enter a URL",
        }
    }
}

/// Owns the UI state and drives a [`View`] against a [`ScanBackend`].
pub struct Controller<B, V> {
    state: UiState,
    backend: B,
    view: V,
}

impl<B: ScanBackend, V: View> Controller<B, V> {
    pub fn new(backend: B, view: V) -> Self {
        Self {
            state: UiState::default(),
            backend,
            view,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn advance(&mut self, step: usize) {
        crate::wizard::advance(&mut self.state, &mut self.view, step);
    }

    pub fn retreat(&mut self, step: usize) {
        crate::wizard::retreat(&mut self.state, &mut self.view, step);
    }

    /// Runs a whole submission. Any error has already been shown on the view when it is returned.
    pub async fn submit(&mut self, trigger: SubmitTrigger) -> Result<(), ScanError> {
        let request = self.begin_submit(trigger)?;
        let outcome = self.backend.scan(&request).await;
        self.finish_submit(outcome)
    }

    /// Validates the form and switches the view into its loading state. On success the caller
    /// must send the request and pass the outcome to [`Controller::finish_submit`].
    pub fn begin_submit(&mut self, trigger: SubmitTrigger) -> Result<ScanRequest, ScanError> {
        if self.state.is_in_flight() {
            warn!(?trigger, "scan already in progress; submission ignored");
            let err = ScanError::Busy;
            self.view.show_error(&err.to_string());
            return Err(err);
        }

        let request = match ScanRequest::new(
            &self.view.url_value(),
            &self.view.mode_value(),
            trigger.required_message(),
        ) {
            Ok(request) => request,
            Err(err) => {
                self.view.set_loading(false);
                self.view.show_error(&err.to_string());
                return Err(err);
            }
        };

        self.view.clear_results();
        self.view.hide_error();
        self.view.set_loading(true);
        self.state.set_in_flight(true);
        info!(target_url = request.url(), mode = %request.mode(), "starting scan");
        Ok(request)
    }

    /// Leaves the loading state and renders `outcome`. Safe to call for every exit path of the
    /// request, including abandoned ones reported as transport failures.
    pub fn finish_submit(
        &mut self,
        outcome: Result<ScanResponse, TransportError>,
    ) -> Result<(), ScanError> {
        self.view.set_loading(false);
        self.state.set_in_flight(false);

        let response = match outcome {
            Ok(response) => response,
            Err(err) => return Err(self.fail(ScanError::Transport(err))),
        };
        if let Some(message) = response.service_error() {
            return Err(self.fail(ScanError::Service(message)));
        }

        let result = merge_with_defaults(response);
        info!(
            total = result.summary.total,
            high = result.summary.high_risk,
            medium = result.summary.medium_risk,
            low = result.summary.low_risk,
            "scan completed"
        );
        crate::render::render(&mut self.state, &mut self.view, result);
        Ok(())
    }

    fn fail(&mut self, err: ScanError) -> ScanError {
        warn!(error = %err, "scan failed");
        self.view.show_error(&err.to_string());
        err
    }

    pub fn export_text(&mut self, now: OffsetDateTime) -> Result<(), ScanError> {
        crate::export::export_text(&self.state, &mut self.view, now)
    }

    pub async fn export_pdf(&mut self, now: OffsetDateTime) -> Result<(), ScanError> {
        crate::export::export_pdf(&self.state, &mut self.view, &self.backend, now).await
    }

    /// First half of [`Controller::export_pdf`] for callers that send the request themselves.
    pub fn begin_export_pdf(&mut self) -> Result<PdfExportRequest, ScanError> {
        crate::export::begin_pdf_export(&self.state, &mut self.view)
    }

    pub fn finish_export_pdf(
        &mut self,
        outcome: Result<Vec<u8>, TransportError>,
        now: OffsetDateTime,
    ) -> Result<(), ScanError> {
        crate::export::finish_pdf_export(&mut self.view, outcome, now)
    }
}
