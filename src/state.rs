use crate::core::ScanResult;

/// Controller-owned UI state for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    current_step: usize,
    retained: Option<ScanResult>,
    in_flight: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_step: 1,
            retained: None,
            in_flight: false,
        }
    }
}

impl UiState {
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// The latest scan result, kept for later export.
    pub fn retained(&self) -> Option<&ScanResult> {
        self.retained.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn set_current_step(&mut self, step: usize) {
        self.current_step = step;
    }

    pub(crate) fn retain(&mut self, result: ScanResult) {
        self.retained = Some(result);
    }

    pub(crate) fn clear_retained(&mut self) {
        self.retained = None;
    }

    pub(crate) fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }
}
