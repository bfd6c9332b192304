use std::time::Duration;

use thiserror::Error;

pub const NO_RESULTS: &str = "No scan results available";

/// Failures talking to the scan server. Display strings are what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("{0}")]
    Network(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("{0}")]
    Body(String),
}

/// Terminal failure of a single controller operation. Always shown on the view before it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("{0}")]
    Validation(String),
    #[error("Error during scan: {0}")]
    Transport(#[from] TransportError),
    #[error("Error during scan: {0}")]
    Service(String),
    #[error("No scan results available")]
    ExportPrecondition,
    #[error("Error downloading report: {0}")]
    Export(String),
    #[error("a scan is already in progress")]
    Busy,
}
