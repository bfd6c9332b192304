use std::future::Future;

use crate::core::{HealthStatus, ScanRequest, ScanResponse, VulnerabilityGroups};
use crate::error::TransportError;

mod http;

pub use http::HttpBackend;

/// The scan server as seen by the controller.
pub trait ScanBackend {
    /// `POST /scan`. A success status with an `error` field is still `Ok`; the caller inspects it.
    fn scan(
        &self,
        request: &ScanRequest,
    ) -> impl Future<Output = Result<ScanResponse, TransportError>> + Send;

    /// `POST /download_report`. Returns the generated document.
    fn download_report(
        &self,
        vulnerabilities: &VulnerabilityGroups,
        url: &str,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// `GET /health`.
    fn health(&self) -> impl Future<Output = Result<HealthStatus, TransportError>> + Send;
}
