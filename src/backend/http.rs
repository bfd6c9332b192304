use std::time::Duration;

use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;

use crate::backend::ScanBackend;
use crate::core::{HealthStatus, ScanRequest, ScanResponse, VulnerabilityGroups};
use crate::error::TransportError;

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    vulnerabilities: &'a VulnerabilityGroups,
    url: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("secuscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn map_err(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Network(err.to_string())
        }
    }

    /// Rejects non-2xx responses. A JSON `error` in the body is logged but the status wins.
    async fn check_status(&self, response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        if let Some(reason) = ScanResponse::from_json(&body)
            .ok()
            .and_then(|r| r.service_error())
        {
            debug!(status = status.as_u16(), %reason, "server rejected request");
        }
        Err(TransportError::Status(status.as_u16()))
    }
}

impl ScanBackend for HttpBackend {
    async fn scan(&self, request: &ScanRequest) -> Result<ScanResponse, TransportError> {
        let url = self.endpoint("scan");
        debug!(%url, target = request.url(), mode = %request.mode(), "POST scan");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        let response = self.check_status(response).await?;
        let body = response.bytes().await.map_err(|err| self.map_err(err))?;
        debug!(bytes = body.len(), "scan response received");
        ScanResponse::from_json(&body).map_err(|err| TransportError::Body(err.to_string()))
    }

    async fn download_report(
        &self,
        vulnerabilities: &VulnerabilityGroups,
        url: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let endpoint = self.endpoint("download_report");
        debug!(%endpoint, findings = vulnerabilities.len(), "POST download_report");
        let response = self
            .client
            .post(&endpoint)
            .json(&ReportRequest {
                vulnerabilities,
                url,
            })
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        let response = self.check_status(response).await?;
        let body = response.bytes().await.map_err(|err| self.map_err(err))?;
        Ok(body.to_vec())
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        let response = self.check_status(response).await?;
        response
            .json::<HealthStatus>()
            .await
            .map_err(|err| TransportError::Body(err.to_string()))
    }
}
