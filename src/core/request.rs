use serde::Serialize;

use crate::core::ScanMode;
use crate::error::ScanError;

/// Body of `POST /scan`. Only obtainable through [`ScanRequest::new`], so the URL is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    url: String,
    mode: ScanMode,
}

impl ScanRequest {
    /// Trims `url` and fails with `required_message` when nothing is left.
    pub fn new(url: &str, mode: &str, required_message: &str) -> Result<Self, ScanError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ScanError::Validation(required_message.to_string()));
        }
        let mode = mode.parse::<ScanMode>().map_err(ScanError::Validation)?;
        Ok(Self {
            url: url.to_string(),
            mode,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_url() {
        let req = ScanRequest::new("  http://example.com \n", "quick", "URL is required").unwrap();
        assert_eq!(req.url(), "http://example.com");
        assert_eq!(req.mode(), ScanMode::Quick);
    }

    #[test]
    fn whitespace_only_url_uses_given_message() {
        let err = ScanRequest::new(" \t ", "passive", "Please enter a URL").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a URL");
    }

    #[test]
    fn serializes_as_url_and_mode() {
        let req = ScanRequest::new("http://example.com", "active", "URL is required").unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"url": "http://example.com", "mode": "active"})
        );
    }
}
