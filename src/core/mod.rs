mod mode;
mod request;
mod result;
mod severity;
mod summary;
mod vulnerability;

pub use mode::ScanMode;
pub use request::ScanRequest;
pub use result::{Charts, HealthStatus, ScanResponse, ScanResult, merge_with_defaults};
pub use severity::Severity;
pub use summary::SummaryCounts;
pub use vulnerability::{Vulnerability, VulnerabilityGroups};

/// Reads a loosely typed JSON field as text. Absent, `null`, `false`, `0` and empty strings are
/// treated as missing.
pub(crate) fn text_or_none(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(false) => None,
        serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
