use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::vulnerability::{NO_DESCRIPTION, NO_EVIDENCE, NO_FIX, UNNAMED};
use crate::core::{SummaryCounts, Vulnerability, VulnerabilityGroups, text_or_none};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Base64 PNG payloads produced by the server's chart generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<String>,
}

impl Charts {
    pub fn data_uri(payload: &str) -> String {
        format!("{PNG_DATA_URI_PREFIX}{payload}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub summary: SummaryCounts,
    pub vulnerabilities: VulnerabilityGroups,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts: Option<Charts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Wire shape of a `POST /scan` success body. Every field may be missing, null or of the wrong
/// shape; anything unusable is treated as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanResponse {
    #[serde(default, deserialize_with = "lenient_object")]
    pub(crate) summary: Option<RawSummary>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub(crate) vulnerabilities: Option<RawGroups>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub(crate) charts: Option<RawCharts>,
    pub(crate) message: Option<Value>,
    pub(crate) error: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawSummary {
    pub(crate) total: Option<Value>,
    pub(crate) high_risk: Option<Value>,
    pub(crate) medium_risk: Option<Value>,
    pub(crate) low_risk: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawGroups {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) high: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) medium: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) low: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawVulnerability {
    pub(crate) name: Option<Value>,
    pub(crate) description: Option<Value>,
    pub(crate) evidence: Option<Value>,
    pub(crate) fix_recommendation: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawCharts {
    pub(crate) pie: Option<Value>,
    pub(crate) bar: Option<Value>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`], but only accepts JSON objects.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

impl ScanResponse {
    /// The logical failure the server reported despite a success status, if any.
    pub fn service_error(&self) -> Option<String> {
        text_or_none(self.error.as_ref())
    }

    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("expected a JSON object"));
        }
        serde_json::from_value(value)
    }
}

/// Overlays the server's partial data onto a fully populated default result.
pub fn merge_with_defaults(response: ScanResponse) -> ScanResult {
    let summary = response.summary.map(merge_summary).unwrap_or_default();
    let vulnerabilities = response.vulnerabilities.map(merge_groups).unwrap_or_default();
    let charts = response.charts.and_then(merge_charts);
    ScanResult {
        summary,
        vulnerabilities,
        charts,
        message: text_or_none(response.message.as_ref()),
    }
}

fn merge_summary(raw: RawSummary) -> SummaryCounts {
    SummaryCounts {
        total: count_or_zero(raw.total.as_ref()),
        high_risk: count_or_zero(raw.high_risk.as_ref()),
        medium_risk: count_or_zero(raw.medium_risk.as_ref()),
        low_risk: count_or_zero(raw.low_risk.as_ref()),
    }
}

fn count_or_zero(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn merge_groups(raw: RawGroups) -> VulnerabilityGroups {
    // An entry that is not an object has no fields, so it gets every placeholder.
    let merge = |list: Option<Vec<Value>>| -> Vec<Vulnerability> {
        list.unwrap_or_default()
            .into_iter()
            .map(|v| {
                let raw = if v.is_object() {
                    serde_json::from_value(v).unwrap_or_default()
                } else {
                    RawVulnerability::default()
                };
                merge_vulnerability(raw)
            })
            .collect()
    };
    VulnerabilityGroups {
        high: merge(raw.high),
        medium: merge(raw.medium),
        low: merge(raw.low),
    }
}

fn merge_vulnerability(raw: RawVulnerability) -> Vulnerability {
    let field = |v: Option<Value>, placeholder: &str| {
        text_or_none(v.as_ref()).unwrap_or_else(|| placeholder.to_string())
    };
    Vulnerability {
        name: field(raw.name, UNNAMED),
        description: field(raw.description, NO_DESCRIPTION),
        evidence: field(raw.evidence, NO_EVIDENCE),
        fix_recommendation: field(raw.fix_recommendation, NO_FIX),
    }
}

fn merge_charts(raw: RawCharts) -> Option<Charts> {
    let charts = Charts {
        pie: text_or_none(raw.pie.as_ref()),
        bar: text_or_none(raw.bar.as_ref()),
    };
    (charts.pie.is_some() || charts.bar.is_some()).then_some(charts)
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub server_ip: Option<String>,
}
