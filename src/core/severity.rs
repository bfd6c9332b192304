use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Rendering and report order.
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::High => "High Risk",
            Severity::Medium => "Medium Risk",
            Severity::Low => "Low Risk",
        }
    }

    pub const fn section_title(self) -> &'static str {
        match self {
            Severity::High => "High Risk Vulnerabilities",
            Severity::Medium => "Medium Risk Vulnerabilities",
            Severity::Low => "Low Risk Vulnerabilities",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
