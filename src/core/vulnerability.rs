use serde::{Deserialize, Serialize};

use crate::core::Severity;

pub const UNNAMED: &str = "Unnamed Vulnerability";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_EVIDENCE: &str = "No evidence available";
pub const NO_FIX: &str = "No fix recommendation available";

/// A finding with every field populated; missing server fields carry their placeholder text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub name: String,
    pub description: String,
    pub evidence: String,
    pub fix_recommendation: String,
}

impl Default for Vulnerability {
    fn default() -> Self {
        Self {
            name: UNNAMED.to_string(),
            description: NO_DESCRIPTION.to_string(),
            evidence: NO_EVIDENCE.to_string(),
            fix_recommendation: NO_FIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityGroups {
    pub high: Vec<Vulnerability>,
    pub medium: Vec<Vulnerability>,
    pub low: Vec<Vulnerability>,
}

impl VulnerabilityGroups {
    pub fn get(&self, severity: Severity) -> &[Vulnerability] {
        match severity {
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
