use serde::{Deserialize, Serialize};

use crate::core::Severity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total: u64,
    pub high_risk: u64,
    pub medium_risk: u64,
    pub low_risk: u64,
}

impl SummaryCounts {
    pub fn count(&self, severity: Severity) -> u64 {
        match severity {
            Severity::High => self.high_risk,
            Severity::Medium => self.medium_risk,
            Severity::Low => self.low_risk,
        }
    }
}
