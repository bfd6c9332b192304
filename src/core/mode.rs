use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Passive,
    Active,
    Quick,
}

impl ScanMode {
    pub const ALL: [ScanMode; 3] = [ScanMode::Passive, ScanMode::Active, ScanMode::Quick];

    pub const fn as_str(self) -> &'static str {
        match self {
            ScanMode::Passive => "passive",
            ScanMode::Active => "active",
            ScanMode::Quick => "quick",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            ScanMode::Passive => "Observe responses only; no attack payloads are sent",
            ScanMode::Active => "Send test payloads to confirm injectable parameters",
            ScanMode::Quick => "Fast pass over the most common checks",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ScanMode::Passive => ScanMode::Active,
            ScanMode::Active => ScanMode::Quick,
            ScanMode::Quick => ScanMode::Passive,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ScanMode::Passive => ScanMode::Quick,
            ScanMode::Active => ScanMode::Passive,
            ScanMode::Quick => ScanMode::Active,
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passive" => Ok(ScanMode::Passive),
            "active" => Ok(ScanMode::Active),
            "quick" => Ok(ScanMode::Quick),
            other => Err(format!(
                "Unsupported scan mode: {other} (expected passive|active|quick)"
            )),
        }
    }
}
