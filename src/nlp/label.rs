//! Closed label set and per-sentence classification outcome.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Semantic classes a report sentence can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    None,
    Delay,
    Risk,
    MaterialShortage,
}

impl Label {
    /// Every label in training index order.
    pub const ALL: [Label; 4] = [
        Label::None,
        Label::Delay,
        Label::Risk,
        Label::MaterialShortage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Delay => "delay",
            Self::Risk => "risk",
            Self::MaterialShortage => "material_shortage",
        }
    }

    /// Position in [`Label::ALL`], used as the numeric training target.
    pub fn index(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Delay => 1,
            Self::Risk => 2,
            Self::MaterialShortage => 3,
        }
    }

    /// Only these labels ever become flags.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Fixed remediation text attached to flags.
    pub fn suggested_action(&self) -> &'static str {
        match self {
            Self::Delay => "Update schedule and notify client. Review dependencies.",
            Self::Risk => "Log in issues register. Schedule follow-up inspection.",
            Self::MaterialShortage => "Check stock levels. Contact supplier for delivery timeline.",
            Self::None => "Review and take action.",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown label '{s}'"))
    }
}

/// Label and probability produced for one sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn new(label: Label, confidence: f64) -> Self {
        Self { label, confidence }
    }

    /// Check if the confidence clears a threshold.
    pub fn exceeds_threshold(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}
