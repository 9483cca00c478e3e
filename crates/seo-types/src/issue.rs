use crate::canon::CanonicalUrl;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Onpage,
}

/// A single rule finding on a single URL. `threshold_note` carries the measured
/// value that tripped a threshold rule (e.g. "title length 29"), for diagnostics;
/// it is not part of the closed catalog's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub code: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub url: CanonicalUrl,
    pub message: String,
    pub threshold_note: Option<String>,
    /// Signed penalty this occurrence contributes; 0 for reported-only codes.
    pub weight: i32,
}

impl Issue {
    /// Whether this occurrence belongs to the closed, weighted catalog rather
    /// than the reported-only set (§4.5). Every scored catalog row carries a
    /// non-zero weight, so this doubles as the "has a real severity" check.
    pub fn is_scored(&self) -> bool {
        self.weight != 0
    }
}
