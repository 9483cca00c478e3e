use crate::canon::CanonicalUrl;
use crate::issue::Issue;
use serde::{Deserialize, Serialize};

pub const BASE_SCORE: i32 = 100;
pub const MIN_SCORE: i32 = 20;

/// Per-page score: base 100, reduced by the sum of scored issue weights, floored
/// at 20. Reported-only issues still appear in `issues` but contribute 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageScore {
    pub url: CanonicalUrl,
    pub base: i32,
    pub penalty_total: i32,
    pub final_score: i32,
    pub issues: Vec<Issue>,
}

impl PageScore {
    pub fn compute(url: CanonicalUrl, issues: Vec<Issue>) -> Self {
        let penalty_total: i32 = issues.iter().map(|i| i.weight).sum();
        let final_score = (BASE_SCORE + penalty_total).max(MIN_SCORE);
        Self {
            url,
            base: BASE_SCORE,
            penalty_total,
            final_score,
            issues,
        }
    }
}
