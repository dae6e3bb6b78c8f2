use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stress-cause tags the analyzer is asked to classify into.
pub const STRESS_TAGS: [&str; 7] = [
    "#personal", "#friends", "#family", "#work", "#study", "#health", "#other",
];

/// Allowed drift when checking that shares add up to 100.
const NORMALIZATION_TOLERANCE: f64 = 1.0;

/// Structured answer from the sentiment analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressAnalysis {
    /// Free-form advice (markdown)
    pub advice: String,

    /// Tag → percentage; should sum to 100
    #[serde(default, alias = "stress_analysis")]
    pub stress_analysis: BTreeMap<String, f64>,
}

impl StressAnalysis {
    /// Tags with a positive share, largest first.
    pub fn shares(&self) -> Vec<(&str, f64)> {
        let mut shares: Vec<(&str, f64)> = self
            .stress_analysis
            .iter()
            .filter(|(_, pct)| **pct > 0.0)
            .map(|(tag, pct)| (tag.as_str(), *pct))
            .collect();
        shares.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        shares
    }

    pub fn total(&self) -> f64 {
        self.stress_analysis.values().filter(|v| v.is_finite()).sum()
    }

    /// True when the shares add up to 100 (±1).
    pub fn is_normalized(&self) -> bool {
        (self.total() - 100.0).abs() <= NORMALIZATION_TOLERANCE
    }
}
