//! Luck percentile helpers.
//!
//! The cost engine reports where an actual spend falls in the distribution of
//! simulated outcomes (0 = cheapest possible, 100 = most expensive). These
//! helpers turn that into signed percentages and qualitative ratings.

use serde::{Deserialize, Serialize};

/// Upper percentile bound (inclusive) for each rating tier below the last.
pub const LUCK_TIER_BOUNDS: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LuckRating {
    Exceptional,
    Great,
    Good,
    BelowAverage,
    Poor,
    WorstCase,
}

impl LuckRating {
    pub fn from_percentile(percentile: f64) -> Self {
        let tiers = [
            LuckRating::Exceptional,
            LuckRating::Great,
            LuckRating::Good,
            LuckRating::BelowAverage,
            LuckRating::Poor,
        ];
        LUCK_TIER_BOUNDS
            .iter()
            .zip(tiers)
            .find(|(bound, _)| percentile <= **bound)
            .map(|(_, rating)| rating)
            .unwrap_or(LuckRating::WorstCase)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LuckRating::Exceptional => "exceptional luck",
            LuckRating::Great => "great luck",
            LuckRating::Good => "better than average",
            LuckRating::BelowAverage => "below average luck",
            LuckRating::Poor => "poor luck",
            LuckRating::WorstCase => "worst-case RNG",
        }
    }
}

/// Signed luck percentage from an engine percentile: negative is lucky,
/// positive unlucky, both scaled to -100..=100.
pub fn luck_percentage(percentile: f64) -> f64 {
    if percentile <= 50.0 {
        -(50.0 - percentile) * 2.0
    } else {
        (percentile - 50.0) * 2.0
    }
}

/// Human description of a signed luck percentage.
pub fn describe_luck_percentage(percentage: f64) -> String {
    if percentage.abs() < 0.5 {
        "right on average".to_string()
    } else if percentage < 0.0 {
        format!("{:.0}% luckier than average", percentage.abs())
    } else {
        format!("{:.0}% unluckier than average", percentage)
    }
}

/// Percent over (positive) or under (negative) expected spend. Zero unless
/// both totals are positive.
pub fn spend_deviation_percentage(total_actual: f64, total_expected: f64) -> f64 {
    if total_actual > 0.0 && total_expected > 0.0 {
        (total_actual - total_expected) / total_expected * 100.0
    } else {
        0.0
    }
}
