use serde::{Deserialize, Serialize};

/// Global event modifiers applied to every item in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventModifiers {
    pub thirty_off: bool,
    pub five_ten_fifteen: bool,
    pub star_catching: bool,
    /// Fractional discount, e.g. 0.05 for 5%
    pub mvp_discount: f64,
}

/// One item in a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationItem {
    pub item_level: u32,
    pub from_star: u32,
    pub to_star: u32,
    pub safeguard_enabled: bool,
    pub spare_count: u32,
    /// Raw mesos per spare
    pub spare_cost: u64,
    /// Raw mesos already spent; 0 when not tracked
    pub actual_cost: u64,
    pub item_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCalculationRequest {
    pub is_interactive: bool,
    pub events: EventModifiers,
    pub items: Vec<CalculationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LuckAnalysis {
    /// Where the actual spend sits among simulated outcomes, 0-100
    pub percentile: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luck_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Engine output for one request item. Matched to its item by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub average_cost: f64,
    pub median_cost: f64,
    pub percentile75_cost: f64,
    pub average_spare_count: f64,
    pub median_spare_count: f64,
    pub percentile75_spare_count: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luck_analysis: Option<LuckAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCalculationResponse {
    pub results: Vec<CalculationResult>,
}
