use crate::character::Character;
use crate::engine::EventModifiers;
use crate::equipment::Equipment;
use crate::format::MesoAmount;
use crate::luck::LuckRating;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Spares at or above this multiple of expected booms count as excess.
pub const EXCESS_SPARE_FACTOR: f64 = 1.5;

/// Per-item settings the user edits alongside the calculation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSettings {
    pub safeguard: bool,
    pub spare_count: u32,
    pub spare_price: MesoAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<MesoAmount>,
    /// Counted in the rollup unless explicitly `Some(false)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<bool>,
}

impl ItemSettings {
    /// Settings seeded from the tracking fields on the record itself.
    pub fn from_equipment(equipment: &Equipment) -> Self {
        Self {
            safeguard: equipment.safeguard,
            actual_cost: equipment.actual_cost,
            ..Default::default()
        }
    }

    pub fn is_included(&self) -> bool {
        self.included != Some(false)
    }

    /// Raw actual spend, `None` when nothing was recorded.
    pub fn actual_cost_raw(&self) -> Option<u64> {
        self.actual_cost
            .map(|amount| amount.to_raw())
            .filter(|raw| *raw > 0)
    }
}

/// Modifiers that apply to the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalModifiers {
    pub is_interactive: bool,
    pub events: EventModifiers,
}

/// Everything one aggregation pass reads. A snapshot; the pass never writes
/// back into it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalculationInputs {
    pub equipment: Vec<Equipment>,
    /// Keyed by equipment id; missing entries fall back to the record's own
    /// tracking fields
    pub settings: HashMap<String, ItemSettings>,
    pub modifiers: GlobalModifiers,
}

impl CalculationInputs {
    /// Equipped and virtual items of a character.
    pub fn for_character(character: &Character) -> Self {
        Self {
            equipment: character
                .equipment
                .iter()
                .chain(character.virtual_equipment.iter())
                .cloned()
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_modifiers(mut self, modifiers: GlobalModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_settings(mut self, equipment_id: impl Into<String>, settings: ItemSettings) -> Self {
        self.settings.insert(equipment_id.into(), settings);
        self
    }

    pub fn settings_for(&self, equipment: &Equipment) -> ItemSettings {
        self.settings
            .get(&equipment.id)
            .cloned()
            .unwrap_or_else(|| ItemSettings::from_equipment(equipment))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpareStatus {
    NoneNeeded,
    NoneAvailable,
    Insufficient,
    Adequate,
    Excess,
}

impl SpareStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SpareStatus::NoneNeeded => "none needed",
            SpareStatus::NoneAvailable => "no spares",
            SpareStatus::Insufficient => "insufficient",
            SpareStatus::Adequate => "adequate",
            SpareStatus::Excess => "excess",
        }
    }
}

/// Enhancement cost next to the cost of replacing boomed items with spares.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpareCostBreakdown {
    pub enhancement_cost: f64,
    pub average_spare_cost: f64,
    pub median_spare_cost: f64,
    pub p75_spare_cost: f64,
}

impl SpareCostBreakdown {
    pub fn average_total(&self) -> f64 {
        self.enhancement_cost + self.average_spare_cost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLuck {
    /// Engine percentile of the actual spend
    pub percentile: f64,
    /// Negative is lucky, positive unlucky
    pub luck_percentage: f64,
    pub rating: LuckRating,
}

/// One pending item joined with its engine result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentCalculation {
    pub equipment: Equipment,
    pub average_cost: f64,
    pub median_cost: f64,
    pub p75_cost: f64,
    pub average_booms: f64,
    pub median_booms: f64,
    pub p75_booms: f64,
    pub luck: Option<ItemLuck>,
    pub spare_cost_breakdown: SpareCostBreakdown,
    pub spare_status: SpareStatus,
    pub spare_count: u32,
    pub safeguard: bool,
    pub actual_cost: Option<u64>,
    pub included: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallLuck {
    /// Spend-weighted average of item percentiles
    pub percentile: f64,
    pub rating: LuckRating,
    pub items_considered: usize,
}

/// Rollup over the included calculations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_expected_cost: f64,
    pub total_median_cost: f64,
    pub total_p75_cost: f64,
    pub total_expected_booms: f64,
    pub total_median_booms: f64,
    pub total_p75_booms: f64,
    pub total_actual_cost: f64,
    /// Percent over (positive) or under expected spend
    pub overall_luck_percentage: f64,
    pub overall_luck: Option<OverallLuck>,
    pub included_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Slot,
    Level,
    CurrentStars,
    TargetStars,
    AverageCost,
    MedianCost,
    P75Cost,
    AverageBooms,
    MedianBooms,
    P75Booms,
    Luck,
    ActualCost,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        let field = match s.trim().to_ascii_lowercase().as_str() {
            "name" => SortField::Name,
            "slot" => SortField::Slot,
            "level" => SortField::Level,
            "current" | "currentstars" => SortField::CurrentStars,
            "target" | "targetstars" => SortField::TargetStars,
            "cost" | "averagecost" => SortField::AverageCost,
            "median" | "mediancost" => SortField::MedianCost,
            "p75" | "p75cost" => SortField::P75Cost,
            "booms" | "averagebooms" => SortField::AverageBooms,
            "medianbooms" => SortField::MedianBooms,
            "p75booms" => SortField::P75Booms,
            "luck" => SortField::Luck,
            "actual" | "actualcost" => SortField::ActualCost,
            _ => return None,
        };
        Some(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Display-ready output of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    pub generation: u64,
    pub calculated_at: DateTime<Utc>,
    pub calculations: Vec<EquipmentCalculation>,
    pub stats: AggregateStats,
}
