use super::types::*;
use crate::engine::{BulkCalculationRequest, CalculationItem, CalculationResult};
use crate::equipment::Equipment;
use crate::luck::{luck_percentage, spend_deviation_percentage, LuckRating};
use std::cmp::Ordering;

/// Items that still need stars, in input order.
pub fn pending_items(equipment: &[Equipment]) -> Vec<Equipment> {
    equipment.iter().filter(|eq| eq.is_pending()).cloned().collect()
}

/// One batch entry per item, in the same order as `items`.
pub fn build_request(
    items: &[Equipment],
    settings: &[ItemSettings],
    modifiers: &GlobalModifiers,
) -> BulkCalculationRequest {
    let entries = items
        .iter()
        .zip(settings)
        .map(|(eq, s)| CalculationItem {
            item_level: eq.level,
            from_star: eq.current_star_force,
            to_star: eq.target_star_force,
            safeguard_enabled: s.safeguard,
            spare_count: s.spare_count,
            spare_cost: s.spare_price.to_raw(),
            actual_cost: s.actual_cost_raw().unwrap_or(0),
            item_name: eq.name.clone(),
        })
        .collect();

    BulkCalculationRequest {
        is_interactive: modifiers.is_interactive,
        events: modifiers.events,
        items: entries,
    }
}

/// Compare held spares against expected booms.
pub fn classify_spares(spare_count: u32, expected_booms: f64) -> SpareStatus {
    if expected_booms <= 0.0 {
        return SpareStatus::NoneNeeded;
    }
    if spare_count == 0 {
        return SpareStatus::NoneAvailable;
    }
    let spares = spare_count as f64;
    if spares < expected_booms.ceil() {
        SpareStatus::Insufficient
    } else if spares >= (expected_booms * EXCESS_SPARE_FACTOR).ceil() {
        SpareStatus::Excess
    } else {
        SpareStatus::Adequate
    }
}

pub fn spare_cost_breakdown(result: &CalculationResult, spare_price: u64) -> SpareCostBreakdown {
    let price = spare_price as f64;
    SpareCostBreakdown {
        enhancement_cost: result.average_cost,
        average_spare_cost: result.average_spare_count * price,
        median_spare_cost: result.median_spare_count * price,
        p75_spare_cost: result.percentile75_spare_count * price,
    }
}

pub fn build_calculation(
    equipment: &Equipment,
    settings: &ItemSettings,
    result: &CalculationResult,
) -> EquipmentCalculation {
    let luck = result.luck_analysis.as_ref().map(|analysis| ItemLuck {
        percentile: analysis.percentile,
        luck_percentage: luck_percentage(analysis.percentile),
        rating: LuckRating::from_percentile(analysis.percentile),
    });

    EquipmentCalculation {
        equipment: equipment.clone(),
        average_cost: result.average_cost,
        median_cost: result.median_cost,
        p75_cost: result.percentile75_cost,
        average_booms: result.average_spare_count,
        median_booms: result.median_spare_count,
        p75_booms: result.percentile75_spare_count,
        luck,
        spare_cost_breakdown: spare_cost_breakdown(result, settings.spare_price.to_raw()),
        spare_status: classify_spares(settings.spare_count, result.average_spare_count),
        spare_count: settings.spare_count,
        safeguard: settings.safeguard,
        actual_cost: settings.actual_cost_raw(),
        included: settings.is_included(),
    }
}

/// Join items with results by position. Callers guarantee equal lengths.
pub fn fold_results(
    items: &[Equipment],
    settings: &[ItemSettings],
    results: &[CalculationResult],
) -> Vec<EquipmentCalculation> {
    items
        .iter()
        .zip(settings)
        .zip(results)
        .map(|((eq, s), r)| build_calculation(eq, s, r))
        .collect()
}

enum SortKey {
    Text(String),
    Number(f64),
    Missing,
}

fn sort_key(calc: &EquipmentCalculation, field: SortField) -> SortKey {
    match field {
        SortField::Name => SortKey::Text(calc.equipment.name.to_lowercase()),
        SortField::Slot => SortKey::Text(calc.equipment.slot.key().to_string()),
        SortField::Level => SortKey::Number(calc.equipment.level as f64),
        SortField::CurrentStars => SortKey::Number(calc.equipment.current_star_force as f64),
        SortField::TargetStars => SortKey::Number(calc.equipment.target_star_force as f64),
        SortField::AverageCost => SortKey::Number(calc.average_cost),
        SortField::MedianCost => SortKey::Number(calc.median_cost),
        SortField::P75Cost => SortKey::Number(calc.p75_cost),
        SortField::AverageBooms => SortKey::Number(calc.average_booms),
        SortField::MedianBooms => SortKey::Number(calc.median_booms),
        SortField::P75Booms => SortKey::Number(calc.p75_booms),
        SortField::Luck => calc
            .luck
            .map(|l| SortKey::Number(l.luck_percentage))
            .unwrap_or(SortKey::Missing),
        SortField::ActualCost => calc
            .actual_cost
            .map(|c| SortKey::Number(c as f64))
            .unwrap_or(SortKey::Missing),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => Ordering::Less,
        (_, SortKey::Missing) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Stable sort by one field. Strings compare case-insensitively. Descending
/// is the exact reverse of ascending, so tied rows flip too and missing
/// values end up last.
pub fn sort_calculations(calculations: &mut [EquipmentCalculation], spec: SortSpec) {
    calculations.sort_by(|a, b| compare_keys(&sort_key(a, spec.field), &sort_key(b, spec.field)));
    if spec.direction == SortDirection::Desc {
        calculations.reverse();
    }
}

/// Spend-weighted average of item percentiles over calculations that have
/// both a recorded spend and a percentile.
pub fn weighted_luck<'a>(
    calculations: impl IntoIterator<Item = &'a EquipmentCalculation>,
) -> Option<OverallLuck> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut items_considered = 0;

    for calc in calculations {
        if let (Some(actual), Some(luck)) = (calc.actual_cost, calc.luck) {
            let weight = actual as f64;
            weighted_sum += luck.percentile * weight;
            total_weight += weight;
            items_considered += 1;
        }
    }

    if total_weight <= 0.0 {
        return None;
    }
    let percentile = weighted_sum / total_weight;
    Some(OverallLuck {
        percentile,
        rating: LuckRating::from_percentile(percentile),
        items_considered,
    })
}

/// Roll up the calculations whose inclusion flag is set.
pub fn aggregate(calculations: &[EquipmentCalculation]) -> AggregateStats {
    let included: Vec<&EquipmentCalculation> =
        calculations.iter().filter(|c| c.included).collect();

    let sum = |f: fn(&EquipmentCalculation) -> f64| included.iter().map(|c| f(c)).sum::<f64>();

    let total_expected_cost = sum(|c| c.average_cost);
    let total_actual_cost = sum(|c| c.actual_cost.unwrap_or(0) as f64);

    AggregateStats {
        total_expected_cost,
        total_median_cost: sum(|c| c.median_cost),
        total_p75_cost: sum(|c| c.p75_cost),
        total_expected_booms: sum(|c| c.average_booms),
        total_median_booms: sum(|c| c.median_booms),
        total_p75_booms: sum(|c| c.p75_booms),
        total_actual_cost,
        overall_luck_percentage: spend_deviation_percentage(total_actual_cost, total_expected_cost),
        overall_luck: weighted_luck(included.iter().copied()),
        included_count: included.len(),
        total_count: calculations.len(),
    }
}
