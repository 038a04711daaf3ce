//! Calculation tests: batching, positional attribution, rollup, sorting.

use starforce_planner::calculation::{
    CalculationAggregator, CalculationInputs, CalculationState, GlobalModifiers, ItemSettings,
    SortField, SortSpec, SpareStatus,
};
use starforce_planner::character::{save_roster, SavedRoster};
use starforce_planner::engine::{
    BulkCalculationRequest, CalculationResult, CostEngine, EventModifiers, LuckAnalysis,
};
use starforce_planner::equipment::{ConcreteSlot, Equipment, EquipmentType};
use starforce_planner::error::EngineError;
use starforce_planner::format::MesoAmount;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Engine double: records every request and answers from a queue of
/// per-position costs.
struct MockEngine {
    requests: RefCell<Vec<BulkCalculationRequest>>,
    costs: Vec<f64>,
    percentiles: Vec<Option<f64>>,
    fail: Cell<bool>,
}

impl MockEngine {
    fn with_costs(costs: Vec<f64>) -> Self {
        let percentiles = vec![None; costs.len()];
        Self {
            requests: RefCell::new(Vec::new()),
            costs,
            percentiles,
            fail: Cell::new(false),
        }
    }

    fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl CostEngine for MockEngine {
    fn calculate_bulk(
        &self,
        request: &BulkCalculationRequest,
    ) -> Result<Vec<CalculationResult>, EngineError> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail.get() {
            return Err(EngineError::Status {
                code: 503,
                body: "engine offline".to_string(),
            });
        }
        Ok(request
            .items
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let cost = self.costs.get(i).copied().unwrap_or(0.0);
                CalculationResult {
                    average_cost: cost,
                    median_cost: cost * 0.8,
                    percentile75_cost: cost * 1.25,
                    average_spare_count: cost / 1e9,
                    median_spare_count: 0.0,
                    percentile75_spare_count: (cost / 1e9).ceil(),
                    luck_analysis: self
                        .percentiles
                        .get(i)
                        .copied()
                        .flatten()
                        .map(|percentile| LuckAnalysis {
                            percentile,
                            luck_rating: None,
                            description: None,
                        }),
                }
            })
            .collect())
    }
}

fn item_a() -> Equipment {
    Equipment::new("a", "Zakum Helmet", ConcreteSlot::Hat, 150, EquipmentType::Armor)
        .with_stars(0, 17)
}

fn item_b() -> Equipment {
    let mut eq = Equipment::new("b", "Arcane Cape", ConcreteSlot::Cape, 200, EquipmentType::Armor)
        .with_stars(15, 22);
    eq.safeguard = true;
    eq
}

fn pair_inputs() -> CalculationInputs {
    CalculationInputs {
        equipment: vec![item_a(), item_b()],
        ..Default::default()
    }
}

fn costs_by_id(agg: &CalculationAggregator) -> Vec<(String, f64)> {
    agg.report()
        .unwrap()
        .calculations
        .iter()
        .map(|c| (c.equipment.id.clone(), c.average_cost))
        .collect()
}

// =========================================================================
// Batching and attribution
// =========================================================================

#[test]
fn test_pair_is_one_engine_call() {
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&pair_inputs(), &engine);

    assert_eq!(engine.calls(), 1);
    let requests = engine.requests.borrow();
    let items = &requests[0].items;
    assert_eq!(items.len(), 2);
    assert_eq!(
        (items[0].item_level, items[0].from_star, items[0].to_star, items[0].safeguard_enabled),
        (150, 0, 17, false)
    );
    assert_eq!(
        (items[1].item_level, items[1].from_star, items[1].to_star, items[1].safeguard_enabled),
        (200, 15, 22, true)
    );
}

#[test]
fn test_results_attributed_by_position_not_name() {
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    let mut agg = CalculationAggregator::new();
    agg.set_sort(Some(SortSpec::asc(SortField::Name)));
    agg.recalculate(&pair_inputs(), &engine);

    // Arcane sorts before Zakum, but result[0] still belongs to A
    let rows = costs_by_id(&agg);
    assert_eq!(rows[0], ("b".to_string(), 5e9));
    assert_eq!(rows[1], ("a".to_string(), 1e9));
}

#[test]
fn test_non_pending_items_stay_out_of_request() {
    let done = Equipment::new("done", "Finished Belt", ConcreteSlot::Belt, 150, EquipmentType::Armor)
        .with_stars(17, 17);
    let inputs = CalculationInputs {
        equipment: vec![done, item_a(), item_b()],
        ..Default::default()
    };
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&inputs, &engine);

    assert_eq!(engine.requests.borrow()[0].items.len(), 2);
    let ids: Vec<String> = costs_by_id(&agg).into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_modifiers_and_spares_reach_request() {
    let modifiers = GlobalModifiers {
        is_interactive: true,
        events: EventModifiers {
            thirty_off: true,
            star_catching: true,
            mvp_discount: 0.1,
            ..Default::default()
        },
    };
    let inputs = pair_inputs().with_modifiers(modifiers).with_settings(
        "a",
        ItemSettings {
            spare_count: 3,
            spare_price: MesoAmount::millions(250.0),
            ..Default::default()
        },
    );
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    CalculationAggregator::new().recalculate(&inputs, &engine);

    let requests = engine.requests.borrow();
    assert!(requests[0].is_interactive);
    assert!(requests[0].events.thirty_off);
    assert!(!requests[0].events.five_ten_fifteen);
    assert_eq!(requests[0].items[0].spare_count, 3);
    assert_eq!(requests[0].items[0].spare_cost, 250_000_000);
}

// =========================================================================
// Rollup and inclusion
// =========================================================================

#[test]
fn test_total_counts_only_included_items() {
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    let mut agg = CalculationAggregator::new();

    agg.refresh(&pair_inputs(), &engine);
    let all = agg.report().unwrap().stats;
    assert!((all.total_expected_cost - 6e9).abs() < 1.0);
    assert_eq!(all.included_count, 2);

    let without_b = pair_inputs().with_settings(
        "b",
        ItemSettings {
            safeguard: true,
            included: Some(false),
            ..Default::default()
        },
    );
    agg.refresh(&without_b, &engine);
    let partial = agg.report().unwrap().stats;
    assert!((all.total_expected_cost - partial.total_expected_cost - 5e9).abs() < 1.0);
    assert!((all.total_expected_booms - partial.total_expected_booms - 5.0).abs() < 1e-9);
    assert_eq!(partial.included_count, 1);
    assert_eq!(partial.total_count, 2);
    // Excluded rows are still listed
    assert_eq!(agg.report().unwrap().calculations.len(), 2);
    assert_eq!(engine.calls(), 1);
}

#[test]
fn test_spare_status_and_breakdown() {
    let inputs = pair_inputs().with_settings(
        "b",
        ItemSettings {
            safeguard: true,
            spare_count: 2,
            spare_price: MesoAmount::billions(1.0),
            ..Default::default()
        },
    );
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&inputs, &engine);

    let report = agg.report().unwrap();
    let b = report.calculations.iter().find(|c| c.equipment.id == "b").unwrap();
    assert_eq!(b.spare_status, SpareStatus::Insufficient);
    assert!((b.spare_cost_breakdown.average_spare_cost - 5e9).abs() < 1.0);
    assert!((b.spare_cost_breakdown.average_total() - 10e9).abs() < 1.0);

    let a = report.calculations.iter().find(|c| c.equipment.id == "a").unwrap();
    assert_eq!(a.spare_status, SpareStatus::NoneAvailable);
}

#[test]
fn test_overall_luck_weighted_by_spend() {
    let mut engine = MockEngine::with_costs(vec![1e9, 5e9]);
    engine.percentiles = vec![Some(20.0), Some(80.0)];
    let inputs = pair_inputs()
        .with_settings(
            "a",
            ItemSettings {
                actual_cost: Some(MesoAmount::billions(1.0)),
                ..Default::default()
            },
        )
        .with_settings(
            "b",
            ItemSettings {
                safeguard: true,
                actual_cost: Some(MesoAmount::billions(3.0)),
                ..Default::default()
            },
        );
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&inputs, &engine);

    let stats = agg.report().unwrap().stats;
    let luck = stats.overall_luck.unwrap();
    assert!((luck.percentile - 65.0).abs() < 1e-9);
    assert_eq!(luck.items_considered, 2);
    assert!((stats.total_actual_cost - 4e9).abs() < 1.0);
    assert!((stats.overall_luck_percentage - (4e9 - 6e9) / 6e9 * 100.0).abs() < 1e-9);
}

// =========================================================================
// Sorting
// =========================================================================

#[test]
fn test_desc_then_asc_are_exact_reversals() {
    let equipment: Vec<Equipment> = (0..6)
        .map(|i| {
            Equipment::new(
                format!("eq{}", i),
                format!("Item {}", i),
                ConcreteSlot::Hat,
                160,
                EquipmentType::Armor,
            )
            .with_stars(0, 10 + i)
        })
        .collect();
    let inputs = CalculationInputs {
        equipment,
        ..Default::default()
    };
    let engine = MockEngine::with_costs(vec![3e9, 1e9, 6e9, 2e9, 5e9, 4e9]);
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&inputs, &engine);

    agg.set_sort(Some(SortSpec::desc(SortField::AverageCost)));
    let desc = costs_by_id(&agg);
    agg.set_sort(Some(SortSpec::asc(SortField::AverageCost)));
    let mut asc = costs_by_id(&agg);

    asc.reverse();
    assert_eq!(desc, asc);
    assert_eq!(desc[0].1, 6e9);
    assert_eq!(engine.calls(), 1);
}

#[test]
fn test_desc_then_asc_reverse_exactly_with_ties() {
    let equipment: Vec<Equipment> = (0..4)
        .map(|i| {
            Equipment::new(
                format!("eq{}", i),
                format!("Item {}", i),
                ConcreteSlot::Hat,
                160,
                EquipmentType::Armor,
            )
            .with_stars(0, 17)
        })
        .collect();
    let inputs = CalculationInputs {
        equipment,
        ..Default::default()
    };
    let engine = MockEngine::with_costs(vec![2e9, 1e9, 2e9, 1e9]);
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&inputs, &engine);

    agg.set_sort(Some(SortSpec::desc(SortField::AverageCost)));
    let desc: Vec<String> = costs_by_id(&agg).into_iter().map(|(id, _)| id).collect();
    agg.set_sort(Some(SortSpec::asc(SortField::AverageCost)));
    let asc: Vec<String> = costs_by_id(&agg).into_iter().map(|(id, _)| id).collect();

    assert_eq!(asc, vec!["eq1", "eq3", "eq0", "eq2"]);
    assert_eq!(desc, vec!["eq2", "eq0", "eq3", "eq1"]);
    let reversed: Vec<String> = asc.into_iter().rev().collect();
    assert_eq!(desc, reversed);
}

#[test]
fn test_sort_does_not_change_totals() {
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&pair_inputs(), &engine);
    let before = agg.report().unwrap().stats;

    agg.set_sort(Some(SortSpec::desc(SortField::Level)));
    assert_eq!(agg.report().unwrap().stats, before);
}

// =========================================================================
// Failure and retry
// =========================================================================

#[test]
fn test_failure_then_manual_retry() {
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    engine.fail.set(true);
    let mut agg = CalculationAggregator::new();

    let state = agg.recalculate(&pair_inputs(), &engine).clone();
    assert!(matches!(state, CalculationState::Failed { .. }));
    assert!(agg.error().unwrap().contains("503"));
    assert!(agg.report().is_none());

    engine.fail.set(false);
    agg.recalculate(&pair_inputs(), &engine);
    assert_eq!(agg.state(), &CalculationState::Ready);
    assert!(agg.error().is_none());
    assert_eq!(engine.calls(), 2);
}

#[test]
fn test_refresh_after_failure_calls_engine_again() {
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    engine.fail.set(true);
    let mut agg = CalculationAggregator::new();
    agg.refresh(&pair_inputs(), &engine);
    engine.fail.set(false);
    agg.refresh(&pair_inputs(), &engine);

    assert_eq!(engine.calls(), 2);
    assert_eq!(agg.state(), &CalculationState::Ready);
}

// =========================================================================
// Saved roster into a calculation
// =========================================================================

fn temp_roster_path() -> PathBuf {
    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);
    let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!("starforce-calc-test-{}-{}", std::process::id(), test_id))
        .join("roster.json")
}

#[test]
fn test_saved_roster_feeds_calculation() {
    let path = temp_roster_path();
    let mut saved = SavedRoster::open(&path).unwrap();
    let character_id = saved
        .update(|roster| {
            let id = roster.add_character("Alpha");
            roster.add_equipment(&id, item_a())?;
            roster.add_virtual_equipment(&id, item_b())?;
            Ok(id)
        })
        .unwrap();

    let reopened = SavedRoster::open(&path).unwrap();
    let character = reopened.roster().character(&character_id).unwrap();
    let inputs = CalculationInputs::for_character(character);
    let engine = MockEngine::with_costs(vec![1e9, 5e9]);
    let mut agg = CalculationAggregator::new();
    agg.recalculate(&inputs, &engine);

    let report = agg.report().unwrap();
    assert_eq!(report.calculations.len(), 2);
    assert!(report.calculations[1].safeguard);
    assert!((report.stats.total_expected_cost - 6e9).abs() < 1.0);

    let mut roster = reopened.roster().clone();
    save_roster(&path, &mut roster).unwrap();
    assert!(roster.saved_at.is_some());
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
