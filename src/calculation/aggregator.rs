use super::logic::{aggregate, build_request, fold_results, pending_items, sort_calculations};
use super::types::*;
use crate::engine::{check_result_count, BulkCalculationRequest, CalculationResult, CostEngine};
use crate::equipment::Equipment;
use crate::error::EngineError;
use tracing::{debug, info, warn};

/// Where the aggregator stands after its latest trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationState {
    /// Nothing pending, nothing to show
    Idle,
    /// A request is out; only the completion with this generation applies
    Calculating { generation: u64 },
    Ready,
    /// Terminal for the batch until the next trigger
    Failed { message: String },
}

/// A request handed out by [`CalculationAggregator::begin`], to be passed back
/// to [`CalculationAggregator::complete`] with the engine's answer.
#[derive(Debug, Clone)]
pub struct PendingCalculation {
    pub generation: u64,
    pub request: BulkCalculationRequest,
    items: Vec<Equipment>,
    settings: Vec<ItemSettings>,
}

/// Turns pending equipment into per-item projections and a rollup, one
/// engine round trip per pass.
///
/// Each trigger bumps a generation counter; a completion carrying an older
/// generation is dropped, so the last request issued is the one shown.
pub struct CalculationAggregator {
    generation: u64,
    state: CalculationState,
    sort: Option<SortSpec>,
    last_request: Option<BulkCalculationRequest>,
    items: Vec<Equipment>,
    settings: Vec<ItemSettings>,
    results: Vec<CalculationResult>,
    report: Option<CalculationReport>,
}

impl Default for CalculationAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculationAggregator {
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: CalculationState::Idle,
            sort: None,
            last_request: None,
            items: Vec::new(),
            settings: Vec::new(),
            results: Vec::new(),
            report: None,
        }
    }

    pub fn state(&self) -> &CalculationState {
        &self.state
    }

    pub fn report(&self) -> Option<&CalculationReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            CalculationState::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Change the sort and re-sort the current report from its unsorted base.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
        if self.report.is_some() {
            self.rebuild_report();
        }
    }

    /// Start a pass. Returns `None` (and goes idle) when nothing is pending.
    pub fn begin(&mut self, inputs: &CalculationInputs) -> Option<PendingCalculation> {
        self.generation += 1;
        let items = pending_items(&inputs.equipment);
        if items.is_empty() {
            debug!(generation = self.generation, "No pending items");
            self.clear();
            self.state = CalculationState::Idle;
            return None;
        }

        let settings: Vec<ItemSettings> = items.iter().map(|eq| inputs.settings_for(eq)).collect();
        let request = build_request(&items, &settings, &inputs.modifiers);
        debug!(generation = self.generation, items = items.len(), "Starting calculation");
        self.state = CalculationState::Calculating {
            generation: self.generation,
        };
        Some(PendingCalculation {
            generation: self.generation,
            request,
            items,
            settings,
        })
    }

    /// Apply an engine answer. Returns `false` when the answer is stale and
    /// was discarded.
    pub fn complete(
        &mut self,
        pending: PendingCalculation,
        outcome: Result<Vec<CalculationResult>, EngineError>,
    ) -> bool {
        if pending.generation != self.generation {
            debug!(
                stale = pending.generation,
                latest = self.generation,
                "Discarding stale calculation response"
            );
            return false;
        }

        let outcome = outcome.and_then(|results| check_result_count(pending.items.len(), results));
        match outcome {
            Ok(results) => {
                self.items = pending.items;
                self.settings = pending.settings;
                self.results = results;
                self.last_request = Some(pending.request);
                self.rebuild_report();
                self.state = CalculationState::Ready;
                info!(generation = self.generation, items = self.items.len(), "Calculation ready");
            }
            Err(err) => {
                warn!(generation = self.generation, error = %err, "Calculation failed");
                self.clear();
                self.state = CalculationState::Failed {
                    message: err.to_string(),
                };
            }
        }
        true
    }

    /// Recalculate only if the engine request would differ from the last
    /// successful one. Setting changes that never reach the engine (such as
    /// inclusion) are re-folded from cached results.
    pub fn refresh<E: CostEngine + ?Sized>(
        &mut self,
        inputs: &CalculationInputs,
        engine: &E,
    ) -> &CalculationState {
        if self.state == CalculationState::Ready {
            let items = pending_items(&inputs.equipment);
            let settings: Vec<ItemSettings> =
                items.iter().map(|eq| inputs.settings_for(eq)).collect();
            let request = build_request(&items, &settings, &inputs.modifiers);
            if !items.is_empty() && self.last_request.as_ref() == Some(&request) {
                debug!("Request unchanged, re-folding cached results");
                self.items = items;
                self.settings = settings;
                self.rebuild_report();
                return &self.state;
            }
        }
        self.recalculate(inputs, engine)
    }

    /// Always round-trip to the engine. Also the manual retry after a
    /// failure.
    pub fn recalculate<E: CostEngine + ?Sized>(
        &mut self,
        inputs: &CalculationInputs,
        engine: &E,
    ) -> &CalculationState {
        if let Some(pending) = self.begin(inputs) {
            let outcome = engine.calculate_bulk(&pending.request);
            self.complete(pending, outcome);
        }
        &self.state
    }

    fn clear(&mut self) {
        self.items.clear();
        self.settings.clear();
        self.results.clear();
        self.last_request = None;
        self.report = None;
    }

    fn rebuild_report(&mut self) {
        let mut calculations = fold_results(&self.items, &self.settings, &self.results);
        let stats = aggregate(&calculations);
        if let Some(sort) = self.sort {
            sort_calculations(&mut calculations, sort);
        }
        self.report = Some(CalculationReport {
            generation: self.generation,
            calculated_at: chrono::Utc::now(),
            calculations,
            stats,
        });
    }
}
