//! Memoized indicator series shared across simulation runs.
//!
//! Keys are `(asset index, IndicatorType)`. The map lock is held only to find or
//! insert the per-key cell; computation happens inside that cell's `OnceLock`, so
//! each series is computed once while other keys stay available to other workers.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::trace;

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::compute_indicator;
use crate::domain::price_series::MarketData;

type Cell = Arc<OnceLock<Arc<IndicatorSeries>>>;

#[derive(Debug, Default)]
pub struct IndicatorStore {
    cells: RwLock<HashMap<(usize, IndicatorType), Cell>>,
}

impl IndicatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &self,
        data: &MarketData,
        asset: usize,
        kind: IndicatorType,
    ) -> Arc<IndicatorSeries> {
        let cell = self.cell(asset, kind);
        cell.get_or_init(|| {
            trace!(asset = %data.series[asset].asset, indicator = %kind, "computing indicator");
            Arc::new(compute_indicator(&data.series[asset], kind))
        })
        .clone()
    }

    /// Number of series computed so far.
    pub fn len(&self) -> usize {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, asset: usize, kind: IndicatorType) -> Cell {
        let key = (asset, kind);
        if let Some(cell) = self
            .cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(cell);
        }
        let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(key).or_default())
    }
}
