//! Simple Moving Average indicator.
//!
//! Mean of the trailing `n` values. Warmup: first (n-1) points are invalid.

use crate::domain::indicator::rolling::sma_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_sma(values: &[f64], period: usize) -> IndicatorSeries {
    assert!(period > 0, "SMA period must be positive");
    assert!(
        period <= values.len(),
        "SMA({period}) needs at least {period} values, got {}",
        values.len()
    );
    IndicatorSeries::from_tail(
        IndicatorType::Sma(period),
        values.len(),
        sma_values(values, period),
    )
}
