//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) points are invalid.

use crate::domain::indicator::rolling::ema_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_ema(values: &[f64], period: usize) -> IndicatorSeries {
    assert!(period > 0, "EMA period must be positive");
    assert!(
        period <= values.len(),
        "EMA({period}) needs at least {period} values, got {}",
        values.len()
    );
    IndicatorSeries::from_tail(
        IndicatorType::Ema(period),
        values.len(),
        ema_values(values, period),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
        assert_eq!(series.value_or_zero(0), 0.0);
    }

    #[test]
    fn ema_period_1() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 1);

        assert_eq!(series.warmup(), 0);
        assert!((series.simple(0).unwrap() - 10.0).abs() < f64::EPSILON);
        assert!((series.simple(1).unwrap() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_seed_is_sma() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 3);
        let expected_sma = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((series.simple(2).unwrap() - expected_sma).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series.simple(3).unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((series.simple(4).unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_constant_series() {
        let series = calculate_ema(&[100.0; 8], 3);
        for i in 2..8 {
            assert!((series.simple(i).unwrap() - 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_indicator_type() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 5);
        assert_eq!(series.indicator_type, IndicatorType::Ema(5));
    }

    #[test]
    #[should_panic(expected = "needs at least")]
    fn ema_period_longer_than_input() {
        calculate_ema(&[10.0, 20.0], 3);
    }
}
