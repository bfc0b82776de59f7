//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A series of indicator values, index-aligned with its input
//!
//! Every series has the same length as its input. Leading warm-up points carry
//! `valid == false` and a zero value; consumers read through [`IndicatorSeries::get`]
//! which returns `None` for them.

pub mod atr;
pub mod awesome;
pub mod ema;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stoch_rsi;
pub mod supertrend;
pub mod trix;
pub mod williams_r;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    SuperTrend {
        /// +1 uptrend, -1 downtrend, 0 during warm-up.
        direction: i8,
        upper: f64,
        lower: f64,
    },
}

impl IndicatorValue {
    /// Scalar reading; SuperTrend maps to its direction.
    pub fn as_f64(&self) -> f64 {
        match self {
            IndicatorValue::Simple(v) => *v,
            IndicatorValue::SuperTrend { direction, .. } => f64::from(*direction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    WilliamsR(usize),
    StochRsi {
        stoch_window: usize,
        rsi_period: usize,
    },
    StochRsiK {
        rsi_period: usize,
        stoch_period: usize,
        k_smooth: usize,
        d_smooth: usize,
    },
    StochRsiD {
        rsi_period: usize,
        stoch_period: usize,
        k_smooth: usize,
        d_smooth: usize,
    },
    Trix {
        length: usize,
        signal: usize,
    },
    Awesome {
        fast: usize,
        slow: usize,
    },
    SuperTrend {
        atr_period: usize,
        multiplier_x100: u32,
    },
}

impl IndicatorType {
    /// SuperTrend key from a float multiplier, stored in hundredths so the key stays hashable.
    pub fn supertrend(atr_period: usize, multiplier: f64) -> Self {
        IndicatorType::SuperTrend {
            atr_period,
            multiplier_x100: (multiplier * 100.0).round() as u32,
        }
    }

    /// Whether `multiplier` is a positive whole number of hundredths, i.e. the
    /// SuperTrend key computes its bands from exactly this value.
    pub fn supertrend_multiplier_is_exact(multiplier: f64) -> bool {
        let scaled = multiplier * 100.0;
        let rounded = scaled.round();
        rounded >= 1.0 && rounded <= u32::MAX as f64 && (scaled - rounded).abs() < 1e-6
    }

    /// Awesome Oscillator key with the shorter window first.
    pub fn awesome(fast: usize, slow: usize) -> Self {
        IndicatorType::Awesome {
            fast: fast.min(slow),
            slow: fast.max(slow),
        }
    }

    /// Smallest number of bars for which the series has at least one valid point.
    pub fn min_bars(&self) -> usize {
        match *self {
            IndicatorType::Sma(p) | IndicatorType::Ema(p) | IndicatorType::WilliamsR(p) => p,
            IndicatorType::Rsi(p) | IndicatorType::Atr(p) => p + 1,
            IndicatorType::StochRsi {
                stoch_window,
                rsi_period,
            } => rsi_period + stoch_window,
            IndicatorType::StochRsiK {
                rsi_period,
                stoch_period,
                k_smooth,
                ..
            } => (rsi_period + stoch_period + k_smooth).saturating_sub(1),
            IndicatorType::StochRsiD {
                rsi_period,
                stoch_period,
                k_smooth,
                d_smooth,
            } => (rsi_period + stoch_period + k_smooth + d_smooth).saturating_sub(2),
            IndicatorType::Trix { length, signal } => (3 * length + signal).saturating_sub(2),
            IndicatorType::Awesome { fast, slow } => fast.max(slow),
            IndicatorType::SuperTrend { atr_period, .. } => atr_period + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Build a series of length `len` whose last `tail.len()` points are valid.
    pub fn from_tail(indicator_type: IndicatorType, len: usize, tail: Vec<f64>) -> Self {
        assert!(tail.len() <= len, "{indicator_type}: tail longer than input");
        let warmup = len - tail.len();
        let mut values = Vec::with_capacity(len);
        values.extend((0..warmup).map(|_| IndicatorPoint::warmup()));
        values.extend(tail.into_iter().map(|v| IndicatorPoint {
            valid: true,
            value: IndicatorValue::Simple(v),
        }));
        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    /// A series with no valid point.
    pub fn unavailable(indicator_type: IndicatorType, len: usize) -> Self {
        Self::from_tail(indicator_type, len, Vec::new())
    }

    /// Prepend `count` warm-up points, shifting the series onto a longer timeline.
    pub fn left_pad(mut self, count: usize) -> Self {
        if count > 0 {
            let mut values = Vec::with_capacity(self.values.len() + count);
            values.extend((0..count).map(|_| IndicatorPoint::warmup()));
            values.append(&mut self.values);
            self.values = values;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the first valid point, or `len()` if none is valid.
    pub fn warmup(&self) -> usize {
        self.values
            .iter()
            .position(|p| p.valid)
            .unwrap_or(self.values.len())
    }

    pub fn get(&self, index: usize) -> Option<IndicatorValue> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn simple(&self, index: usize) -> Option<f64> {
        self.get(index).map(|v| v.as_f64())
    }

    /// Raw reading with warm-up points translated to `0.0`.
    pub fn value_or_zero(&self, index: usize) -> f64 {
        self.simple(index).unwrap_or(0.0)
    }
}

impl IndicatorPoint {
    pub fn warmup() -> Self {
        IndicatorPoint {
            valid: false,
            value: IndicatorValue::Simple(0.0),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::WilliamsR(period) => write!(f, "WILLR({})", period),
            IndicatorType::StochRsi {
                stoch_window,
                rsi_period,
            } => write!(f, "STOCHRSI({},{})", stoch_window, rsi_period),
            IndicatorType::StochRsiK {
                rsi_period,
                stoch_period,
                k_smooth,
                d_smooth,
            } => write!(
                f,
                "STOCHRSI_K({},{},{},{})",
                rsi_period, stoch_period, k_smooth, d_smooth
            ),
            IndicatorType::StochRsiD {
                rsi_period,
                stoch_period,
                k_smooth,
                d_smooth,
            } => write!(
                f,
                "STOCHRSI_D({},{},{},{})",
                rsi_period, stoch_period, k_smooth, d_smooth
            ),
            IndicatorType::Trix { length, signal } => write!(f, "TRIX({},{})", length, signal),
            IndicatorType::Awesome { fast, slow } => write!(f, "AO({},{})", fast, slow),
            IndicatorType::SuperTrend {
                atr_period,
                multiplier_x100,
            } => {
                let mult = *multiplier_x100 as f64 / 100.0;
                write!(f, "SUPERTREND({},{})", atr_period, mult)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supertrend_multiplier_must_be_whole_hundredths() {
        assert!(IndicatorType::supertrend_multiplier_is_exact(3.0));
        assert!(IndicatorType::supertrend_multiplier_is_exact(2.35));
        assert!(IndicatorType::supertrend_multiplier_is_exact(0.01));
        assert!(!IndicatorType::supertrend_multiplier_is_exact(2.345));
        assert!(!IndicatorType::supertrend_multiplier_is_exact(0.004));
        assert!(!IndicatorType::supertrend_multiplier_is_exact(0.0));
        assert!(!IndicatorType::supertrend_multiplier_is_exact(-1.0));
        assert!(!IndicatorType::supertrend_multiplier_is_exact(f64::NAN));
    }

    #[test]
    fn indicator_type_display_ema() {
        assert_eq!(IndicatorType::Ema(20).to_string(), "EMA(20)");
    }

    #[test]
    fn indicator_type_display_stoch_rsi_k() {
        let k = IndicatorType::StochRsiK {
            rsi_period: 14,
            stoch_period: 14,
            k_smooth: 3,
            d_smooth: 3,
        };
        assert_eq!(k.to_string(), "STOCHRSI_K(14,14,3,3)");
    }

    #[test]
    fn indicator_type_display_supertrend() {
        assert_eq!(
            IndicatorType::supertrend(10, 3.0).to_string(),
            "SUPERTREND(10,3)"
        );
        assert_eq!(
            IndicatorType::supertrend(10, 2.5).to_string(),
            "SUPERTREND(10,2.5)"
        );
    }

    #[test]
    fn awesome_key_is_order_independent() {
        assert_eq!(IndicatorType::awesome(34, 5), IndicatorType::awesome(5, 34));
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        let ema20 = IndicatorType::Ema(20);
        let trix = IndicatorType::Trix {
            length: 9,
            signal: 21,
        };

        map.insert(ema20, "ema20_series".to_string());
        map.insert(trix, "trix_series".to_string());

        assert_eq!(map.get(&IndicatorType::Ema(20)), Some(&"ema20_series".to_string()));
        assert_eq!(map.get(&trix), Some(&"trix_series".to_string()));
        assert_eq!(map.get(&IndicatorType::Ema(21)), None);
    }

    #[test]
    fn from_tail_marks_warmup() {
        let series = IndicatorSeries::from_tail(IndicatorType::Sma(3), 5, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 5);
        assert_eq!(series.warmup(), 2);
        assert_eq!(series.get(1), None);
        assert_eq!(series.value_or_zero(1), 0.0);
        assert_eq!(series.simple(2), Some(1.0));
        assert_eq!(series.simple(4), Some(3.0));
        assert_eq!(series.simple(5), None);
    }

    #[test]
    fn left_pad_shifts_values() {
        let series = IndicatorSeries::from_tail(IndicatorType::Sma(1), 2, vec![7.0, 8.0]).left_pad(3);
        assert_eq!(series.len(), 5);
        assert_eq!(series.warmup(), 3);
        assert_eq!(series.simple(3), Some(7.0));
    }

    #[test]
    fn unavailable_has_no_valid_points() {
        let series = IndicatorSeries::unavailable(IndicatorType::Rsi(14), 4);
        assert_eq!(series.len(), 4);
        assert_eq!(series.warmup(), 4);
        assert!(series.values.iter().all(|p| p.value == IndicatorValue::Simple(0.0)));
    }

    #[test]
    fn min_bars_matches_warmup_plus_one() {
        assert_eq!(IndicatorType::Ema(10).min_bars(), 10);
        assert_eq!(IndicatorType::Rsi(14).min_bars(), 15);
        assert_eq!(
            IndicatorType::Trix {
                length: 3,
                signal: 2
            }
            .min_bars(),
            9
        );
    }
}
