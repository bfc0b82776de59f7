//! Window primitives shared by the indicator implementations.
//!
//! Each helper works on a slice of valid values and returns only the points it
//! can compute: `input.len() - period + 1` values, or none when the slice is
//! shorter than `period`. Callers turn the result into a full-length series with
//! [`IndicatorSeries::from_tail`](super::IndicatorSeries::from_tail).

use std::collections::VecDeque;

/// Trailing simple mean. Each window is summed on its own so a window of
/// zeros averages to exactly zero.
pub fn sma_values(input: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || input.len() < period {
        return Vec::new();
    }
    input
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}

/// EMA with k = 2/(period+1), seeded with the mean of the first `period` values.
pub fn ema_values(input: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || input.len() < period {
        return Vec::new();
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(input.len() - period + 1);
    let mut ema = input[..period].iter().sum::<f64>() / period as f64;
    out.push(ema);
    for &value in &input[period..] {
        ema = value * k + ema * (1.0 - k);
        out.push(ema);
    }
    out
}

pub fn rolling_min(input: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(input, period, |candidate, held| candidate <= held)
}

pub fn rolling_max(input: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(input, period, |candidate, held| candidate >= held)
}

/// Monotonic-deque window extreme. `dominates(a, b)` is true when `a` evicts `b`.
fn rolling_extreme(input: &[f64], period: usize, dominates: impl Fn(f64, f64) -> bool) -> Vec<f64> {
    if period == 0 || input.len() < period {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(input.len() - period + 1);
    let mut window: VecDeque<usize> = VecDeque::with_capacity(period);
    for (i, &value) in input.iter().enumerate() {
        while window.back().is_some_and(|&j| dominates(value, input[j])) {
            window.pop_back();
        }
        window.push_back(i);
        if window.front().is_some_and(|&j| j + period <= i) {
            window.pop_front();
        }
        if i + 1 >= period {
            if let Some(&j) = window.front() {
                out.push(input[j]);
            }
        }
    }
    out
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
