//! Performance metrics of one simulation run.
//!
//! Gain, win rate and drawdown come straight from the portfolio. The drawdown is
//! converted into the capital gain needed to recover from it (DDC), which is the
//! risk denominator of both the composite score and the calmar ratios.

use chrono::Datelike;

use super::calendar::{date_of, days_in_month, days_in_year};
use super::portfolio::{EquityPoint, Portfolio};

/// Calmar value reported when the equity curve is too short to bucket.
pub const CALMAR_SENTINEL: f64 = -100.0;

/// Fewer equity samples than this yield [`CALMAR_SENTINEL`].
pub const MIN_CALMAR_SAMPLES: usize = 4;

/// Floor for the DDC denominator; a run without drawdown divides by this instead of zero.
pub const MIN_DDC: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalmarPeriod {
    Yearly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    pub gain_pct: f64,
    pub win_rate_pct: f64,
    /// Worst peak-to-sample decline, in percent (≤ 0).
    pub max_drawdown_pct: f64,
    pub ddc: f64,
    pub score: f64,
    pub calmar_ratio: f64,
    pub calmar_ratio_monthly: f64,
    pub gain_over_ddc: f64,
    pub trades_entered: usize,
    pub profitable_exits: usize,
    pub losing_exits: usize,
    pub total_fees: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio) -> Self {
        let initial_capital = portfolio.initial_capital;
        let final_equity = portfolio.final_equity();
        let gain_pct = gain_pct(initial_capital, final_equity);

        if portfolio.closed_trades.is_empty() {
            return Metrics::no_trades(portfolio, gain_pct);
        }

        let profitable_exits = portfolio.profitable_exits();
        let losing_exits = portfolio.losing_exits();
        let win_rate_pct =
            profitable_exits as f64 / (profitable_exits + losing_exits) as f64 * 100.0;

        let max_drawdown_pct = portfolio.max_drawdown_pct;
        let ddc = drawdown_converted_capital(max_drawdown_pct);
        let curve = &portfolio.equity_curve;

        Metrics {
            final_equity,
            gain_pct,
            win_rate_pct,
            max_drawdown_pct,
            ddc,
            score: compute_score(gain_pct, ddc, win_rate_pct),
            calmar_ratio: calmar_ratio(curve, initial_capital, ddc, CalmarPeriod::Yearly),
            calmar_ratio_monthly: calmar_ratio(curve, initial_capital, ddc, CalmarPeriod::Monthly),
            gain_over_ddc: gain_pct / ddc.max(MIN_DDC),
            trades_entered: portfolio.trades_entered,
            profitable_exits,
            losing_exits,
            total_fees: portfolio.total_fees,
        }
    }

    /// Result of a run that never closed a trade: ratios are pinned to their sentinels.
    fn no_trades(portfolio: &Portfolio, gain_pct: f64) -> Self {
        let ddc = drawdown_converted_capital(portfolio.max_drawdown_pct);
        Metrics {
            final_equity: portfolio.final_equity(),
            gain_pct,
            win_rate_pct: 0.0,
            max_drawdown_pct: portfolio.max_drawdown_pct,
            ddc,
            score: 0.0,
            calmar_ratio: CALMAR_SENTINEL,
            calmar_ratio_monthly: CALMAR_SENTINEL,
            gain_over_ddc: 0.0,
            trades_entered: portfolio.trades_entered,
            profitable_exits: 0,
            losing_exits: 0,
            total_fees: portfolio.total_fees,
        }
    }

    pub fn is_no_trades(&self) -> bool {
        self.profitable_exits + self.losing_exits == 0
    }
}

pub fn gain_pct(initial_capital: f64, final_equity: f64) -> f64 {
    if initial_capital > 0.0 {
        (final_equity - initial_capital) / initial_capital * 100.0
    } else {
        0.0
    }
}

/// DDC = (1 / (1 + dd/100) - 1) * 100, the gain needed to recover a drawdown of `dd` percent.
pub fn drawdown_converted_capital(max_drawdown_pct: f64) -> f64 {
    (1.0 / (1.0 + max_drawdown_pct / 100.0) - 1.0) * 100.0
}

/// score = gain / DDC * win rate, with DDC floored at [`MIN_DDC`].
pub fn compute_score(gain_pct: f64, ddc: f64, win_rate_pct: f64) -> f64 {
    gain_pct / ddc.max(MIN_DDC) * win_rate_pct
}

/// Average per-period return divided by DDC.
///
/// The curve is cut at every calendar boundary; each bucket's return is measured
/// from the equity at the previous boundary (starting with `initial_capital`) to
/// the first sample past the boundary, the last sample closing the final bucket.
/// The first and last returns are scaled by the fraction of their period the data
/// covers.
pub fn calmar_ratio(
    curve: &[EquityPoint],
    initial_capital: f64,
    ddc: f64,
    period: CalmarPeriod,
) -> f64 {
    if curve.len() < MIN_CALMAR_SAMPLES {
        return CALMAR_SENTINEL;
    }

    let bucket = |timestamp: i64| {
        let date = date_of(timestamp);
        match period {
            CalmarPeriod::Yearly => (date.year(), 0),
            CalmarPeriod::Monthly => (date.year(), date.month()),
        }
    };

    let last = curve.len() - 1;
    let mut boundaries = vec![initial_capital];
    for i in 1..curve.len() {
        if bucket(curve[i - 1].timestamp) != bucket(curve[i].timestamp) || i == last {
            boundaries.push(curve[i].equity);
        }
    }

    let mut changes: Vec<f64> = boundaries
        .windows(2)
        .map(|w| {
            if w[0] != 0.0 {
                (w[1] - w[0]) / w[0] * 100.0
            } else {
                0.0
            }
        })
        .collect();

    let (first_factor, last_factor) = coverage_factors(
        curve[0].timestamp,
        curve[last].timestamp,
        period,
    );
    if let Some(first) = changes.first_mut() {
        *first *= first_factor;
    }
    if let Some(final_change) = changes.last_mut() {
        *final_change *= last_factor;
    }

    let average = changes.iter().sum::<f64>() / changes.len() as f64;
    average / ddc.max(MIN_DDC)
}

/// Fraction of the first period remaining from `first`, and of the last period elapsed by `last`.
fn coverage_factors(first: i64, last: i64, period: CalmarPeriod) -> (f64, f64) {
    let first = date_of(first);
    let last = date_of(last);
    match period {
        CalmarPeriod::Yearly => {
            let first_len = f64::from(days_in_year(first.year()));
            let last_len = f64::from(days_in_year(last.year()));
            (
                (first_len - f64::from(first.ordinal()) + 1.0) / first_len,
                f64::from(last.ordinal()) / last_len,
            )
        }
        CalmarPeriod::Monthly => {
            let first_len = f64::from(days_in_month(first.year(), first.month()));
            let last_len = f64::from(days_in_month(last.year(), last.month()));
            (
                (first_len - f64::from(first.day()) + 1.0) / first_len,
                f64::from(last.day()) / last_len,
            )
        }
    }
}
