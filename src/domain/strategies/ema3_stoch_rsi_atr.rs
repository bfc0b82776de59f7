//! Triple-EMA trend filter with a StochRSI K/D entry and ATR-scaled exits.

use crate::domain::indicator::IndicatorType;
use crate::domain::position::{EntrySnapshot, Position};
use crate::domain::strategy::{BarContext, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct Ema3StochRsiAtr {
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
    pub atr_period: usize,
    pub up_atr: f64,
    pub down_atr: f64,
    pub stoch_rsi_period: usize,
    pub stoch_period: usize,
    pub k_smooth: usize,
    pub d_smooth: usize,
    pub oversold: f64,
    pub timeout_hours: i64,
    pub take_profit_pct: f64,
}

impl Default for Ema3StochRsiAtr {
    fn default() -> Self {
        Ema3StochRsiAtr {
            ema_fast: 10,
            ema_mid: 50,
            ema_slow: 100,
            atr_period: 14,
            up_atr: 6.0,
            down_atr: 3.0,
            stoch_rsi_period: 14,
            stoch_period: 14,
            k_smooth: 3,
            d_smooth: 3,
            oversold: 0.2,
            timeout_hours: 48,
            take_profit_pct: 15.0,
        }
    }
}

impl Ema3StochRsiAtr {
    fn k(&self) -> IndicatorType {
        IndicatorType::StochRsiK {
            rsi_period: self.stoch_rsi_period,
            stoch_period: self.stoch_period,
            k_smooth: self.k_smooth,
            d_smooth: self.d_smooth,
        }
    }

    fn d(&self) -> IndicatorType {
        IndicatorType::StochRsiD {
            rsi_period: self.stoch_rsi_period,
            stoch_period: self.stoch_period,
            k_smooth: self.k_smooth,
            d_smooth: self.d_smooth,
        }
    }
}

impl Strategy for Ema3StochRsiAtr {
    fn name(&self) -> &str {
        "ema3_stoch_rsi_atr"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Ema(self.ema_fast),
            IndicatorType::Ema(self.ema_mid),
            IndicatorType::Ema(self.ema_slow),
            IndicatorType::Atr(self.atr_period),
            self.k(),
            self.d(),
        ]
    }

    fn should_open(&self, ctx: &BarContext<'_>) -> bool {
        let (Some(fast), Some(mid), Some(slow)) = (
            ctx.value(IndicatorType::Ema(self.ema_fast)),
            ctx.value(IndicatorType::Ema(self.ema_mid)),
            ctx.value(IndicatorType::Ema(self.ema_slow)),
        ) else {
            return false;
        };
        let (Some(k), Some(d), Some(prev_k), Some(prev_d)) = (
            ctx.value(self.k()),
            ctx.value(self.d()),
            ctx.previous(self.k()),
            ctx.previous(self.d()),
        ) else {
            return false;
        };

        // exits are scaled by the entry ATR
        let atr_ready = ctx.value(IndicatorType::Atr(self.atr_period)).is_some();

        let trend = fast >= mid && mid >= slow && ctx.close() >= fast;
        let oversold = k < self.oversold && d < self.oversold;
        let bullish_cross = prev_k <= prev_d && k > d;
        atr_ready && trend && oversold && bullish_cross
    }

    /// Only called after `should_open`, so the ATR reading is valid.
    fn entry_snapshot(&self, ctx: &BarContext<'_>) -> EntrySnapshot {
        EntrySnapshot {
            atr: ctx.value(IndicatorType::Atr(self.atr_period)).unwrap_or(0.0),
            ..EntrySnapshot::default()
        }
    }

    fn should_close(&self, ctx: &BarContext<'_>, position: &Position) -> bool {
        let close = ctx.close();
        let target = position.entry_price + self.up_atr * position.entry_atr;
        let stop = position.entry_price - self.down_atr * position.entry_atr;

        close > target
            || close < stop
            || position.age_secs(ctx.timestamp()) >= self.timeout_hours * 3600
            || position.gain_pct(close) > self.take_profit_pct
    }
}
