//! Awesome Oscillator momentum with a Williams %R oversold trigger.

use crate::domain::indicator::IndicatorType;
use crate::domain::position::Position;
use crate::domain::strategy::{BarContext, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct BigWill {
    pub ao_fast: usize,
    pub ao_slow: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub willr_period: usize,
    pub willr_oversold: f64,
    pub willr_overbought: f64,
    pub stoch_window: usize,
    pub rsi_period: usize,
    pub stoch_oversold: f64,
    pub take_profit_pct: f64,
}

impl Default for BigWill {
    fn default() -> Self {
        BigWill {
            ao_fast: 5,
            ao_slow: 34,
            ema_fast: 100,
            ema_slow: 200,
            willr_period: 14,
            willr_oversold: -85.0,
            willr_overbought: -10.0,
            stoch_window: 14,
            rsi_period: 14,
            stoch_oversold: 0.2,
            take_profit_pct: 15.0,
        }
    }
}

impl BigWill {
    fn ao(&self) -> IndicatorType {
        IndicatorType::awesome(self.ao_fast, self.ao_slow)
    }

    fn stoch_rsi(&self) -> IndicatorType {
        IndicatorType::StochRsi {
            stoch_window: self.stoch_window,
            rsi_period: self.rsi_period,
        }
    }
}

impl Strategy for BigWill {
    fn name(&self) -> &str {
        "big_will"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![
            self.ao(),
            IndicatorType::Ema(self.ema_fast),
            IndicatorType::Ema(self.ema_slow),
            IndicatorType::WilliamsR(self.willr_period),
            self.stoch_rsi(),
        ]
    }

    fn should_open(&self, ctx: &BarContext<'_>) -> bool {
        let (Some(fast), Some(slow), Some(willr)) = (
            ctx.value(IndicatorType::Ema(self.ema_fast)),
            ctx.value(IndicatorType::Ema(self.ema_slow)),
            ctx.value(IndicatorType::WilliamsR(self.willr_period)),
        ) else {
            return false;
        };
        let (Some(ao), Some(prev_ao)) = (ctx.value(self.ao()), ctx.previous(self.ao())) else {
            return false;
        };

        fast >= slow && willr < self.willr_oversold && ao > 0.0 && prev_ao > ao
    }

    fn should_close(&self, ctx: &BarContext<'_>, position: &Position) -> bool {
        let momentum_lost = match (ctx.value(self.ao()), ctx.value(self.stoch_rsi())) {
            (Some(ao), Some(stoch)) => ao < 0.0 && stoch > self.stoch_oversold,
            _ => false,
        };
        let overbought = ctx
            .value(IndicatorType::WilliamsR(self.willr_period))
            .is_some_and(|willr| willr > self.willr_overbought);

        momentum_lost || overbought || position.gain_pct(ctx.high()) > self.take_profit_pct
    }
}
