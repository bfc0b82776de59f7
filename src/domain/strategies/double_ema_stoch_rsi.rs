//! Fast EMA over slow EMA, gated by the raw StochRSI.
//!
//! Enters while the fast EMA is at or above the slow one and StochRSI is below
//! the overbought level. Leaves once the fast EMA is at or below the slow one
//! and StochRSI is above the oversold level.

use crate::domain::indicator::IndicatorType;
use crate::domain::position::Position;
use crate::domain::strategy::{BarContext, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct DoubleEmaStochRsi {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub stoch_window: usize,
    pub rsi_period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for DoubleEmaStochRsi {
    fn default() -> Self {
        DoubleEmaStochRsi {
            ema_fast: 20,
            ema_slow: 100,
            stoch_window: 14,
            rsi_period: 14,
            overbought: 0.8,
            oversold: 0.2,
        }
    }
}

impl DoubleEmaStochRsi {
    fn stoch_rsi(&self) -> IndicatorType {
        IndicatorType::StochRsi {
            stoch_window: self.stoch_window,
            rsi_period: self.rsi_period,
        }
    }

    fn readings(&self, ctx: &BarContext<'_>) -> Option<(f64, f64, f64)> {
        Some((
            ctx.value(IndicatorType::Ema(self.ema_fast))?,
            ctx.value(IndicatorType::Ema(self.ema_slow))?,
            ctx.value(self.stoch_rsi())?,
        ))
    }
}

impl Strategy for DoubleEmaStochRsi {
    fn name(&self) -> &str {
        "double_ema_stoch_rsi"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Ema(self.ema_fast),
            IndicatorType::Ema(self.ema_slow),
            self.stoch_rsi(),
        ]
    }

    fn should_open(&self, ctx: &BarContext<'_>) -> bool {
        self.readings(ctx)
            .is_some_and(|(fast, slow, stoch)| fast >= slow && stoch < self.overbought)
    }

    fn should_close(&self, ctx: &BarContext<'_>, _position: &Position) -> bool {
        self.readings(ctx)
            .is_some_and(|(fast, slow, stoch)| fast <= slow && stoch > self.oversold)
    }
}
