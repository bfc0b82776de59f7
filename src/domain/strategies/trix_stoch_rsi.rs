//! TRIX histogram momentum filtered by an EMA trend and the raw StochRSI.

use crate::domain::indicator::IndicatorType;
use crate::domain::position::Position;
use crate::domain::strategy::{BarContext, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct TrixStochRsi {
    pub ema: usize,
    pub trix_length: usize,
    pub trix_signal: usize,
    pub stoch_window: usize,
    pub rsi_period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for TrixStochRsi {
    fn default() -> Self {
        TrixStochRsi {
            ema: 200,
            trix_length: 9,
            trix_signal: 21,
            stoch_window: 14,
            rsi_period: 14,
            overbought: 0.8,
            oversold: 0.2,
        }
    }
}

impl TrixStochRsi {
    fn trix(&self) -> IndicatorType {
        IndicatorType::Trix {
            length: self.trix_length,
            signal: self.trix_signal,
        }
    }

    fn stoch_rsi(&self) -> IndicatorType {
        IndicatorType::StochRsi {
            stoch_window: self.stoch_window,
            rsi_period: self.rsi_period,
        }
    }
}

impl Strategy for TrixStochRsi {
    fn name(&self) -> &str {
        "trix_stoch_rsi"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Ema(self.ema), self.trix(), self.stoch_rsi()]
    }

    fn should_open(&self, ctx: &BarContext<'_>) -> bool {
        match (
            ctx.value(IndicatorType::Ema(self.ema)),
            ctx.value(self.trix()),
            ctx.value(self.stoch_rsi()),
        ) {
            (Some(ema), Some(histogram), Some(stoch)) => {
                ctx.close() > ema && histogram > 0.0 && stoch < self.overbought
            }
            _ => false,
        }
    }

    fn should_close(&self, ctx: &BarContext<'_>, _position: &Position) -> bool {
        match (ctx.value(self.trix()), ctx.value(self.stoch_rsi())) {
            (Some(histogram), Some(stoch)) => histogram < 0.0 && stoch > self.oversold,
            _ => false,
        }
    }
}
