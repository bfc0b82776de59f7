//! Two-EMA crossover: long while the fast EMA has crossed above the slow one.

use crate::domain::indicator::IndicatorType;
use crate::domain::position::Position;
use crate::domain::strategy::{BarContext, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct DoubleEma {
    pub ema_fast: usize,
    pub ema_slow: usize,
}

impl Default for DoubleEma {
    fn default() -> Self {
        DoubleEma {
            ema_fast: 20,
            ema_slow: 50,
        }
    }
}

impl DoubleEma {
    /// (fast, slow) on this bar and the previous one.
    fn readings(&self, ctx: &BarContext<'_>) -> Option<((f64, f64), (f64, f64))> {
        let fast = IndicatorType::Ema(self.ema_fast);
        let slow = IndicatorType::Ema(self.ema_slow);
        Some((
            (ctx.value(fast)?, ctx.value(slow)?),
            (ctx.previous(fast)?, ctx.previous(slow)?),
        ))
    }
}

impl Strategy for DoubleEma {
    fn name(&self) -> &str {
        "double_ema"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Ema(self.ema_fast), IndicatorType::Ema(self.ema_slow)]
    }

    fn should_open(&self, ctx: &BarContext<'_>) -> bool {
        self.readings(ctx)
            .is_some_and(|((fast, slow), (prev_fast, prev_slow))| {
                fast >= slow && prev_fast <= prev_slow
            })
    }

    fn should_close(&self, ctx: &BarContext<'_>, _position: &Position) -> bool {
        self.readings(ctx)
            .is_some_and(|((fast, slow), (prev_fast, prev_slow))| {
                fast <= slow && prev_fast >= prev_slow
            })
    }
}
