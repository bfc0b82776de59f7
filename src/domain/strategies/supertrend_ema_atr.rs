//! SuperTrend direction above an EMA, with ATR stop and target and a trailing stop.

use crate::domain::indicator::IndicatorType;
use crate::domain::position::{EntrySnapshot, Position};
use crate::domain::strategy::{BarContext, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct SuperTrendEmaAtr {
    pub ema: usize,
    pub atr_period: usize,
    pub supertrend_atr_period: usize,
    pub supertrend_multiplier: f64,
    pub stop_atr: f64,
    pub target_atr: f64,
}

impl Default for SuperTrendEmaAtr {
    fn default() -> Self {
        SuperTrendEmaAtr {
            ema: 100,
            atr_period: 17,
            supertrend_atr_period: 10,
            supertrend_multiplier: 3.0,
            stop_atr: 3.0,
            target_atr: 9.0,
        }
    }
}

impl SuperTrendEmaAtr {
    fn supertrend(&self) -> IndicatorType {
        IndicatorType::supertrend(self.supertrend_atr_period, self.supertrend_multiplier)
    }

    fn direction(&self, ctx: &BarContext<'_>) -> Option<i8> {
        ctx.supertrend(self.supertrend()).map(|(direction, _, _)| direction)
    }
}

impl Strategy for SuperTrendEmaAtr {
    fn name(&self) -> &str {
        "supertrend_ema_atr"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Ema(self.ema),
            IndicatorType::Atr(self.atr_period),
            self.supertrend(),
        ]
    }

    fn should_open(&self, ctx: &BarContext<'_>) -> bool {
        match (
            ctx.value(IndicatorType::Ema(self.ema)),
            ctx.value(IndicatorType::Atr(self.atr_period)),
            self.direction(ctx),
        ) {
            (Some(ema), Some(_atr), Some(direction)) => ctx.close() > ema && direction == 1,
            _ => false,
        }
    }

    /// Only called after `should_open`, so the ATR reading is valid.
    fn entry_snapshot(&self, ctx: &BarContext<'_>) -> EntrySnapshot {
        let atr = ctx.value(IndicatorType::Atr(self.atr_period)).unwrap_or(0.0);
        let price = ctx.close();
        EntrySnapshot {
            atr,
            stop_loss: price - self.stop_atr * atr,
            take_profit: price + self.target_atr * atr,
        }
    }

    fn on_bar(&self, ctx: &BarContext<'_>, position: &mut Position) {
        position.trail_stop(ctx.close());
    }

    fn should_close(&self, ctx: &BarContext<'_>, position: &Position) -> bool {
        let below_ema = ctx
            .value(IndicatorType::Ema(self.ema))
            .is_some_and(|ema| ctx.low() < ema);
        let downtrend = self.direction(ctx) == Some(-1);

        below_ema
            || downtrend
            || position.should_take_profit(ctx.close())
            || position.should_stop_loss(ctx.high())
    }
}
