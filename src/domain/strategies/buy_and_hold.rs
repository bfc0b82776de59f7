use crate::domain::indicator::IndicatorType;
use crate::domain::position::Position;
use crate::domain::strategy::{BarContext, Strategy};

/// Opens whenever flat and holds until the forced liquidation on the last bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        Vec::new()
    }

    fn should_open(&self, _ctx: &BarContext<'_>) -> bool {
        true
    }

    fn should_close(&self, _ctx: &BarContext<'_>, _position: &Position) -> bool {
        false
    }
}
