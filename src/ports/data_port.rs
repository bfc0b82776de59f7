//! Price data access port trait.

use crate::domain::error::SweepError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Every bar of `asset`, oldest first, duplicate timestamps removed.
    fn load_bars(&self, asset: &str) -> Result<Vec<Bar>, SweepError>;
}
