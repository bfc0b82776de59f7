//! Best-result persistence port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SweepError;

/// Relative improvement, in percent, a new rank value needs over the stored one.
pub const MIN_IMPROVEMENT_PCT: f64 = 0.1;

pub trait BestResultPort {
    /// Rank value of the stored result, `None` when nothing is stored yet.
    fn read_best(&self) -> Result<Option<f64>, SweepError>;

    fn write_best(&self, result: &BacktestResult, rank_value: f64) -> Result<(), SweepError>;

    /// Store `result` when nothing is stored or it beats the stored rank value by
    /// more than [`MIN_IMPROVEMENT_PCT`]. Returns whether it was written.
    fn persist_if_better(
        &self,
        result: &BacktestResult,
        rank_value: f64,
    ) -> Result<bool, SweepError> {
        let better = match self.read_best()? {
            None => true,
            Some(stored) => is_improvement(stored, rank_value),
        };
        if better {
            self.write_best(result, rank_value)?;
        }
        Ok(better)
    }
}

/// `(new - old) / |old| * 100 > MIN_IMPROVEMENT_PCT`; from a stored zero any positive value wins.
pub fn is_improvement(old: f64, new: f64) -> bool {
    if !new.is_finite() {
        return false;
    }
    if old == 0.0 {
        return new > 0.0;
    }
    (new - old) / old.abs() * 100.0 > MIN_IMPROVEMENT_PCT
}
