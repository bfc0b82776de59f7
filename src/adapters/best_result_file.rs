//! Single-line best-result file.
//!
//! Line layout, space separated: `rank_value final_equity gain_pct win_rate_pct
//! max_drawdown_pct ddc score calmar calmar_monthly trades fees max_open_trades`
//! followed by the strategy name and its `key=value` parameters.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SweepError;
use crate::ports::result_port::BestResultPort;

pub struct BestResultFile {
    path: PathBuf,
}

impl BestResultFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn error(&self, reason: impl Into<String>) -> SweepError {
        SweepError::BestResult {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn format_line(result: &BacktestResult, rank_value: f64) -> String {
        let m = &result.metrics;
        let mut fields = vec![
            rank_value.to_string(),
            m.final_equity.to_string(),
            m.gain_pct.to_string(),
            m.win_rate_pct.to_string(),
            m.max_drawdown_pct.to_string(),
            m.ddc.to_string(),
            m.score.to_string(),
            m.calmar_ratio.to_string(),
            m.calmar_ratio_monthly.to_string(),
            m.trades_entered.to_string(),
            m.total_fees.to_string(),
            result.max_open_trades.to_string(),
            result.params.family().to_string(),
        ];
        fields.extend(
            result
                .params
                .fields()
                .into_iter()
                .map(|(name, value)| format!("{name}={value}")),
        );
        fields.join(" ")
    }
}

impl BestResultPort for BestResultFile {
    fn read_best(&self) -> Result<Option<f64>, SweepError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.error(e.to_string())),
        };
        let Some(first) = content.split_whitespace().next() else {
            return Ok(None);
        };
        first
            .parse::<f64>()
            .map(Some)
            .map_err(|e| self.error(format!("invalid rank value '{first}': {e}")))
    }

    fn write_best(&self, result: &BacktestResult, rank_value: f64) -> Result<(), SweepError> {
        let line = Self::format_line(result, rank_value);
        fs::write(&self.path, format!("{line}\n")).map_err(|e| self.error(e.to_string()))?;
        info!(path = %self.path.display(), rank_value, "best result written");
        Ok(())
    }
}
