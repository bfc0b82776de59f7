//! Domain error types.

/// Top-level error type for sweeptrader.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to load data for {asset}: {reason}")]
    DataLoad { asset: String, reason: String },

    #[error("no data for {asset}")]
    NoData { asset: String },

    #[error("insufficient data for {asset}: have {bars} bars, need {minimum}")]
    InsufficientData {
        asset: String,
        bars: usize,
        minimum: usize,
    },

    #[error("misaligned price series: {reason}")]
    Misaligned { reason: String },

    #[error("unknown strategy '{name}'")]
    UnknownStrategy { name: String },

    #[error("best result file {path}: {reason}")]
    BestResult { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SweepError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SweepError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        SweepError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&SweepError> for std::process::ExitCode {
    fn from(err: &SweepError) -> Self {
        let code: u8 = match err {
            SweepError::Io(_) => 1,
            SweepError::ConfigParse { .. }
            | SweepError::ConfigMissing { .. }
            | SweepError::ConfigInvalid { .. } => 2,
            SweepError::BestResult { .. } => 3,
            SweepError::UnknownStrategy { .. } => 4,
            SweepError::DataLoad { .. }
            | SweepError::NoData { .. }
            | SweepError::InsufficientData { .. }
            | SweepError::Misaligned { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_display() {
        let err = SweepError::invalid("backtest", "fee_pct", "fee_pct must be below 100");
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] fee_pct: fee_pct must be below 100"
        );
    }

    #[test]
    fn missing_display() {
        let err = SweepError::missing("strategy", "name");
        assert_eq!(err.to_string(), "missing config key [strategy] name");
    }

    #[test]
    fn insufficient_data_display() {
        let err = SweepError::InsufficientData {
            asset: "BTCUSDT".into(),
            bars: 3,
            minimum: 10,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for BTCUSDT: have 3 bars, need 10"
        );
    }

    #[test]
    fn io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SweepError = io.into();
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn exit_codes_by_family() {
        use std::process::ExitCode;
        let cases = [
            (SweepError::missing("a", "b"), ExitCode::from(2)),
            (
                SweepError::BestResult {
                    path: "best.txt".into(),
                    reason: "bad".into(),
                },
                ExitCode::from(3),
            ),
            (
                SweepError::UnknownStrategy {
                    name: "nope".into(),
                },
                ExitCode::from(4),
            ),
            (
                SweepError::Misaligned {
                    reason: "lengths".into(),
                },
                ExitCode::from(5),
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(
                format!("{:?}", ExitCode::from(&err)),
                format!("{:?}", expected)
            );
        }
    }
}
