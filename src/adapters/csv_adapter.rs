//! Delimited bar file adapter.
//!
//! One headerless file per asset, `<asset>.csv` under the base directory, with rows
//! `timestamp_ms;open;high;low;close;volume`. Volume is read past and ignored.

use crate::domain::error::SweepError;
use crate::domain::ohlcv::Bar;
use crate::domain::price_series::dedup_timestamps;
use crate::ports::data_port::DataPort;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
    delimiter: u8,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf, delimiter: u8) -> Self {
        Self {
            base_path,
            delimiter,
        }
    }

    pub fn csv_path(&self, asset: &str) -> PathBuf {
        self.base_path.join(format!("{asset}.csv"))
    }

    fn field<T: std::str::FromStr>(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
        asset: &str,
        line: u64,
    ) -> Result<T, SweepError>
    where
        T::Err: std::fmt::Display,
    {
        let raw = record.get(index).ok_or_else(|| SweepError::DataLoad {
            asset: asset.to_string(),
            reason: format!("line {line}: missing {name} column"),
        })?;
        raw.trim().parse().map_err(|e| SweepError::DataLoad {
            asset: asset.to_string(),
            reason: format!("line {line}: invalid {name} value '{raw}': {e}"),
        })
    }
}

impl DataPort for CsvAdapter {
    fn load_bars(&self, asset: &str) -> Result<Vec<Bar>, SweepError> {
        let path = self.csv_path(asset);
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| SweepError::DataLoad {
                asset: asset.to_string(),
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let line = row as u64 + 1;
            let record = result.map_err(|e| SweepError::DataLoad {
                asset: asset.to_string(),
                reason: format!("line {line}: {e}"),
            })?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            let timestamp_ms: i64 = Self::field(&record, 0, "timestamp", asset, line)?;
            bars.push(Bar {
                timestamp: timestamp_ms / 1000,
                open: Self::field(&record, 1, "open", asset, line)?,
                high: Self::field(&record, 2, "high", asset, line)?,
                low: Self::field(&record, 3, "low", asset, line)?,
                close: Self::field(&record, 4, "close", asset, line)?,
            });
        }

        let dropped = dedup_timestamps(&mut bars);
        if dropped > 0 {
            debug!(asset, dropped, "dropped duplicate timestamps");
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("BTCUSDT.csv"),
            "1609459200000;100.0;110.0;90.0;105.0;12.5\n\
             1609462800000;105.0;115.0;100.0;110.0;8\n\
             1609462800000;105.0;115.0;100.0;111.0;8\n\
             1609466400000;110.0;120.0;105.0;115.0;3\n",
        )
        .unwrap();
        fs::write(path.join("ETHUSDT.csv"), "1609459200000,1,2,0.5,1.5,10\n").unwrap();
        fs::write(path.join("BROKEN.csv"), "1609459200000;abc;2;1;1.5;0\n").unwrap();
        fs::write(path.join("SHORT.csv"), "1609459200000;1;2\n").unwrap();

        (dir, path)
    }

    #[test]
    fn load_bars_converts_milliseconds_and_dedups() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, b';');

        let bars = adapter.load_bars("BTCUSDT").unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp, 1_609_459_200);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        // first of the duplicated rows survives
        assert_eq!(bars[1].close, 110.0);
        assert_eq!(bars[2].timestamp, 1_609_466_400);
    }

    #[test]
    fn delimiter_is_configurable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, b',');
        let bars = adapter.load_bars("ETHUSDT").unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 1.5);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, b';');
        let err = adapter.load_bars("XYZ").unwrap_err();
        assert!(matches!(err, SweepError::DataLoad { asset, .. } if asset == "XYZ"));
    }

    #[test]
    fn bad_number_reports_line() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, b';');
        let err = adapter.load_bars("BROKEN").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 1"), "{message}");
        assert!(message.contains("open"), "{message}");
    }

    #[test]
    fn short_row_reports_missing_column() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, b';');
        let err = adapter.load_bars("SHORT").unwrap_err();
        assert!(err.to_string().contains("missing low column"));
    }
}
