//! Aligned per-asset price series and the alignment step that produces them.
//!
//! Every asset in a [`MarketData`] has the same number of bars, indexed against a
//! single reference timeline. Assets that start trading later than the reference
//! are left-padded with zero bars; `start_index` marks the first real bar.

use tracing::debug;

use crate::domain::error::SweepError;
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub asset: String,
    pub bars: Vec<Bar>,
    pub start_index: usize,
}

impl PriceSeries {
    pub fn new(asset: impl Into<String>, bars: Vec<Bar>, start_index: usize) -> Self {
        Self {
            asset: asset.into(),
            bars,
            start_index,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Number of bars at or after `start_index`.
    pub fn real_bar_count(&self) -> usize {
        self.bars.len().saturating_sub(self.start_index)
    }
}

/// The immutable input of a simulation: one aligned series per asset.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub timeline: Vec<i64>,
    pub series: Vec<PriceSeries>,
}

impl MarketData {
    /// Panics if any series length differs from the timeline length.
    pub fn new(timeline: Vec<i64>, series: Vec<PriceSeries>) -> Self {
        for s in &series {
            assert_eq!(
                s.len(),
                timeline.len(),
                "series {} has {} bars, timeline has {}",
                s.asset,
                s.len(),
                timeline.len()
            );
            assert!(
                s.start_index <= s.len(),
                "series {} start index {} beyond its length",
                s.asset,
                s.start_index
            );
        }
        Self { timeline, series }
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.series.len()
    }

    pub fn asset_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.asset.as_str()).collect()
    }
}

/// Drop bars whose timestamp repeats the previous bar's. Returns how many were dropped.
pub fn dedup_timestamps(bars: &mut Vec<Bar>) -> usize {
    let before = bars.len();
    bars.dedup_by_key(|b| b.timestamp);
    before - bars.len()
}

/// Align raw per-asset bars onto one reference timeline.
///
/// Trailing bars are trimmed until every asset ends on the same timestamp, then
/// shorter assets are left-padded against the longest one.
pub fn align_series(raw: Vec<(String, Vec<Bar>)>) -> Result<MarketData, SweepError> {
    let mut raw = raw;

    for (asset, bars) in &raw {
        if bars.is_empty() {
            return Err(SweepError::NoData {
                asset: asset.clone(),
            });
        }
        if let Some(w) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(SweepError::Misaligned {
                reason: format!(
                    "{asset}: timestamp {} does not follow {}",
                    w[1].timestamp, w[0].timestamp
                ),
            });
        }
    }

    trim_to_common_end(&mut raw)?;

    let Some(reference) = raw.iter().max_by_key(|(_, bars)| bars.len()) else {
        return Ok(MarketData::new(Vec::new(), Vec::new()));
    };
    let timeline: Vec<i64> = reference.1.iter().map(|b| b.timestamp).collect();
    let n = timeline.len();

    let mut series = Vec::with_capacity(raw.len());
    for (asset, bars) in raw {
        let pad = n - bars.len();
        if let Some(i) = bars
            .iter()
            .zip(&timeline[pad..])
            .position(|(bar, &ts)| bar.timestamp != ts)
        {
            return Err(SweepError::Misaligned {
                reason: format!(
                    "{asset}: bar {} at {} does not match reference timestamp {}",
                    i,
                    bars[i].timestamp,
                    timeline[pad + i]
                ),
            });
        }

        if pad > 0 {
            debug!(asset = %asset, pad, "left-padding series");
        }
        let mut padded: Vec<Bar> = timeline[..pad].iter().map(|&ts| Bar::padding(ts)).collect();
        padded.extend(bars);
        series.push(PriceSeries::new(asset, padded, pad));
    }

    Ok(MarketData::new(timeline, series))
}

fn trim_to_common_end(raw: &mut [(String, Vec<Bar>)]) -> Result<(), SweepError> {
    loop {
        let lasts: Vec<i64> = raw
            .iter()
            .filter_map(|(_, bars)| bars.last().map(|b| b.timestamp))
            .collect();
        let Some(&common) = lasts.iter().min() else {
            return Ok(());
        };
        if lasts.iter().all(|&ts| ts == common) {
            return Ok(());
        }

        for (asset, bars) in raw.iter_mut() {
            let before = bars.len();
            while bars.last().is_some_and(|b| b.timestamp > common) {
                bars.pop();
            }
            if bars.is_empty() {
                return Err(SweepError::Misaligned {
                    reason: format!("{asset}: no bars left after trimming to {common}"),
                });
            }
            if bars.len() != before {
                debug!(asset = %asset, dropped = before - bars.len(), "trimmed trailing bars");
            }
        }
    }
}
