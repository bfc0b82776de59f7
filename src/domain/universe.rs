//! Asset universe: parses the configured asset list, loads each asset's bars
//! through a [`DataPort`] and aligns the survivors into one [`MarketData`].

use std::collections::HashSet;

use tracing::{info, warn};

use crate::domain::error::SweepError;
use crate::domain::price_series::{align_series, MarketData};
use crate::ports::data_port::DataPort;

pub const DEFAULT_MIN_BARS: usize = 2;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum UniverseError {
    #[error("empty token in asset list")]
    EmptyToken,

    #[error("duplicate asset: {0}")]
    DuplicateAsset(String),
}

impl From<UniverseError> for SweepError {
    fn from(err: UniverseError) -> Self {
        SweepError::invalid("data", "assets", err.to_string())
    }
}

/// Comma-separated asset names. Names are kept verbatim since they name files.
pub fn parse_assets(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let asset = token.trim();
        if asset.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        if !seen.insert(asset.to_string()) {
            return Err(UniverseError::DuplicateAsset(asset.to_string()));
        }
        assets.push(asset.to_string());
    }

    Ok(assets)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAsset {
    pub asset: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize },
}

#[derive(Debug)]
pub struct LoadedUniverse {
    pub data: MarketData,
    pub skipped: Vec<SkippedAsset>,
}

/// Load and align every asset with at least `min_bars` bars.
///
/// Empty or short assets are skipped with a warning; read and parse failures
/// abort the load. Fails with `InsufficientData` when nothing is left.
pub fn load_universe(
    data_port: &dyn DataPort,
    assets: &[String],
    min_bars: usize,
) -> Result<LoadedUniverse, SweepError> {
    let mut loaded = Vec::with_capacity(assets.len());
    let mut skipped = Vec::new();

    for asset in assets {
        let bars = data_port.load_bars(asset)?;

        if bars.is_empty() {
            warn!(asset = %asset, "skipping asset without data");
            skipped.push(SkippedAsset {
                asset: asset.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        }

        if bars.len() < min_bars {
            warn!(asset = %asset, bars = bars.len(), min_bars, "skipping asset with too few bars");
            skipped.push(SkippedAsset {
                asset: asset.clone(),
                reason: SkipReason::InsufficientBars { bars: bars.len() },
            });
            continue;
        }

        info!(asset = %asset, bars = bars.len(), "loaded");
        loaded.push((asset.clone(), bars));
    }

    if loaded.is_empty() {
        return Err(SweepError::InsufficientData {
            asset: "all".to_string(),
            bars: 0,
            minimum: min_bars,
        });
    }

    let data = align_series(loaded)?;
    Ok(LoadedUniverse { data, skipped })
}
