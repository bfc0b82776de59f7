//! OHLC bar representation.

/// One OHLC sample; `timestamp` is seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// Zero-valued bar used to left-pad assets that start trading late.
    pub fn padding(timestamp: i64) -> Self {
        Bar {
            timestamp,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
        }
    }

    /// (high + low) / 2
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}
