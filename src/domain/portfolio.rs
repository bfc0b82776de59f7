//! Portfolio state and equity tracking.

use std::collections::HashMap;

use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub equity: f64,
}

/// Mutable state of one simulation run. Positions are keyed by asset index.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub positions: HashMap<usize, Position>,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub peak_equity: f64,
    /// Worst drawdown from peak seen at a sample, in percent (≤ 0).
    pub max_drawdown_pct: f64,
    pub total_fees: f64,
    pub trades_entered: usize,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            positions: HashMap::new(),
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
            peak_equity: initial_capital,
            max_drawdown_pct: 0.0,
            total_fees: 0.0,
            trades_entered: 0,
        }
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.insert(position.asset, position);
    }

    pub fn get_position(&self, asset: usize) -> Option<&Position> {
        self.positions.get(&asset)
    }

    pub fn get_position_mut(&mut self, asset: usize) -> Option<&mut Position> {
        self.positions.get_mut(&asset)
    }

    pub fn has_position(&self, asset: usize) -> bool {
        self.positions.contains_key(&asset)
    }

    pub fn remove_position(&mut self, asset: usize) -> Option<Position> {
        self.positions.remove(&asset)
    }

    /// Number of open positions.
    pub fn active_open_count(&self) -> usize {
        self.positions.len()
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    pub fn profitable_exits(&self) -> usize {
        self.closed_trades.iter().filter(|t| t.is_profitable()).count()
    }

    pub fn losing_exits(&self) -> usize {
        self.closed_trades.len() - self.profitable_exits()
    }

    /// Append a sample, then update the peak and the worst drawdown.
    pub fn record_equity(&mut self, timestamp: i64, equity: f64) {
        self.equity_curve.push(EquityPoint { timestamp, equity });
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        if self.peak_equity > 0.0 {
            let drawdown = (equity - self.peak_equity) / self.peak_equity * 100.0;
            if drawdown < self.max_drawdown_pct {
                self.max_drawdown_pct = drawdown;
            }
        }
    }

    /// Cash plus every position valued at `prices[asset]`.
    pub fn total_equity(&self, prices: &[f64]) -> f64 {
        let position_value: f64 = self
            .positions
            .values()
            .map(|pos| pos.market_value(prices[pos.asset]))
            .sum();
        self.cash + position_value
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.cash)
    }
}
