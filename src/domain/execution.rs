//! Trade execution and fill simulation.
//!
//! Fills happen at the bar close. Entries size against current cash, splitting it
//! evenly over the free position slots; fees are a percentage charged on both legs.

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, EntrySnapshot, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    pub fee_pct: f64,
    pub max_open_trades: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            fee_pct: 0.0,
            max_open_trades: 1,
        }
    }
}

/// fee = notional * pct / 100
pub fn calculate_fee(notional: f64, fee_pct: f64) -> f64 {
    notional * fee_pct / 100.0
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: f64,
        execution_price: f64,
        cost: f64,
        fee: f64,
    },
    AlreadyOpen,
    NoCapacity,
    InsufficientCapital,
}

/// Enter a long position.
///
/// 1. Refuse if the asset is already held or every slot is taken
/// 2. Allocate cash / (max_open_trades - active) of current cash
/// 3. Buy at the close; the fee is taken out of the acquired quantity
/// 4. Record entry price and the strategy's entry snapshot
pub fn enter_long(
    portfolio: &mut Portfolio,
    asset: usize,
    price: f64,
    timestamp: i64,
    snapshot: EntrySnapshot,
    config: &ExecutionConfig,
) -> EntryResult {
    if portfolio.has_position(asset) {
        return EntryResult::AlreadyOpen;
    }
    let active = portfolio.active_open_count();
    if active >= config.max_open_trades {
        return EntryResult::NoCapacity;
    }

    let fraction = 1.0 / (config.max_open_trades - active) as f64;
    let cost = portfolio.cash * fraction;
    if cost <= 0.0 || price <= 0.0 {
        return EntryResult::InsufficientCapital;
    }

    let gross_quantity = cost / price;
    let fee_quantity = calculate_fee(gross_quantity, config.fee_pct);
    let quantity = gross_quantity - fee_quantity;
    let fee = fee_quantity * price;

    portfolio.cash -= cost;
    portfolio.total_fees += fee;
    portfolio.trades_entered += 1;
    portfolio.add_position(Position::open(asset, quantity, price, cost, timestamp, snapshot));

    EntryResult::Entered {
        quantity,
        execution_price: price,
        cost,
        fee,
    }
}

/// Result of closing a position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub quantity: f64,
    pub exit_price: f64,
    pub proceeds: f64,
    pub fee: f64,
    pub pnl: f64,
}

/// Close the position on `asset` at `price`, if one is open.
///
/// Proceeds go to cash minus the exit fee; the closed trade is recorded.
pub fn exit_position(
    portfolio: &mut Portfolio,
    asset: usize,
    price: f64,
    timestamp: i64,
    config: &ExecutionConfig,
) -> Option<ExitResult> {
    let position = portfolio.remove_position(asset)?;

    let proceeds = position.quantity * price;
    let fee = calculate_fee(proceeds, config.fee_pct);
    let pnl = proceeds - fee - position.cost;

    portfolio.cash += proceeds - fee;
    portfolio.total_fees += fee;
    portfolio.record_trade(ClosedTrade {
        asset,
        quantity: position.quantity,
        entry_price: position.entry_price,
        exit_price: price,
        open_timestamp: position.open_timestamp,
        close_timestamp: timestamp,
        pnl,
    });

    Some(ExitResult {
        quantity: position.quantity,
        exit_price: price,
        proceeds,
        fee,
        pnl,
    })
}
