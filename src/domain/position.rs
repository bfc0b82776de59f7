//! Position tracking and management.

/// Entry-time readings a strategy keeps for its exit rules.
///
/// Zero means "not set" for the protective levels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntrySnapshot {
    pub atr: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// An open long position. `quantity` is net of the entry fee.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub asset: usize,
    pub quantity: f64,
    pub entry_price: f64,
    /// Cash spent to open, fee included.
    pub cost: f64,
    pub open_timestamp: i64,
    pub entry_atr: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    stop_loss_at_open: f64,
    max_price_increase: f64,
}

impl Position {
    pub fn open(
        asset: usize,
        quantity: f64,
        entry_price: f64,
        cost: f64,
        open_timestamp: i64,
        snapshot: EntrySnapshot,
    ) -> Self {
        Position {
            asset,
            quantity,
            entry_price,
            cost,
            open_timestamp,
            entry_atr: snapshot.atr,
            stop_loss: snapshot.stop_loss,
            take_profit: snapshot.take_profit,
            stop_loss_at_open: snapshot.stop_loss,
            max_price_increase: 0.0,
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    /// Percent move of `price` over the entry price.
    pub fn gain_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0
    }

    pub fn age_secs(&self, timestamp: i64) -> i64 {
        timestamp - self.open_timestamp
    }

    /// Strictly below the stop; a zero stop is disabled.
    pub fn should_stop_loss(&self, price: f64) -> bool {
        self.stop_loss != 0.0 && price < self.stop_loss
    }

    /// Strictly above the target; a zero target is disabled.
    pub fn should_take_profit(&self, price: f64) -> bool {
        self.take_profit != 0.0 && price > self.take_profit
    }

    /// Raise the stop by the largest gain over entry seen so far.
    pub fn trail_stop(&mut self, price: f64) {
        let delta = price - self.entry_price;
        if delta > self.max_price_increase {
            self.max_price_increase = delta;
            self.stop_loss = self.stop_loss_at_open + delta;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub asset: usize,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub open_timestamp: i64,
    pub close_timestamp: i64,
    /// Net cash result: proceeds after exit fee minus entry cost.
    pub pnl: f64,
}

impl ClosedTrade {
    /// A trade counts as profitable when it exits at or above its entry price.
    pub fn is_profitable(&self) -> bool {
        self.exit_price >= self.entry_price
    }
}
