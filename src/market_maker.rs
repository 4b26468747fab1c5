use std::collections::VecDeque;

use rust_decimal::prelude::ToPrimitive;

use crate::order::{round_to_cent, IdSeq, Order, OrderKind, OrderSide, OwnerClass, Trade};
use crate::order_book::OrderBook;

/// Size of the sliding window of maker-participating trades used to drive
/// spread adaptation.
const WINDOW_SIZE: usize = 20;
/// Minimum window occupancy before adaptation kicks in.
const MIN_WINDOW_FOR_ADAPTATION: usize = 5;

#[derive(Clone, Copy, Debug)]
struct WindowEntry {
    adverse: bool,
}

/// Named accumulator snapshot of the maker's running totals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MakerStats {
    pub spread_pnl: f64,
    pub inventory_pnl: f64,
    pub total_spread_captured: f64,
    pub fill_count: u64,
    pub avg_realized_spread: f64,
}

/// The single adaptive market maker: inventory-skewed two-sided quoting,
/// adverse-selection tracking, and spread/inventory P&L decomposition.
///
/// `pnl = spread_pnl + inventory_pnl` is an invariant maintained by every
/// call to [`MarketMaker::on_trade`].
pub struct MarketMaker {
    pub owner_id: String,
    base_spread: f64,
    current_spread: f64,
    size: u64,
    adapt_rate: f64,
    inventory_skew_factor: f64,
    inventory: i64,
    window: VecDeque<WindowEntry>,
    spread_pnl: f64,
    inventory_pnl: f64,
    total_spread_captured: f64,
    fill_count: u64,
}

impl MarketMaker {
    pub fn new(
        owner_id: impl Into<String>,
        base_spread: f64,
        size: u64,
        adapt_rate: f64,
        inventory_skew_factor: f64,
    ) -> eyre::Result<Self> {
        if base_spread <= 0.0 {
            return Err(eyre::eyre!("base spread must be positive"));
        }
        if size == 0 {
            return Err(eyre::eyre!("maker size must be positive"));
        }
        if adapt_rate < 0.0 {
            return Err(eyre::eyre!("adapt rate must be non-negative"));
        }
        Ok(Self {
            owner_id: owner_id.into(),
            base_spread,
            current_spread: base_spread,
            size,
            adapt_rate,
            inventory_skew_factor,
            inventory: 0,
            window: VecDeque::with_capacity(WINDOW_SIZE),
            spread_pnl: 0.0,
            inventory_pnl: 0.0,
            total_spread_captured: 0.0,
            fill_count: 0,
        })
    }

    pub fn inventory(&self) -> i64 {
        self.inventory
    }

    pub fn quoted_spread(&self) -> f64 {
        self.current_spread
    }

    pub fn adverse_ratio(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let adverse = self.window.iter().filter(|e| e.adverse).count();
        adverse as f64 / self.window.len() as f64
    }

    pub fn pnl(&self) -> f64 {
        self.spread_pnl + self.inventory_pnl
    }

    pub fn stats(&self) -> MakerStats {
        MakerStats {
            spread_pnl: self.spread_pnl,
            inventory_pnl: self.inventory_pnl,
            total_spread_captured: self.total_spread_captured,
            fill_count: self.fill_count,
            avg_realized_spread: if self.fill_count == 0 {
                0.0
            } else {
                self.total_spread_captured / self.fill_count as f64
            },
        }
    }

    /// Cancels the maker's resting orders and quotes a fresh two-sided
    /// market around `true_value` (used as the reference when the book is
    /// one-sided or empty). Returns `(bid, ask)`, submitted to `book` in
    /// that order.
    pub fn quote(
        &mut self,
        book: &mut OrderBook,
        true_value: f64,
        ts: i64,
        ids: &mut IdSeq,
    ) -> (Order, Order) {
        book.cancel_all(&self.owner_id);

        let mid_ref = book
            .mid()
            .and_then(|m| m.to_f64())
            .unwrap_or(true_value);
        let half_spread = self.current_spread / 2.0;
        let skew = self.inventory as f64 * self.inventory_skew_factor;

        let bid_price = round_to_cent(mid_ref - half_spread - skew);
        let ask_price = round_to_cent(mid_ref + half_spread - skew);
        if bid_price >= ask_price {
            tracing::warn!(
                %bid_price,
                %ask_price,
                inventory = self.inventory,
                "market maker skew produced a crossed quote; accepting as specified"
            );
        }

        let bid = Order::new(
            ids.next(&self.owner_id),
            self.owner_id.clone(),
            OwnerClass::Maker,
            OrderSide::Buy,
            OrderKind::Limit,
            bid_price,
            self.size,
            ts,
        )
        .expect("maker quote parameters are always valid");
        let ask = Order::new(
            ids.next(&self.owner_id),
            self.owner_id.clone(),
            OwnerClass::Maker,
            OrderSide::Sell,
            OrderKind::Limit,
            ask_price,
            self.size,
            ts,
        )
        .expect("maker quote parameters are always valid");

        book.submit(bid.clone());
        book.submit(ask.clone());
        (bid, ask)
    }

    /// Feeds a single trade into the maker's accounting. A trade where the
    /// maker is not `self.owner_id` is an expected no-op.
    pub fn on_trade(&mut self, trade: &Trade, true_value_after: f64) {
        if trade.maker_owner_id != self.owner_id {
            return;
        }

        let trade_price = trade
            .price
            .to_f64()
            .expect("trade price always fits in f64");
        let qty = trade.qty as f64;

        let spread_captured = match trade.taker_side {
            OrderSide::Buy => (trade_price - trade.true_value) * qty,
            OrderSide::Sell => (trade.true_value - trade_price) * qty,
        };

        let prev_inventory = self.inventory;
        match trade.taker_side {
            OrderSide::Buy => self.inventory -= trade.qty as i64,
            OrderSide::Sell => self.inventory += trade.qty as i64,
        }
        let inventory_mtm = prev_inventory as f64 * (true_value_after - trade.true_value);

        self.spread_pnl += spread_captured;
        self.total_spread_captured += spread_captured.abs();
        self.fill_count += 1;
        self.inventory_pnl += inventory_mtm;

        self.window.push_back(WindowEntry {
            adverse: trade.taker_class == OwnerClass::Informed,
        });
        while self.window.len() > WINDOW_SIZE {
            self.window.pop_front();
        }

        self.adapt_spread();
    }

    fn adapt_spread(&mut self) {
        if self.window.len() < MIN_WINDOW_FOR_ADAPTATION {
            return;
        }
        let adverse = self.window.iter().filter(|e| e.adverse).count() as f64;
        let a = adverse / self.window.len() as f64;
        let target = self.base_spread * (1.0 + 3.0 * a);
        self.current_spread += self.adapt_rate * (target - self.current_spread);
        self.current_spread = self.current_spread.max(0.5 * self.base_spread);
    }
}
