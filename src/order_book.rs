use crate::order::{Order, OrderKind, OrderSide, OwnerClass, Trade};

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Resting orders at a single price point, FIFO by arrival.
#[derive(Default)]
struct LevelOrders {
    orders: VecDeque<Order>,
    remaining_qty: u64,
}

impl LevelOrders {
    fn push(&mut self, order: Order) {
        self.remaining_qty += order.remaining();
        self.orders.push_back(order);
    }
}

/// Where a resting order lives, so cancellation doesn't need to scan both
/// sides of the book.
struct IndexEntry {
    side: OrderSide,
    price: Decimal,
    owner_id: String,
}

/// Aggregated view of one price level, as returned by [`OrderBook::levels`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelView {
    pub price: Decimal,
    pub qty: u64,
}

/// A price level with its full resting-order detail, as carried in a
/// [`BookSnapshot`].
#[derive(Clone, Debug)]
pub struct BookLevelDetail {
    pub price: Decimal,
    pub orders: Vec<Order>,
}

/// A full point-in-time view of the book, returned by the simulation driver
/// alongside each tick's trades.
#[derive(Clone, Debug)]
pub struct BookSnapshot {
    pub ts: i64,
    pub bids: Vec<BookLevelDetail>,
    pub asks: Vec<BookLevelDetail>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
}

/// Price-time priority limit order book with market and limit matching.
///
/// Bids and asks are each a `BTreeMap<Decimal, LevelOrders>` so that best
/// bid/ask lookup and ascending/descending level iteration are both
/// `O(log n)`; an order-id index gives `O(1)` cancellation. A resting level
/// is always non-empty; the level is removed from its map the instant its
/// last order is filled or cancelled.
pub struct OrderBook {
    bids: BTreeMap<Decimal, LevelOrders>,
    asks: BTreeMap<Decimal, LevelOrders>,
    index: HashMap<String, IndexEntry>,
    true_value: f64,
    next_trade_id: u64,
}

impl OrderBook {
    pub fn new(initial_true_value: f64) -> eyre::Result<Self> {
        if initial_true_value <= 0.0 {
            return Err(eyre::eyre!("initial true value must be positive"));
        }
        Ok(Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            true_value: initial_true_value,
            next_trade_id: 0,
        })
    }

    pub fn true_value(&self) -> f64 {
        self.true_value
    }

    /// Copies the latest latent value into the book so the next match
    /// stamps trades with the contemporaneous true value.
    pub fn set_true_value(&mut self, value: f64) {
        self.true_value = value;
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    pub fn mid(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Top 5 levels per side with aggregated remaining quantity: bids
    /// descending from the best bid, asks ascending from the best ask.
    pub fn levels(&self, side: OrderSide) -> Vec<LevelView> {
        const DEPTH: usize = 5;
        match side {
            OrderSide::Buy => self
                .bids
                .iter()
                .rev()
                .take(DEPTH)
                .map(|(price, level)| LevelView {
                    price: *price,
                    qty: level.remaining_qty,
                })
                .collect(),
            OrderSide::Sell => self
                .asks
                .iter()
                .take(DEPTH)
                .map(|(price, level)| LevelView {
                    price: *price,
                    qty: level.remaining_qty,
                })
                .collect(),
        }
    }

    /// Full book detail (every level, every resting order), for the
    /// per-tick snapshot handed to collaborators.
    pub fn snapshot(&self, ts: i64) -> BookSnapshot {
        let bids = self
            .bids
            .iter()
            .rev()
            .map(|(price, level)| BookLevelDetail {
                price: *price,
                orders: level.orders.iter().cloned().collect(),
            })
            .collect();
        let asks = self
            .asks
            .iter()
            .map(|(price, level)| BookLevelDetail {
                price: *price,
                orders: level.orders.iter().cloned().collect(),
            })
            .collect();
        BookSnapshot {
            ts,
            bids,
            asks,
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
        }
    }

    /// Submits an order (limit or market) for matching. Returns the trades
    /// produced; a limit order's unfilled remainder is rested, a market
    /// order's is discarded.
    pub fn submit(&mut self, mut taker: Order) -> Vec<Trade> {
        let mut trades = Vec::new();

        match taker.side {
            OrderSide::Buy => {
                while taker.remaining() > 0 {
                    let Some(price) = self.asks.keys().next().copied() else {
                        break;
                    };
                    if taker.kind == OrderKind::Limit && taker.price < price {
                        break;
                    }
                    self.match_level(&mut taker, OrderSide::Sell, price, &mut trades);
                }
            }
            OrderSide::Sell => {
                while taker.remaining() > 0 {
                    let Some(price) = self.bids.keys().next_back().copied() else {
                        break;
                    };
                    if taker.kind == OrderKind::Limit && taker.price > price {
                        break;
                    }
                    self.match_level(&mut taker, OrderSide::Buy, price, &mut trades);
                }
            }
        }

        if taker.kind == OrderKind::Limit && taker.remaining() > 0 {
            self.rest(taker);
        }

        trades
    }

    /// Matches `taker` against the FIFO queue at `price` on `maker_side`,
    /// consuming makers from the front until either the taker is filled or
    /// the level is exhausted (in which case the level is removed).
    fn match_level(
        &mut self,
        taker: &mut Order,
        maker_side: OrderSide,
        price: Decimal,
        trades: &mut Vec<Trade>,
    ) {
        let book_side = match maker_side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        };
        let level = book_side
            .get_mut(&price)
            .expect("price level indexed by best_bid/best_ask must exist");

        while taker.remaining() > 0 && !level.orders.is_empty() {
            let maker = level
                .orders
                .front_mut()
                .expect("non-empty level must have a front order");
            let fill_qty = taker.remaining().min(maker.remaining());

            self.next_trade_id += 1;
            trades.push(Trade {
                id: format!("t-{}", self.next_trade_id),
                ts: taker.ts,
                price,
                qty: fill_qty,
                taker_order_id: taker.id.clone(),
                taker_owner_id: taker.owner_id.clone(),
                taker_side: taker.side,
                taker_class: taker.owner_class,
                maker_order_id: maker.id.clone(),
                maker_owner_id: maker.owner_id.clone(),
                maker_class: maker.owner_class,
                true_value: self.true_value,
            });

            maker.filled += fill_qty;
            taker.filled += fill_qty;
            level.remaining_qty -= fill_qty;

            if maker.remaining() == 0 {
                let filled = level.orders.pop_front().expect("front just matched");
                self.index.remove(&filled.id);
            }
        }

        if level.orders.is_empty() {
            book_side.remove(&price);
        }
    }

    /// Adds a limit order's residual quantity to the book. Market orders
    /// never reach here; their remainder is simply discarded by `submit`.
    fn rest(&mut self, order: Order) {
        let side = order.side;
        let price = order.price;
        let owner_id = order.owner_id.clone();
        let id = order.id.clone();

        let book_side = match side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        };
        book_side.entry(price).or_default().push(order);
        self.index.insert(
            id,
            IndexEntry {
                side,
                price,
                owner_id,
            },
        );
    }

    /// Cancels a resting order by id. Cancelling an id that is not resting
    /// (unknown, already filled, already cancelled) is a silent no-op.
    pub fn cancel(&mut self, order_id: &str) {
        let Some(entry) = self.index.remove(order_id) else {
            return;
        };
        let book_side = match entry.side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        };
        let Some(level) = book_side.get_mut(&entry.price) else {
            return;
        };
        if let Some(pos) = level.orders.iter().position(|o| o.id == order_id) {
            let removed = level.orders.remove(pos).expect("position just found");
            level.remaining_qty -= removed.remaining();
        }
        if level.orders.is_empty() {
            book_side.remove(&entry.price);
        }
    }

    /// Cancels every resting order owned by `owner_id`.
    pub fn cancel_all(&mut self, owner_id: &str) {
        let ids: Vec<String> = self
            .index
            .iter()
            .filter(|(_, entry)| entry.owner_id == owner_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in ids {
            self.cancel(&id);
        }
    }
}
