use rust_decimal::Decimal;

/// Which of the three agent populations owns an order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OwnerClass {
    Maker,
    Informed,
    Noise,
}

/// Buy or sell.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Limit orders rest in the book; market orders execute immediately against
/// resting liquidity and any unfilled remainder is discarded, not rested.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OrderKind {
    Limit,
    Market,
}

/// An order accepted (or about to be accepted) by the book.
///
/// `price` is zero for market orders. `filled` never exceeds `qty`; a
/// resting limit order always has `filled < qty` (a fully filled order is
/// removed from the book rather than left at `filled == qty`).
#[derive(Clone, Debug)]
pub struct Order {
    pub id: String,
    pub owner_id: String,
    pub owner_class: OwnerClass,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub price: Decimal,
    pub qty: u64,
    pub filled: u64,
    pub ts: i64,
}

impl Order {
    pub fn new(
        id: String,
        owner_id: String,
        owner_class: OwnerClass,
        side: OrderSide,
        kind: OrderKind,
        price: Decimal,
        qty: u64,
        ts: i64,
    ) -> eyre::Result<Self> {
        if qty == 0 {
            return Err(eyre::eyre!("order quantity must be positive"));
        }
        if kind == OrderKind::Limit && price <= Decimal::ZERO {
            return Err(eyre::eyre!("limit order price must be positive"));
        }
        Ok(Self {
            id,
            owner_id,
            owner_class,
            side,
            kind,
            price,
            qty,
            filled: 0,
            ts,
        })
    }

    pub fn remaining(&self) -> u64 {
        self.qty - self.filled
    }
}

/// An immutable record of a single fill. A taker order that sweeps several
/// price levels, or several resting orders at one level, produces one
/// `Trade` per fill; the trade log is the primary event stream of a run.
#[derive(Clone, Debug)]
pub struct Trade {
    pub id: String,
    pub ts: i64,
    pub price: Decimal,
    pub qty: u64,
    pub taker_order_id: String,
    pub taker_owner_id: String,
    pub taker_side: OrderSide,
    pub taker_class: OwnerClass,
    pub maker_order_id: String,
    pub maker_owner_id: String,
    pub maker_class: OwnerClass,
    /// True value at the instant of the trade: the value established by the
    /// previous tick's price-process step (or the initial value, for the
    /// very first trade), never the value produced by this tick's step.
    pub true_value: f64,
}

/// Rounds a raw price to the nearest cent and returns it as an exact
/// `Decimal`, matching the maker's `round(x*100)/100` quoting rule.
pub fn round_to_cent(x: f64) -> Decimal {
    Decimal::new((x * 100.0).round() as i64, 2)
}

/// Monotonically increasing order/trade identity generator, shared by every
/// agent in a run so that identities never collide. Held by the simulation
/// (not as process-wide global state) and reset whenever a run restarts.
#[derive(Debug, Clone, Default)]
pub struct IdSeq {
    next: u64,
}

impl IdSeq {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next(&mut self, prefix: &str) -> String {
        let id = self.next;
        self.next += 1;
        format!("{prefix}-{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_quantity() {
        let err = Order::new(
            "o-0".into(),
            "mm".into(),
            OwnerClass::Maker,
            OrderSide::Buy,
            OrderKind::Limit,
            Decimal::new(10000, 2),
            0,
            0,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_non_positive_limit_price() {
        let err = Order::new(
            "o-0".into(),
            "mm".into(),
            OwnerClass::Maker,
            OrderSide::Buy,
            OrderKind::Limit,
            Decimal::ZERO,
            10,
            0,
        );
        assert!(err.is_err());
    }

    #[test]
    fn market_order_allows_zero_price() {
        let order = Order::new(
            "o-0".into(),
            "noise".into(),
            OwnerClass::Noise,
            OrderSide::Buy,
            OrderKind::Market,
            Decimal::ZERO,
            5,
            0,
        )
        .unwrap();
        assert_eq!(order.remaining(), 5);
    }

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(round_to_cent(99.951), Decimal::new(9995, 2));
        assert_eq!(round_to_cent(100.0), Decimal::new(10000, 2));
    }

    #[test]
    fn id_seq_is_monotonic_and_unique() {
        let mut seq = IdSeq::new();
        let a = seq.next("mm");
        let b = seq.next("noise");
        let c = seq.next("mm");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "mm-0");
        assert_eq!(b, "noise-1");
        assert_eq!(c, "mm-2");
    }
}
