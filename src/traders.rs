use crate::order::{IdSeq, Order, OrderKind, OrderSide, OwnerClass};
use crate::rng::Rng;

/// Default threshold below which an informed taker's edge is considered
/// noise and no order is generated. The source carries two values for this
/// constant (0.0005 and 0.001); this crate fixes 0.0005 as the default and
/// exposes it as a configurable parameter rather than guessing between
/// contexts.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.0005;

/// Generates market orders with no informational edge: a coin-flip side and
/// a quantity uniform on `[1, 10]`, with probability `arrival_rate` per
/// tick. Draw order per invocation is arrival, then side, then quantity.
pub struct NoiseTaker {
    pub owner_id: String,
}

impl NoiseTaker {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }

    pub fn generate(
        &self,
        rng: &mut Rng,
        arrival_rate: f64,
        ts: i64,
        ids: &mut IdSeq,
    ) -> Option<Order> {
        if !rng.bool(arrival_rate) {
            return None;
        }
        let side = if rng.bool(0.5) {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        let qty = rng.int(1, 10) as u64;
        Some(
            Order::new(
                ids.next(&self.owner_id),
                self.owner_id.clone(),
                OwnerClass::Noise,
                side,
                OrderKind::Market,
                rust_decimal::Decimal::ZERO,
                qty,
                ts,
            )
            .expect("noise order parameters are always valid"),
        )
    }
}

/// Generates market orders from a privileged view of the latent true value.
/// Trades only when the relative gap between true value and a reference
/// price exceeds `edge_threshold`; otherwise emits nothing even if it
/// "arrives". Draw order per invocation is arrival, then quantity (side is
/// derived from the edge, not drawn).
pub struct InformedTaker {
    pub owner_id: String,
    pub edge_threshold: f64,
}

impl InformedTaker {
    pub fn new(owner_id: impl Into<String>, edge_threshold: f64) -> Self {
        Self {
            owner_id: owner_id.into(),
            edge_threshold,
        }
    }

    pub fn generate(
        &self,
        rng: &mut Rng,
        arrival_rate: f64,
        true_value: f64,
        reference_price: f64,
        ts: i64,
        ids: &mut IdSeq,
    ) -> Option<Order> {
        if !rng.bool(arrival_rate) {
            return None;
        }
        let edge = (true_value - reference_price) / reference_price;
        if edge.abs() < self.edge_threshold {
            return None;
        }
        let side = if edge > 0.0 {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        let qty = rng.int(5, 20) as u64;
        Some(
            Order::new(
                ids.next(&self.owner_id),
                self.owner_id.clone(),
                OwnerClass::Informed,
                side,
                OrderKind::Market,
                rust_decimal::Decimal::ZERO,
                qty,
                ts,
            )
            .expect("informed order parameters are always valid"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_taker_respects_arrival_probability() {
        let taker = NoiseTaker::new("noise");
        let mut rng = Rng::new(1);
        let mut ids = IdSeq::new();
        let mut arrivals = 0;
        for _ in 0..2_000 {
            if taker.generate(&mut rng, 0.3, 0, &mut ids).is_some() {
                arrivals += 1;
            }
        }
        let ratio = arrivals as f64 / 2_000.0;
        assert!((0.2..0.4).contains(&ratio), "arrival ratio {ratio} off target");
    }

    #[test]
    fn noise_quantity_is_in_range() {
        let taker = NoiseTaker::new("noise");
        let mut rng = Rng::new(2);
        let mut ids = IdSeq::new();
        for _ in 0..2_000 {
            if let Some(order) = taker.generate(&mut rng, 1.0, 0, &mut ids) {
                assert!((1..=10).contains(&order.qty));
            }
        }
    }

    #[test]
    fn informed_taker_silent_below_edge_threshold() {
        let taker = InformedTaker::new("informed", DEFAULT_EDGE_THRESHOLD);
        let mut rng = Rng::new(3);
        let mut ids = IdSeq::new();
        // true value 100.02 vs reference 100.00 -> edge = 0.0002, below 0.0005
        let order = taker.generate(&mut rng, 1.0, 100.02, 100.00, 0, &mut ids);
        assert!(order.is_none());
    }

    #[test]
    fn informed_taker_buys_when_true_value_above_reference() {
        let taker = InformedTaker::new("informed", DEFAULT_EDGE_THRESHOLD);
        let mut rng = Rng::new(4);
        let mut ids = IdSeq::new();
        let order = taker
            .generate(&mut rng, 1.0, 101.0, 100.0, 0, &mut ids)
            .expect("edge exceeds threshold");
        assert_eq!(order.side, OrderSide::Buy);
        assert!((5..=20).contains(&order.qty));
    }

    #[test]
    fn informed_taker_sells_when_true_value_below_reference() {
        let taker = InformedTaker::new("informed", DEFAULT_EDGE_THRESHOLD);
        let mut rng = Rng::new(5);
        let mut ids = IdSeq::new();
        let order = taker
            .generate(&mut rng, 1.0, 99.0, 100.0, 0, &mut ids)
            .expect("edge exceeds threshold");
        assert_eq!(order.side, OrderSide::Sell);
    }
}
