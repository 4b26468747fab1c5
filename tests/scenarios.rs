use adverse_sim_core::{OwnerClass, SimConfig, Simulation};
use rust_decimal_macros::dec;

#[test]
fn cold_start_quote_matches_the_documented_default() {
    let mut sim = Simulation::new(SimConfig::default()).unwrap();
    let snap = sim.step();

    assert_eq!(snap.tick, 0);
    assert!(snap.trades.is_empty());
    assert_eq!(snap.metrics.mm_inventory, 0);

    assert_eq!(snap.book.bids.len(), 1);
    assert_eq!(snap.book.bids[0].price, dec!(99.95));
    assert_eq!(snap.book.bids[0].orders[0].qty, 100);

    assert_eq!(snap.book.asks.len(), 1);
    assert_eq!(snap.book.asks[0].price, dec!(100.05));
    assert_eq!(snap.book.asks[0].orders[0].qty, 100);
}

#[test]
fn noise_only_regime_keeps_informed_and_adverse_counts_at_zero() {
    let mut config = SimConfig::default();
    config.informed_ratio = 0.0;
    let mut sim = Simulation::new(config).unwrap();

    let mut last = sim.step();
    for _ in 0..199 {
        last = sim.step();
        assert!(last.metrics.mm_spread >= 0.5 * 0.10 - 1e-9);
        assert!(last.metrics.mm_spread <= 0.10 + 1e-9);
    }

    assert_eq!(last.metrics.informed_count, 0);
    assert_eq!(last.metrics.adverse_count, 0);
}

#[test]
fn toxic_regime_widens_the_spread_and_accumulates_adverse_fills() {
    let mut config = SimConfig::default();
    config.informed_ratio = 0.8;
    config.ticks = 500;
    let mut sim = Simulation::new(config).unwrap();

    let mut last = sim.step();
    for _ in 0..499 {
        last = sim.step();
    }

    assert!(last.metrics.mm_spread > 0.10, "spread {} did not widen", last.metrics.mm_spread);
    if last.metrics.trade_count > 0 {
        let ratio = last.metrics.adverse_count as f64 / last.metrics.trade_count as f64;
        assert!(ratio > 0.3, "adverse ratio {ratio} too low for a toxic regime");
    }
}

#[test]
fn determinism_two_runs_produce_byte_identical_trade_logs() {
    let config = SimConfig::default();
    let mut sim_a = Simulation::new(config.clone()).unwrap();
    let mut sim_b = Simulation::new(config).unwrap();

    for _ in 0..1000 {
        sim_a.step();
        sim_b.step();
    }

    let trades_a = sim_a.get_trades();
    let trades_b = sim_b.get_trades();
    assert_eq!(trades_a.len(), trades_b.len());
    for (a, b) in trades_a.iter().zip(trades_b.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.ts, b.ts);
        assert_eq!(a.price, b.price);
        assert_eq!(a.qty, b.qty);
        assert_eq!(a.taker_side, b.taker_side);
        assert_eq!(a.taker_class, b.taker_class);
        assert_eq!(a.true_value, b.true_value);
    }
}

#[test]
fn pnl_decomposition_holds_at_every_tick_of_a_toxic_run() {
    let mut config = SimConfig::default();
    config.informed_ratio = 0.5;
    let mut sim = Simulation::new(config).unwrap();

    for _ in 0..1000 {
        let snap = sim.step();
        let stats = snap.metrics.maker_stats;
        let sum = stats.spread_pnl + stats.inventory_pnl;
        assert!(
            (sum - snap.metrics.mm_pnl).abs() < 1e-6,
            "pnl {} != spread {} + inventory {}",
            snap.metrics.mm_pnl,
            stats.spread_pnl,
            stats.inventory_pnl
        );
    }
}

#[test]
fn adverse_count_never_exceeds_informed_count() {
    let mut config = SimConfig::default();
    config.informed_ratio = 0.6;
    let mut sim = Simulation::new(config).unwrap();

    for _ in 0..800 {
        let snap = sim.step();
        assert!(snap.metrics.adverse_count <= snap.metrics.informed_count);
        assert!(snap.metrics.informed_count <= snap.metrics.trade_count);
    }
}

#[test]
fn run_collects_the_full_trade_log_via_the_callback_interface() {
    let mut config = SimConfig::default();
    config.ticks = 300;
    let mut sim = Simulation::new(config).unwrap();

    let mut observed_ticks = Vec::new();
    sim.run(false, |snap| observed_ticks.push(snap.tick));

    assert_eq!(observed_ticks.len(), 300);
    assert_eq!(observed_ticks[0], 0);
    assert_eq!(*observed_ticks.last().unwrap(), 299);
    assert_eq!(sim.get_current_state().unwrap().tick, 299);
}

#[test]
fn every_trade_has_positive_price_and_quantity() {
    let mut config = SimConfig::default();
    config.informed_ratio = 0.5;
    config.arrival_rate = 0.6;
    let mut sim = Simulation::new(config).unwrap();

    for _ in 0..500 {
        sim.step();
    }

    for trade in sim.get_trades() {
        assert!(trade.price > rust_decimal::Decimal::ZERO);
        assert!(trade.qty > 0);
        assert!(trade.true_value >= 0.01);
        assert!(matches!(trade.taker_class, OwnerClass::Noise | OwnerClass::Informed));
    }
}
