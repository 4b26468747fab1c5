use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::SimConfig;
use crate::market_maker::{MakerStats, MarketMaker};
use crate::order::{IdSeq, OwnerClass, Trade};
use crate::order_book::{BookSnapshot, OrderBook};
use crate::price_process::PriceProcess;
use crate::rng::Rng;
use crate::traders::{InformedTaker, NoiseTaker};

/// Per-tick metrics reported alongside each snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub true_value: f64,
    pub mid: Option<Decimal>,
    pub spread: Option<Decimal>,
    pub mm_pnl: f64,
    pub mm_inventory: i64,
    pub mm_spread: f64,
    pub trade_count: u64,
    pub informed_count: u64,
    pub adverse_count: u64,
    pub maker_stats: MakerStats,
}

/// Returned by every [`Simulation::step`]: the tick index, its metrics, a
/// full book snapshot, and the trades produced this tick.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub tick: u64,
    pub metrics: Metrics,
    pub book: BookSnapshot,
    pub trades: Vec<Trade>,
}

/// The tick-driven simulation: sequences maker quoting, taker arrival,
/// matching, the latent-value step, and maker bookkeeping in the fixed
/// order required for determinism.
pub struct Simulation {
    config: SimConfig,
    rng: Rng,
    book: OrderBook,
    price_process: PriceProcess,
    maker: MarketMaker,
    noise: NoiseTaker,
    informed: InformedTaker,
    ids: IdSeq,
    trades: Vec<Trade>,
    tick: u64,
    running: bool,
    trade_count: u64,
    informed_count: u64,
    adverse_count: u64,
    last_snapshot: Option<Snapshot>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> eyre::Result<Self> {
        config.validate()?;

        let rng = Rng::new(config.seed as u32);
        let book = OrderBook::new(config.initial_price)?;
        let price_process = PriceProcess::new(
            config.initial_price,
            config.volatility,
            config.jump_prob,
            config.jump_size,
        )?;
        let maker = MarketMaker::new(
            "mm",
            config.mm_base_spread,
            config.mm_size,
            config.mm_adapt_rate,
            config.inventory_skew_factor,
        )?;
        let noise = NoiseTaker::new("noise");
        let informed = InformedTaker::new("informed", config.edge_threshold);

        Ok(Self {
            config,
            rng,
            book,
            price_process,
            maker,
            noise,
            informed,
            ids: IdSeq::new(),
            trades: Vec::new(),
            tick: 0,
            running: false,
            trade_count: 0,
            informed_count: 0,
            adverse_count: 0,
            last_snapshot: None,
        })
    }

    /// Executes exactly one tick: maker quotes, a taker may arrive and
    /// match, the latent value steps, the maker ingests this tick's trades,
    /// and a snapshot is returned.
    pub fn step(&mut self) -> Snapshot {
        let ts = self.tick as i64 * self.config.tick_ms;

        self.maker
            .quote(&mut self.book, self.price_process.value(), ts, &mut self.ids);

        let is_informed = self.rng.bool(self.config.informed_ratio);
        let mut tick_trades = Vec::new();
        if is_informed {
            let reference_price = self
                .book
                .mid()
                .and_then(|m| m.to_f64())
                .unwrap_or_else(|| self.price_process.value());
            if let Some(order) = self.informed.generate(
                &mut self.rng,
                self.config.arrival_rate,
                self.price_process.value(),
                reference_price,
                ts,
                &mut self.ids,
            ) {
                tick_trades.extend(self.book.submit(order));
            }
        } else if let Some(order) =
            self.noise
                .generate(&mut self.rng, self.config.arrival_rate, ts, &mut self.ids)
        {
            tick_trades.extend(self.book.submit(order));
        }

        let (new_true_value, _jumped) = self.price_process.step(&mut self.rng);
        self.book.set_true_value(new_true_value);

        for trade in &tick_trades {
            self.maker.on_trade(trade, new_true_value);

            self.trade_count += 1;
            if trade.taker_class == OwnerClass::Informed {
                self.informed_count += 1;
                if trade.maker_owner_id == self.maker.owner_id {
                    self.adverse_count += 1;
                }
            }
        }
        self.trades.extend(tick_trades.iter().cloned());

        let metrics = Metrics {
            true_value: new_true_value,
            mid: self.book.mid(),
            spread: self.book.spread(),
            mm_pnl: self.maker.pnl(),
            mm_inventory: self.maker.inventory(),
            mm_spread: self.maker.quoted_spread(),
            trade_count: self.trade_count,
            informed_count: self.informed_count,
            adverse_count: self.adverse_count,
            maker_stats: self.maker.stats(),
        };
        let snapshot = Snapshot {
            tick: self.tick,
            metrics,
            book: self.book.snapshot(ts),
            trades: tick_trades,
        };

        self.tick += 1;
        self.last_snapshot = Some(snapshot.clone());
        snapshot
    }

    /// Runs up to `config.ticks`, invoking `on_tick` with each snapshot.
    /// When `realtime` is `true`, cooperatively sleeps `tick_ms` between
    /// ticks; this only paces how fast a collaborator receives callbacks
    /// and has no bearing on the deterministic trade/metric stream.
    pub fn run(&mut self, realtime: bool, mut on_tick: impl FnMut(&Snapshot)) {
        self.running = true;
        while self.running && self.tick < self.config.ticks {
            let snapshot = self.step();
            on_tick(&snapshot);
            if realtime {
                std::thread::sleep(std::time::Duration::from_millis(
                    self.config.tick_ms.max(0) as u64,
                ));
            }
        }
        self.running = false;
    }

    /// Requests termination after the current tick completes.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn get_trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn get_current_state(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}
