pub mod config;
pub mod market_maker;
pub mod order;
pub mod order_book;
pub mod price_process;
pub mod rng;
pub mod simulation;
pub mod traders;

pub use config::SimConfig;
pub use market_maker::{MakerStats, MarketMaker};
pub use order::{IdSeq, Order, OrderKind, OrderSide, OwnerClass, Trade};
pub use order_book::{BookLevelDetail, BookSnapshot, LevelView, OrderBook};
pub use price_process::PriceProcess;
pub use rng::Rng;
pub use simulation::{Metrics, Simulation, Snapshot};
pub use traders::{InformedTaker, NoiseTaker};
