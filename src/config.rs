use serde::{Deserialize, Serialize};

use crate::traders::DEFAULT_EDGE_THRESHOLD;

/// Every read-only knob a run is configured with.
/// Reconfiguration is modelled as building a new [`crate::simulation::Simulation`],
/// never as mutation mid-run.
///
/// Parsing a `SimConfig` from TOML/JSON/env is a collaborator's
/// responsibility; this crate only derives `serde` traits so one can be
/// deserialized from whatever source the embedding application prefers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Truncated to its unsigned 32-bit representation when seeding the RNG.
    pub seed: i64,
    pub initial_price: f64,
    pub volatility: f64,
    pub jump_prob: f64,
    pub jump_size: f64,
    pub mm_base_spread: f64,
    pub mm_size: u64,
    pub mm_adapt_rate: f64,
    pub inventory_skew_factor: f64,
    pub informed_ratio: f64,
    pub arrival_rate: f64,
    pub tick_ms: i64,
    pub ticks: u64,
    /// Informed-taker edge threshold; defaults to 0.0005 and is exposed
    /// rather than hard-coded because the source carries a second value
    /// (0.001) in some contexts.
    pub edge_threshold: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            initial_price: 100.0,
            volatility: 0.001,
            jump_prob: 0.02,
            jump_size: 0.01,
            mm_base_spread: 0.10,
            mm_size: 100,
            mm_adapt_rate: 0.1,
            inventory_skew_factor: 0.0005,
            informed_ratio: 0.2,
            arrival_rate: 0.3,
            tick_ms: 100,
            ticks: 1000,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }
}

impl SimConfig {
    /// Precondition checks: negative probabilities, zero size, and
    /// non-positive prices are programmer errors and fail fast here rather
    /// than surfacing mid-run.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.initial_price <= 0.0 {
            return Err(eyre::eyre!("initial_price must be positive"));
        }
        if self.volatility < 0.0 {
            return Err(eyre::eyre!("volatility must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.jump_prob) {
            return Err(eyre::eyre!("jump_prob must be in [0, 1]"));
        }
        if self.jump_size < 0.0 {
            return Err(eyre::eyre!("jump_size must be non-negative"));
        }
        if self.mm_base_spread <= 0.0 {
            return Err(eyre::eyre!("mm_base_spread must be positive"));
        }
        if self.mm_size == 0 {
            return Err(eyre::eyre!("mm_size must be positive"));
        }
        if self.mm_adapt_rate < 0.0 {
            return Err(eyre::eyre!("mm_adapt_rate must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.informed_ratio) {
            return Err(eyre::eyre!("informed_ratio must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.arrival_rate) {
            return Err(eyre::eyre!("arrival_rate must be in [0, 1]"));
        }
        if self.tick_ms <= 0 {
            return Err(eyre::eyre!("tick_ms must be positive"));
        }
        if self.edge_threshold < 0.0 {
            return Err(eyre::eyre!("edge_threshold must be non-negative"));
        }
        Ok(())
    }
}
