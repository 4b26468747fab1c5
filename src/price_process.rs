use crate::rng::Rng;

/// Floor below which the latent true value is never allowed to fall.
pub const PRICE_FLOOR: f64 = 0.01;

/// Discrete geometric jump-diffusion over the latent "true value".
///
/// Each step draws a diffusion increment, then a Bernoulli for whether a
/// jump fires, then (only if it fires) a fair coin for the jump's sign.
/// That draw order is part of the simulation's determinism contract (see
/// the simulation driver) and must not be reordered.
#[derive(Debug, Clone)]
pub struct PriceProcess {
    value: f64,
    volatility: f64,
    jump_prob: f64,
    jump_size: f64,
}

impl PriceProcess {
    pub fn new(initial_value: f64, volatility: f64, jump_prob: f64, jump_size: f64) -> eyre::Result<Self> {
        if initial_value <= 0.0 {
            return Err(eyre::eyre!("initial value must be positive"));
        }
        if volatility < 0.0 {
            return Err(eyre::eyre!("volatility must be non-negative"));
        }
        if !(0.0..=1.0).contains(&jump_prob) {
            return Err(eyre::eyre!("jump probability must be in [0, 1]"));
        }
        Ok(Self {
            value: initial_value,
            volatility,
            jump_prob,
            jump_size,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advances the process by one step, returning the new value and
    /// whether a jump fired this step.
    pub fn step(&mut self, rng: &mut Rng) -> (f64, bool) {
        let d = rng.normal(0.0, self.volatility);
        let jumped = rng.bool(self.jump_prob);
        let j = if jumped {
            if rng.bool(0.5) {
                self.jump_size
            } else {
                -self.jump_size
            }
        } else {
            0.0
        };
        self.value = (self.value * (1.0 + d + j)).max(PRICE_FLOOR);
        (self.value, jumped)
    }
}
