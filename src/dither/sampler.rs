use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

use crate::foundation::error::{MilkError, MilkResult};

/// Probability that a boundary band resolves to its first-listed color.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct BlendProbability(f64);

impl BlendProbability {
    /// Probability used when the blend effect is enabled.
    pub const EFFECT_ON: BlendProbability = BlendProbability(0.70);
    /// Probability used when the blend effect is disabled (boundary bands collapse).
    pub const EFFECT_OFF: BlendProbability = BlendProbability(1.0);

    /// Validated probability in `[0, 1]`.
    pub fn new(p: f64) -> MilkResult<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(MilkError::validation(format!(
                "blend probability must be within [0, 1], got {p}"
            )));
        }
        Ok(Self(p))
    }

    /// Probability derived from the `effect` flag.
    pub fn from_effect(effect: bool) -> Self {
        if effect {
            Self::EFFECT_ON
        } else {
            Self::EFFECT_OFF
        }
    }

    /// Raw value.
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Independent Bernoulli trials for boundary-band blending.
///
/// Each worker owns one sampler; samplers are never shared across threads.
#[derive(Debug, Clone)]
pub struct DitherSampler {
    rng: StdRng,
}

impl DitherSampler {
    /// Deterministic sampler for `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random::<u64>())
    }

    /// Sampler for worker `worker`.
    ///
    /// With a base seed every worker gets a distinct, reproducible stream; without one each
    /// worker draws fresh entropy.
    pub fn for_worker(base_seed: Option<u64>, worker: usize) -> Self {
        match base_seed {
            Some(base) => Self::seeded(worker_seed(base, worker)),
            None => Self::from_entropy(),
        }
    }

    /// One trial: `true` with probability `p`.
    pub fn sample(&mut self, p: BlendProbability) -> bool {
        self.rng.random_bool(p.get())
    }
}

/// splitmix64 finalizer over `base + worker`, so adjacent workers get unrelated seeds.
fn worker_seed(base: u64, worker: usize) -> u64 {
    let mut z = base.wrapping_add((worker as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
#[path = "../../tests/unit/dither/sampler.rs"]
mod tests;
