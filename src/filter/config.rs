use crate::dither::sampler::BlendProbability;
use crate::filter::recompress::Niceness;
use crate::foundation::error::{MilkError, MilkResult};
use crate::palette::table::PaletteVariant;
use crate::schedule::partition::PartitionPolicy;

/// Filter and worker settings shared read-only by every worker.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Palette variant (`1` or `2` in JSON).
    pub palette: PaletteVariant,
    /// Blend boundary bands stochastically (`p = 0.70`) instead of collapsing them.
    pub effect: bool,
    /// Lossy recompression niceness; `None` disables the pre-step.
    pub recompress: Option<Niceness>,
    /// Number of workers (ranges) to split the frame list into.
    pub workers: usize,
    /// Base seed for the per-worker generators. `None` draws fresh entropy per worker.
    pub seed: Option<u64>,
    /// How frames are split between workers.
    pub partition: PartitionPolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            palette: PaletteVariant::Type1,
            effect: false,
            recompress: None,
            workers: default_workers(),
            seed: None,
            partition: PartitionPolicy::Naive,
        }
    }
}

impl FilterConfig {
    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> MilkResult<()> {
        if self.workers == 0 {
            return Err(MilkError::validation("worker count must be >= 1"));
        }
        Ok(())
    }

    /// Blend probability implied by `effect`.
    pub fn blend_probability(&self) -> BlendProbability {
        BlendProbability::from_effect(self.effect)
    }
}

/// Available hardware threads, falling back to 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
