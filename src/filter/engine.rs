use crate::dither::sampler::{BlendProbability, DitherSampler};
use crate::filter::config::FilterConfig;
use crate::filter::frame::{ChannelOrder, Frame};
use crate::filter::recompress::{Niceness, recompress};
use crate::foundation::core::brightness;
use crate::foundation::error::MilkResult;
use crate::palette::table::PaletteVariant;

/// Palette quantizer with stochastic boundary blending.
///
/// Immutable and `Sync`: one instance is shared by every worker, while each worker brings its
/// own [`DitherSampler`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameFilter {
    variant: PaletteVariant,
    probability: BlendProbability,
    recompress: Option<Niceness>,
}

impl FrameFilter {
    /// Build a filter from its parts.
    pub fn new(
        variant: PaletteVariant,
        probability: BlendProbability,
        recompress: Option<Niceness>,
    ) -> Self {
        Self {
            variant,
            probability,
            recompress,
        }
    }

    /// Build a filter from a validated [`FilterConfig`].
    pub fn from_config(cfg: &FilterConfig) -> MilkResult<Self> {
        cfg.validate()?;
        Ok(Self::new(
            cfg.palette,
            cfg.blend_probability(),
            cfg.recompress,
        ))
    }

    /// Active palette variant.
    pub fn variant(&self) -> PaletteVariant {
        self.variant
    }

    /// Blend probability applied to every boundary band.
    pub fn probability(&self) -> BlendProbability {
        self.probability
    }

    /// Filter a copy of `frame`.
    ///
    /// Steps: reorder to RGB, optional JPEG round trip, per-pixel quantization, restore the
    /// original channel order. The output always has the input's dimensions and only contains
    /// colors of the active variant.
    pub fn filter(&self, frame: &Frame, sampler: &mut DitherSampler) -> MilkResult<Frame> {
        let mut out = frame.to_order(ChannelOrder::Rgb);
        if let Some(niceness) = self.recompress {
            out = recompress(&out, niceness)?;
        }
        self.quantize_rgb(&mut out.data, sampler);
        out.convert_order(frame.order);
        Ok(out)
    }

    /// Quantize a packed RGB buffer in place.
    pub fn quantize_rgb(&self, rgb: &mut [u8], sampler: &mut DitherSampler) {
        for px in rgb.chunks_exact_mut(3) {
            let band = self.variant.map_brightness(brightness([px[0], px[1], px[2]]));
            // Pure bands never consume a trial.
            let hit = band.is_boundary() && sampler.sample(self.probability);
            px.copy_from_slice(&band.resolve(hit).to_array());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/engine.rs"]
mod tests;
