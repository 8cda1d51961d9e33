use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageFormat};

use crate::filter::frame::{ChannelOrder, Frame};
use crate::foundation::error::{MilkError, MilkResult};

/// Recompression "niceness" in `[0, 100]`.
///
/// `0` keeps the codec at its best quality, `100` asks for maximal extra loss. The JPEG quality
/// actually used is `100 - niceness`, floored at the codec minimum of 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Niceness(u8);

impl Niceness {
    /// Validated niceness.
    pub fn new(n: u8) -> MilkResult<Self> {
        if n > 100 {
            return Err(MilkError::validation(format!(
                "recompression quality must be within [0, 100], got {n}"
            )));
        }
        Ok(Self(n))
    }

    /// Raw value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// JPEG quality passed to the encoder.
    pub fn jpeg_quality(self) -> u8 {
        (100 - self.0).max(1)
    }
}

impl TryFrom<u8> for Niceness {
    type Error = MilkError;

    fn try_from(n: u8) -> MilkResult<Self> {
        Self::new(n)
    }
}

impl From<Niceness> for u8 {
    fn from(n: Niceness) -> u8 {
        n.0
    }
}

/// Push `frame` through a lossy JPEG round trip.
///
/// The returned frame keeps the input's index, name, dimensions and channel order.
pub fn recompress(frame: &Frame, niceness: Niceness) -> MilkResult<Frame> {
    let rgb = frame.to_order(ChannelOrder::Rgb);

    let mut jpeg = Vec::with_capacity(rgb.data.len() / 4);
    JpegEncoder::new_with_quality(&mut jpeg, niceness.jpeg_quality())
        .encode(&rgb.data, rgb.width, rgb.height, ExtendedColorType::Rgb8)
        .map_err(|e| {
            MilkError::filter(format!("jpeg recompression of '{}' failed: {e}", frame.name))
        })?;

    let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
        .map_err(|e| {
            MilkError::filter(format!("jpeg re-read of '{}' failed: {e}", frame.name))
        })?
        .into_rgb8();

    let mut out = Frame::from_rgb_image(frame.index, frame.name.clone(), decoded)?;
    if (out.width, out.height) != (frame.width, frame.height) {
        return Err(MilkError::filter(format!(
            "jpeg round trip changed '{}' from {}x{} to {}x{}",
            frame.name, frame.width, frame.height, out.width, out.height
        )));
    }
    out.convert_order(frame.order);
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/filter/recompress.rs"]
mod tests;
