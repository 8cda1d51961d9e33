use image::RgbImage;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MilkError, MilkResult};

/// Byte order of the three channels in a [`Frame`] buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Blue, green, red (raw capture / OpenCV style buffers).
    Bgr,
}

/// One decoded video frame: 8-bit, 3 channels, tightly packed rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Position in the sorted frame list.
    pub index: FrameIndex,
    /// File name used for both reading and writing (no directory component).
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel order of `data`.
    pub order: ChannelOrder,
    /// `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame, validating the buffer size.
    pub fn new(
        index: FrameIndex,
        name: impl Into<String>,
        width: u32,
        height: u32,
        order: ChannelOrder,
        data: Vec<u8>,
    ) -> MilkResult<Self> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(MilkError::frame_decode(format!(
                "frame '{name}' has an empty pixel buffer ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(MilkError::frame_decode(format!(
                "frame '{name}' buffer is {} bytes, expected {expected} for {width}x{height}x3",
                data.len()
            )));
        }
        Ok(Self {
            index,
            name,
            width,
            height,
            order,
            data,
        })
    }

    /// Wrap an RGB image.
    pub fn from_rgb_image(
        index: FrameIndex,
        name: impl Into<String>,
        img: RgbImage,
    ) -> MilkResult<Self> {
        let (w, h) = img.dimensions();
        Self::new(index, name, w, h, ChannelOrder::Rgb, img.into_raw())
    }

    /// Return a copy of this frame with channels in `order`.
    pub fn to_order(&self, order: ChannelOrder) -> Frame {
        let mut out = self.clone();
        out.convert_order(order);
        out
    }

    /// Reorder channels in place.
    pub fn convert_order(&mut self, order: ChannelOrder) {
        if self.order != order {
            swap_red_blue(&mut self.data);
            self.order = order;
        }
    }

    /// Copy out as an RGB image, whatever the stored order.
    pub fn to_rgb_image(&self) -> MilkResult<RgbImage> {
        let rgb = self.to_order(ChannelOrder::Rgb);
        RgbImage::from_raw(rgb.width, rgb.height, rgb.data).ok_or_else(|| {
            MilkError::filter(format!("frame '{}' buffer does not match its size", self.name))
        })
    }

    /// Pixel at `(x, y)` in RGB order, or `None` outside the frame.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * 3;
        let px: [u8; 3] = self.data.get(off..off + 3)?.try_into().ok()?;
        Some(match self.order {
            ChannelOrder::Rgb => px,
            ChannelOrder::Bgr => [px[2], px[1], px[0]],
        })
    }
}

fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/frame.rs"]
mod tests;
