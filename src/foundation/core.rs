use crate::foundation::error::{MilkError, MilkResult};

/// 0-based position of a frame in the sorted frame list.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` over the sorted frame list.
///
/// Worker assignments are usually described in inclusive form; see [`FrameRange::last`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> MilkResult<Self> {
        if start.0 > end.0 {
            return Err(MilkError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Create a range from inclusive bounds `[first, last]`.
    pub fn inclusive(first: u64, last: u64) -> MilkResult<Self> {
        Self::new(FrameIndex(first), FrameIndex(last.saturating_add(1)))
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside the range.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Last frame of the range (inclusive), or `None` when empty.
    pub fn last(self) -> Option<FrameIndex> {
        if self.is_empty() {
            None
        } else {
            Some(FrameIndex(self.end.0 - 1))
        }
    }

    /// Iterate the frame indices in increasing order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

impl std::fmt::Display for FrameRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.last() {
            Some(last) => write!(f, "[{}, {}]", self.start.0, last.0),
            None => write!(f, "[]"),
        }
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> MilkResult<Self> {
        if den == 0 {
            return Err(MilkError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MilkError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number FPS.
    pub fn integer(fps: u32) -> MilkResult<Self> {
        Self::new(fps, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Parse an `ffprobe` style ratio (`"30000/1001"`) or a plain integer.
    pub fn parse_ratio(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('/');
        let a = parts.next()?.parse::<u32>().ok()?;
        let b = match parts.next() {
            Some(b) => b.parse::<u32>().ok()?,
            None => 1,
        };
        if parts.next().is_some() {
            return None;
        }
        Self::new(a, b).ok()
    }
}

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in RGB order.
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Truncating integer average of three channel values, always in `[0, 255]`.
pub fn brightness(px: [u8; 3]) -> u8 {
    ((u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2])) / 3) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
