use crate::foundation::core::Rgb8;
use crate::foundation::error::{MilkError, MilkResult};

/// Color assignment of a brightness band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandColor {
    /// Always emits this color.
    Pure(Rgb8),
    /// Emits `first` when the dither trial succeeds, `second` otherwise.
    Boundary {
        /// Preferred color.
        first: Rgb8,
        /// Neighboring color.
        second: Rgb8,
    },
}

/// Brightness band `[lo, hi)` and its color assignment.
///
/// `hi` is a `u16` so the top band can end at 256.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteBand {
    /// Inclusive lower brightness bound.
    pub lo: u8,
    /// Exclusive upper brightness bound.
    pub hi: u16,
    /// Color(s) emitted for pixels in this band.
    pub color: BandColor,
}

impl PaletteBand {
    const fn pure(lo: u8, hi: u16, c: Rgb8) -> Self {
        Self {
            lo,
            hi,
            color: BandColor::Pure(c),
        }
    }

    const fn boundary(lo: u8, hi: u16, first: Rgb8, second: Rgb8) -> Self {
        Self {
            lo,
            hi,
            color: BandColor::Boundary { first, second },
        }
    }

    /// `true` when `b` falls inside `[lo, hi)`.
    pub fn contains(&self, b: u8) -> bool {
        self.lo <= b && u16::from(b) < self.hi
    }

    /// `true` for bands that need a dither trial.
    pub fn is_boundary(&self) -> bool {
        matches!(self.color, BandColor::Boundary { .. })
    }

    /// Resolve the band to a color given the outcome of a dither trial.
    ///
    /// Pure bands ignore `hit`.
    pub fn resolve(&self, hit: bool) -> Rgb8 {
        match self.color {
            BandColor::Pure(c) => c,
            BandColor::Boundary { first, second } => {
                if hit {
                    first
                } else {
                    second
                }
            }
        }
    }
}

const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

const TYPE1_B: Rgb8 = Rgb8::new(102, 0, 31);
const TYPE1_C: Rgb8 = Rgb8::new(137, 0, 146);

const TYPE2_B: Rgb8 = Rgb8::new(92, 36, 60);
const TYPE2_C: Rgb8 = Rgb8::new(203, 43, 43);

// b <= 25 | 25 < b <= 70 | 70 < b < 120 | 120 <= b < 200 | 200 <= b < 230 | b >= 230
const TYPE1_BANDS: [PaletteBand; 6] = [
    PaletteBand::pure(0, 26, BLACK),
    PaletteBand::boundary(26, 71, BLACK, TYPE1_B),
    PaletteBand::boundary(71, 120, TYPE1_B, BLACK),
    PaletteBand::pure(120, 200, TYPE1_B),
    PaletteBand::boundary(200, 230, TYPE1_C, TYPE1_B),
    PaletteBand::pure(230, 256, TYPE1_C),
];

// b <= 25 | 25 < b <= 70 | 70 < b < 90 | 90 <= b < 150 | 150 <= b < 200 | b >= 200
const TYPE2_BANDS: [PaletteBand; 6] = [
    PaletteBand::pure(0, 26, BLACK),
    PaletteBand::boundary(26, 71, BLACK, TYPE2_B),
    PaletteBand::boundary(71, 90, TYPE2_B, BLACK),
    PaletteBand::pure(90, 150, TYPE2_B),
    PaletteBand::boundary(150, 200, TYPE2_C, TYPE2_B),
    PaletteBand::pure(200, 256, TYPE2_C),
];

/// Fixed palette configuration ("milk type").
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum PaletteVariant {
    /// Black, deep red-violet, magenta.
    #[default]
    Type1,
    /// Black, dark plum, brick red.
    Type2,
}

impl PaletteVariant {
    /// All variants in selector order.
    pub const ALL: [PaletteVariant; 2] = [PaletteVariant::Type1, PaletteVariant::Type2];

    /// Variant for a numeric selector (`1` or `2`).
    pub fn from_selector(n: u8) -> MilkResult<Self> {
        match n {
            1 => Ok(Self::Type1),
            2 => Ok(Self::Type2),
            other => Err(MilkError::validation(format!(
                "palette variant must be 1 or 2, got {other}"
            ))),
        }
    }

    /// Numeric selector of this variant.
    pub fn selector(self) -> u8 {
        match self {
            Self::Type1 => 1,
            Self::Type2 => 2,
        }
    }

    /// Ordered band table covering `[0, 255]`.
    pub fn bands(self) -> &'static [PaletteBand; 6] {
        match self {
            Self::Type1 => &TYPE1_BANDS,
            Self::Type2 => &TYPE2_BANDS,
        }
    }

    /// The three colors this variant can emit, darkest first.
    pub fn colors(self) -> [Rgb8; 3] {
        match self {
            Self::Type1 => [BLACK, TYPE1_B, TYPE1_C],
            Self::Type2 => [BLACK, TYPE2_B, TYPE2_C],
        }
    }

    /// Band containing `brightness`.
    pub fn map_brightness(self, brightness: u8) -> &'static PaletteBand {
        let bands = self.bands();
        // Bands are contiguous over [0, 256).
        bands
            .iter()
            .find(|band| band.contains(brightness))
            .unwrap_or(&bands[bands.len() - 1])
    }
}

impl TryFrom<u8> for PaletteVariant {
    type Error = MilkError;

    fn try_from(n: u8) -> MilkResult<Self> {
        Self::from_selector(n)
    }
}

impl From<PaletteVariant> for u8 {
    fn from(v: PaletteVariant) -> u8 {
        v.selector()
    }
}

/// Band containing `brightness` for `variant`.
pub fn map_brightness(brightness: u8, variant: PaletteVariant) -> &'static PaletteBand {
    variant.map_brightness(brightness)
}

#[cfg(test)]
#[path = "../../tests/unit/palette/table.rs"]
mod tests;
