//! Color space tags attached to surfaces.
//!
//! The blur never converts between color spaces; the tag travels with each
//! surface so the result is described the same way as its source, and its
//! absence changes how sRGB-encoded sources are rendered
//! (see [`blur_pixel_format`](crate::blur_pixel_format)).
//!
//! A tagged surface with an sRGB pixel format is *gamma correct*: its texels
//! are decoded to linear light before filtering and the filtered result is
//! encoded again on write, with [`decode_srgb`] and [`encode_srgb`].

use std::fmt;

/// Known color spaces.
///
/// Surfaces carry an `Option<ColorSpace>`; `None` means "untagged", which
/// devices treat as raw values in the device's native space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// sRGB primaries with the sRGB transfer curve.
    Srgb,
    /// sRGB primaries with a linear transfer.
    SrgbLinear,
    /// Display P3 primaries with the sRGB transfer curve.
    DisplayP3,
    /// ITU-R BT.2020 primaries.
    Rec2020,
}

impl ColorSpace {
    /// Short lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Srgb => "srgb",
            Self::SrgbLinear => "srgb-linear",
            Self::DisplayP3 => "display-p3",
            Self::Rec2020 => "rec2020",
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// sRGB transfer curve, encoded value to linear light.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Inverse sRGB transfer curve, linear light to encoded value.
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Decodes the color channels of an sRGB pixel; alpha is stored linearly.
#[inline]
pub fn decode_srgb(px: [f32; 4]) -> [f32; 4] {
    [srgb_to_linear(px[0]), srgb_to_linear(px[1]), srgb_to_linear(px[2]), px[3]]
}

/// Encodes the color channels of a linear pixel to sRGB.
#[inline]
pub fn encode_srgb(px: [f32; 4]) -> [f32; 4] {
    [linear_to_srgb(px[0]), linear_to_srgb(px[1]), linear_to_srgb(px[2]), px[3]]
}
