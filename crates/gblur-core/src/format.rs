//! Pixel formats and color types.
//!
//! Two enums describe pixel layout at different levels:
//!
//! - [`PixelFormat`] - The storage layout a GPU surface is allocated with
//!   (channel order, bits per channel, sRGB encoding)
//! - [`ColorType`] - The logical color type of an image, independent of
//!   how a particular device stores it
//!
//! Not every pixel format has a color type: two-channel and single-channel
//! float formats exist on the device but cannot be described as an image,
//! and blurring them fails with [`Error::UnsupportedFormat`](crate::Error).
//!
//! # Quantization
//!
//! Providers keep pixels as `f32` RGBA internally and round each write to the
//! precision of the surface's format with [`PixelFormat::quantize`]:
//!
//! | Format | Precision |
//! |--------|-----------|
//! | `Rgba8888`, `Bgra8888`, `Rgb888`, sRGB variants | 8 bits |
//! | `Rgba4444` | 4 bits |
//! | `Rgb565` | 5/6/5 bits, alpha 1.0 |
//! | `Rgba1010102` | 10 bits color, 2 bits alpha |
//! | `RgbaHalf` | IEEE 754 half float |
//! | `Alpha8` | alpha only, 8 bits |
//! | `RgbaFloat` | full `f32` |

use half::f16;

use crate::colorspace::ColorSpace;

/// Storage layout of a device surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit RGBA, linear encoding.
    #[default]
    Rgba8888,
    /// 8-bit BGRA, linear encoding.
    Bgra8888,
    /// 8-bit RGBA with sRGB-encoded color channels.
    Srgba8888,
    /// 8-bit BGRA with sRGB-encoded color channels.
    Sbgra8888,
    /// 8-bit RGB, alpha is always opaque.
    Rgb888,
    /// 4 bits per channel RGBA.
    Rgba4444,
    /// 16-bit packed RGB (5/6/5), alpha is always opaque.
    Rgb565,
    /// 16-bit half float RGBA.
    RgbaHalf,
    /// 8-bit alpha only.
    Alpha8,
    /// 10 bits per color channel with 2-bit alpha.
    Rgba1010102,
    /// 32-bit float RGBA.
    RgbaFloat,
    /// Two 8-bit channels (no image color type).
    Rg88,
    /// Single half float channel (no image color type).
    R16Float,
}

impl PixelFormat {
    /// Short lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rgba8888 => "rgba8888",
            Self::Bgra8888 => "bgra8888",
            Self::Srgba8888 => "srgba8888",
            Self::Sbgra8888 => "sbgra8888",
            Self::Rgb888 => "rgb888",
            Self::Rgba4444 => "rgba4444",
            Self::Rgb565 => "rgb565",
            Self::RgbaHalf => "rgba_half",
            Self::Alpha8 => "alpha8",
            Self::Rgba1010102 => "rgba1010102",
            Self::RgbaFloat => "rgba_float",
            Self::Rg88 => "rg88",
            Self::R16Float => "r16_float",
        }
    }

    /// Whether color channels are stored sRGB-encoded.
    #[inline]
    pub const fn is_srgb(&self) -> bool {
        matches!(self, Self::Srgba8888 | Self::Sbgra8888)
    }

    /// Bytes per pixel in device memory.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Alpha8 => 1,
            Self::Rgba4444 | Self::Rgb565 | Self::Rg88 | Self::R16Float => 2,
            Self::Rgba8888
            | Self::Bgra8888
            | Self::Srgba8888
            | Self::Sbgra8888
            | Self::Rgb888
            | Self::Rgba1010102 => 4,
            Self::RgbaHalf => 8,
            Self::RgbaFloat => 16,
        }
    }

    /// Image color type for this format, if one exists.
    ///
    /// ```rust
    /// use gblur_core::{ColorType, PixelFormat};
    ///
    /// assert_eq!(PixelFormat::Sbgra8888.color_type(), Some(ColorType::Bgra8888));
    /// assert_eq!(PixelFormat::Rg88.color_type(), None);
    /// ```
    pub const fn color_type(&self) -> Option<ColorType> {
        match self {
            Self::Rgba8888 | Self::Srgba8888 => Some(ColorType::Rgba8888),
            Self::Bgra8888 | Self::Sbgra8888 => Some(ColorType::Bgra8888),
            Self::Rgb888 => Some(ColorType::Rgb888x),
            Self::Rgba4444 => Some(ColorType::Argb4444),
            Self::Rgb565 => Some(ColorType::Rgb565),
            Self::RgbaHalf => Some(ColorType::RgbaF16),
            Self::Alpha8 => Some(ColorType::Alpha8),
            Self::Rgba1010102 => Some(ColorType::Rgba1010102),
            Self::RgbaFloat => Some(ColorType::RgbaF32),
            Self::Rg88 | Self::R16Float => None,
        }
    }

    /// Rounds an RGBA value to what this format can store.
    pub fn quantize(&self, px: [f32; 4]) -> [f32; 4] {
        match self {
            Self::Rgba8888 | Self::Bgra8888 | Self::Srgba8888 | Self::Sbgra8888 => {
                px.map(|c| unorm(c, 255.0))
            }
            Self::Rgb888 => [unorm(px[0], 255.0), unorm(px[1], 255.0), unorm(px[2], 255.0), 1.0],
            Self::Rgba4444 => px.map(|c| unorm(c, 15.0)),
            Self::Rgb565 => [unorm(px[0], 31.0), unorm(px[1], 63.0), unorm(px[2], 31.0), 1.0],
            Self::Rgba1010102 => [
                unorm(px[0], 1023.0),
                unorm(px[1], 1023.0),
                unorm(px[2], 1023.0),
                unorm(px[3], 3.0),
            ],
            Self::Alpha8 => [0.0, 0.0, 0.0, unorm(px[3], 255.0)],
            Self::RgbaHalf => px.map(|c| f16::from_f32(c).to_f32()),
            Self::Rg88 => [unorm(px[0], 255.0), unorm(px[1], 255.0), 0.0, 1.0],
            Self::R16Float => [f16::from_f32(px[0]).to_f32(), 0.0, 0.0, 1.0],
            Self::RgbaFloat => px,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn unorm(c: f32, max: f32) -> f32 {
    (c.clamp(0.0, 1.0) * max).round() / max
}

/// Pixel format the blur renders into for a given source format.
///
/// An sRGB-encoded source without a color space is blurred into a plain
/// `Rgba8888` target: writing through an sRGB target would re-encode the
/// shader output, and not every device can turn that conversion off.
///
/// ```rust
/// use gblur_core::{blur_pixel_format, ColorSpace, PixelFormat};
///
/// assert_eq!(blur_pixel_format(PixelFormat::Srgba8888, None), PixelFormat::Rgba8888);
/// assert_eq!(
///     blur_pixel_format(PixelFormat::Srgba8888, Some(ColorSpace::Srgb)),
///     PixelFormat::Srgba8888
/// );
/// ```
pub fn blur_pixel_format(src: PixelFormat, color_space: Option<ColorSpace>) -> PixelFormat {
    if src.is_srgb() && color_space.is_none() {
        PixelFormat::Rgba8888
    } else {
        src
    }
}

/// Logical color type of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    /// Alpha only.
    Alpha8,
    /// 5/6/5 RGB.
    Rgb565,
    /// 4 bits per channel.
    Argb4444,
    /// 8-bit RGBA.
    Rgba8888,
    /// 8-bit RGB with an ignored fourth byte.
    Rgb888x,
    /// 8-bit BGRA.
    Bgra8888,
    /// 10-bit color, 2-bit alpha.
    Rgba1010102,
    /// Half float RGBA.
    RgbaF16,
    /// Float RGBA.
    RgbaF32,
}

impl ColorType {
    /// Whether every pixel of this type is opaque.
    pub const fn is_always_opaque(&self) -> bool {
        matches!(self, Self::Rgb565 | Self::Rgb888x)
    }
}

/// How the alpha channel relates to the color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaType {
    /// Every pixel is opaque.
    Opaque,
    /// Color channels are premultiplied by alpha.
    #[default]
    Premul,
    /// Color channels are independent of alpha.
    Unpremul,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_type_mapping() {
        assert_eq!(PixelFormat::Rgba8888.color_type(), Some(ColorType::Rgba8888));
        assert_eq!(PixelFormat::Srgba8888.color_type(), Some(ColorType::Rgba8888));
        assert_eq!(PixelFormat::RgbaHalf.color_type(), Some(ColorType::RgbaF16));
        assert_eq!(PixelFormat::R16Float.color_type(), None);
        assert!(ColorType::Rgb565.is_always_opaque());
    }

    #[test]
    fn test_blur_format_keeps_linear() {
        assert_eq!(blur_pixel_format(PixelFormat::RgbaHalf, None), PixelFormat::RgbaHalf);
        assert_eq!(blur_pixel_format(PixelFormat::Sbgra8888, None), PixelFormat::Rgba8888);
        assert_eq!(
            blur_pixel_format(PixelFormat::Sbgra8888, Some(ColorSpace::DisplayP3)),
            PixelFormat::Sbgra8888
        );
    }

    #[test]
    fn test_quantize_8bit() {
        let q = PixelFormat::Rgba8888.quantize([0.5, 1.2, -0.1, 0.25]);
        assert_relative_eq!(q[0], 128.0 / 255.0);
        assert_relative_eq!(q[1], 1.0);
        assert_relative_eq!(q[2], 0.0);
        assert_relative_eq!(q[3], 64.0 / 255.0);
    }

    #[test]
    fn test_quantize_opaque_formats() {
        assert_eq!(PixelFormat::Rgb565.quantize([1.0, 1.0, 1.0, 0.0])[3], 1.0);
        assert_eq!(PixelFormat::Rgb888.quantize([0.0, 0.0, 0.0, 0.3])[3], 1.0);
        assert_eq!(PixelFormat::Alpha8.quantize([1.0, 1.0, 1.0, 1.0]), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_quantize_half_keeps_range() {
        let q = PixelFormat::RgbaHalf.quantize([2.5, -1.0, 0.1, 1.0]);
        assert_eq!(q[0], 2.5);
        assert_eq!(q[1], -1.0);
        assert_relative_eq!(q[2], 0.1, epsilon = 1e-4);
    }
}
