//! Image descriptors and sampling policies.
//!
//! # Overview
//!
//! - [`ImageInfo`] - Size, color type, alpha type and color space of an image
//! - [`BackingFit`] - Whether a surface's backing store must match its size
//! - [`DomainMode`] - How reads outside a content rectangle are resolved
//!
//! # Backing Stores
//!
//! A surface has a *logical* size (the pixels a stage asked for) and a
//! *backing* size (what the device actually allocated). Approximate fits
//! round the backing size up to a pool bucket so scratch surfaces can be
//! recycled between requests of similar size:
//!
//! ```text
//! ┌──────────────────────────┐
//! │ logical      │ backing   │
//! │ (requested)  │ padding   │
//! ├──────────────┘           │
//! │      backing padding     │
//! └──────────────────────────┘
//! ```
//!
//! Padding is never initialized by the device; stages that could sample it
//! clear the strips they need first.

use crate::colorspace::ColorSpace;
use crate::error::{Error, Result};
use crate::format::{AlphaType, ColorType, PixelFormat};
use crate::rect::IRect;

/// Smallest backing dimension handed out for approximate fits.
pub const MIN_APPROX_DIM: u32 = 16;

/// Above this size approximate fits also use the 1.5x midpoint bucket.
pub const APPROX_MIDPOINT_THRESHOLD: u32 = 1024;

/// Description of an image independent of any device storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Logical color type
    pub color_type: ColorType,
    /// Alpha interpretation
    pub alpha_type: AlphaType,
    /// Color space tag, `None` if untagged
    pub color_space: Option<ColorSpace>,
}

impl ImageInfo {
    /// Creates a new image description.
    pub const fn new(
        width: u32,
        height: u32,
        color_type: ColorType,
        alpha_type: AlphaType,
        color_space: Option<ColorSpace>,
    ) -> Self {
        Self {
            width,
            height,
            color_type,
            alpha_type,
            color_space,
        }
    }

    /// Describes a `width` x `height` image stored in `format`.
    ///
    /// Fails if the format has no color type or a dimension is not positive.
    ///
    /// ```rust
    /// use gblur_core::{AlphaType, ColorType, ImageInfo, PixelFormat};
    ///
    /// let info = ImageInfo::from_format(8, 4, PixelFormat::Bgra8888, AlphaType::Premul, None)?;
    /// assert_eq!(info.color_type, ColorType::Bgra8888);
    /// assert!(ImageInfo::from_format(0, 4, PixelFormat::Bgra8888, AlphaType::Premul, None).is_err());
    /// # Ok::<(), gblur_core::Error>(())
    /// ```
    pub fn from_format(
        width: i32,
        height: i32,
        format: PixelFormat,
        alpha_type: AlphaType,
        color_space: Option<ColorSpace>,
    ) -> Result<Self> {
        let color_type = format.color_type().ok_or(Error::UnsupportedFormat(format))?;
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self::new(width as u32, height as u32, color_type, alpha_type, color_space))
    }

    /// Rectangle covering the whole image, anchored at the origin.
    #[inline]
    pub const fn bounds(&self) -> IRect {
        IRect::from_size(self.width, self.height)
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Backing store sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackingFit {
    /// Backing store matches the logical size exactly.
    #[default]
    Exact,
    /// Backing store may be larger than requested (pool friendly).
    Approx,
}

impl BackingFit {
    /// Backing dimension allocated for a logical dimension `dim`.
    ///
    /// Approximate fits bucket to at least [`MIN_APPROX_DIM`], then to the
    /// next power of two. Past [`APPROX_MIDPOINT_THRESHOLD`] the halfway
    /// point between two powers of two is used when it is large enough.
    /// The result never exceeds `max_dim` (nor drops below `dim`).
    ///
    /// ```rust
    /// use gblur_core::BackingFit;
    ///
    /// assert_eq!(BackingFit::Exact.backing_dim(10, 4096), 10);
    /// assert_eq!(BackingFit::Approx.backing_dim(10, 4096), 16);
    /// assert_eq!(BackingFit::Approx.backing_dim(300, 4096), 512);
    /// assert_eq!(BackingFit::Approx.backing_dim(1100, 4096), 1536);
    /// assert_eq!(BackingFit::Approx.backing_dim(1600, 4096), 2048);
    /// ```
    pub fn backing_dim(self, dim: u32, max_dim: u32) -> u32 {
        match self {
            Self::Exact => dim,
            Self::Approx => approx_dim(dim).min(max_dim).max(dim),
        }
    }
}

fn approx_dim(dim: u32) -> u32 {
    let dim = dim.max(MIN_APPROX_DIM);
    if dim.is_power_of_two() {
        return dim;
    }
    let ceil = dim.checked_next_power_of_two().unwrap_or(u32::MAX);
    if dim <= APPROX_MIDPOINT_THRESHOLD {
        return ceil;
    }
    let floor = ceil >> 1;
    let mid = floor + (floor >> 1);
    if dim <= mid { mid } else { ceil }
}

/// Resolution policy for reads outside a content rectangle.
///
/// ```text
///          content
///        ┌─────────┐
///  Clamp │a b c d e│ e e e ...
///  Repeat│a b c d e│ a b c ...
///  Decal │a b c d e│ 0 0 0 ...
///  Ignore│a b c d e│ (whatever the texture holds)
///        └─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DomainMode {
    /// No domain: read the texture as is.
    #[default]
    Ignore,
    /// Replicate the nearest edge texel.
    Clamp,
    /// Wrap around the content rectangle.
    Repeat,
    /// Transparent black outside the content rectangle.
    Decal,
}

impl DomainMode {
    /// Maps a texel index along one axis into `[lo, hi)`.
    ///
    /// Returns `None` when the read contributes nothing: Decal outside the
    /// range, or an empty range for any mode but Ignore.
    ///
    /// ```rust
    /// use gblur_core::DomainMode;
    ///
    /// assert_eq!(DomainMode::Clamp.resolve(-3, 2, 6), Some(2));
    /// assert_eq!(DomainMode::Repeat.resolve(7, 2, 6), Some(3));
    /// assert_eq!(DomainMode::Decal.resolve(6, 2, 6), None);
    /// assert_eq!(DomainMode::Ignore.resolve(40, 2, 6), Some(40));
    /// ```
    #[inline]
    pub fn resolve(self, i: i32, lo: i32, hi: i32) -> Option<i32> {
        match self {
            Self::Ignore => Some(i),
            _ if hi <= lo => None,
            Self::Clamp => Some(i.clamp(lo, hi - 1)),
            Self::Repeat => Some(lo + (i - lo).rem_euclid(hi - lo)),
            Self::Decal => (lo..hi).contains(&i).then_some(i),
        }
    }

    /// Short lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Clamp => "clamp",
            Self::Repeat => "repeat",
            Self::Decal => "decal",
        }
    }
}

impl std::fmt::Display for DomainMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
