//! Draw descriptions.
//!
//! A [`Paint`] tells a provider how to color each pixel of a drawn rectangle.
//! Effects read from a source texture in *local* coordinates: the provider
//! maps every destination pixel center through a [`LocalMatrix`] and hands
//! the result to the effect.
//!
//! # Coordinates
//!
//! ```text
//! destination pixel (x, y)
//!        │  center (x + 0.5, y + 0.5)
//!        ▼
//!   LocalMatrix ──► local point (u, v) in source texels
//!        │
//!        ├── Nearest / convolutions: texel (floor(u), floor(v))
//!        └── Bilinear: 2x2 texels around (u - 0.5, v - 0.5)
//! ```
//!
//! A pure integer translation therefore addresses texel `(x - tx, y - ty)`
//! exactly, and a 2:1 rectangle mapping with bilinear filtering averages a
//! 2x2 block, which is what decimation relies on.
//!
//! Draws replace the destination pixels. A gamma-correct paint decodes sRGB
//! texels to linear light before the effect runs and encodes the effect
//! output before it is stored.

use gblur_core::{DomainMode, IPoint, IRect};

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Single texel.
    #[default]
    Nearest,
    /// Weighted 2x2 texels.
    Bilinear,
}

/// Convolution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Horizontal
    X,
    /// Vertical
    Y,
}

impl Direction {
    /// Unit step along the axis.
    #[inline]
    pub const fn step(self) -> IPoint {
        match self {
            Self::X => IPoint::new(1, 0),
            Self::Y => IPoint::new(0, 1),
        }
    }
}

/// Restricts texel reads to a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDomain {
    /// Valid texels
    pub rect: IRect,
    /// What reads outside `rect` return
    pub mode: DomainMode,
}

impl TextureDomain {
    /// Creates a domain.
    pub const fn new(rect: IRect, mode: DomainMode) -> Self {
        Self { rect, mode }
    }

    /// Resolves a texel through the domain; `None` reads transparent black.
    #[inline]
    pub fn resolve(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let x = self.mode.resolve(x, self.rect.left, self.rect.right)?;
        let y = self.mode.resolve(y, self.rect.top, self.rect.bottom)?;
        Some((x, y))
    }
}

/// Per-pixel color producer.
#[derive(Debug)]
pub enum Effect<'a, T> {
    /// Plain texture sampling.
    Texture {
        /// Source texture.
        texture: &'a T,
        /// Sampling filter.
        filter: Filter,
        /// Optional read restriction.
        domain: Option<TextureDomain>,
    },
    /// 1D Gaussian along `direction` with `2 * radius + 1` taps.
    ///
    /// Unless `mode` is Ignore, tap positions along the axis are resolved
    /// into `bounds[0]..bounds[1]`.
    GaussianConvolution {
        /// Source texture.
        texture: &'a T,
        /// Convolution axis.
        direction: Direction,
        /// Taps on each side of the center.
        radius: i32,
        /// Gaussian standard deviation in texels.
        sigma: f32,
        /// Resolution of taps outside `bounds`.
        mode: DomainMode,
        /// Valid texel range along the axis, end exclusive.
        bounds: [i32; 2],
    },
    /// Single-pass 2D Gaussian, taps resolved into `bounds` unless `mode`
    /// is Ignore.
    MatrixConvolution {
        /// Source texture.
        texture: &'a T,
        /// Horizontal taps on each side of the center.
        radius_x: i32,
        /// Vertical taps on each side of the center.
        radius_y: i32,
        /// Horizontal standard deviation.
        sigma_x: f32,
        /// Vertical standard deviation.
        sigma_y: f32,
        /// Resolution of taps outside `bounds`.
        mode: DomainMode,
        /// Valid texels.
        bounds: IRect,
    },
}

impl<'a, T> Effect<'a, T> {
    /// Source texture read by the effect.
    pub fn texture(&self) -> &'a T {
        match *self {
            Self::Texture { texture, .. }
            | Self::GaussianConvolution { texture, .. }
            | Self::MatrixConvolution { texture, .. } => texture,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Texture { .. } => "texture",
            Self::GaussianConvolution { .. } => "gaussian_1d",
            Self::MatrixConvolution { .. } => "gaussian_2d",
        }
    }
}

/// Effect plus how its colors are encoded.
#[derive(Debug)]
pub struct Paint<'a, T> {
    /// Color producer.
    pub effect: Effect<'a, T>,
    /// Filter sRGB texels in linear light and re-encode the output.
    pub gamma_correct: bool,
}

impl<'a, T> Paint<'a, T> {
    /// Replaces the destination with `effect`, on stored values.
    pub fn new(effect: Effect<'a, T>) -> Self {
        Self {
            effect,
            gamma_correct: false,
        }
    }

    /// Nearest-neighbor copy of `texture`.
    pub fn texture(texture: &'a T) -> Self {
        Self::new(Effect::Texture {
            texture,
            filter: Filter::Nearest,
            domain: None,
        })
    }

    /// Bilinear sampling of `texture`, optionally through a domain.
    pub fn bilinear(texture: &'a T, domain: Option<TextureDomain>) -> Self {
        Self::new(Effect::Texture {
            texture,
            filter: Filter::Bilinear,
            domain,
        })
    }

    /// Sets gamma-correct filtering.
    pub fn with_gamma_correct(mut self, gamma_correct: bool) -> Self {
        self.gamma_correct = gamma_correct;
        self
    }
}

/// Axis-aligned mapping from destination pixel centers to local coordinates:
/// `u = x * sx + tx`, `v = y * sy + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMatrix {
    /// Horizontal scale.
    pub sx: f32,
    /// Vertical scale.
    pub sy: f32,
    /// Horizontal translation.
    pub tx: f32,
    /// Vertical translation.
    pub ty: f32,
}

impl LocalMatrix {
    /// Destination and local coordinates coincide.
    pub const IDENTITY: LocalMatrix = LocalMatrix {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Pure translation.
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx,
            ty,
        }
    }

    /// Translation under which destination pixel `(x, y)` reads texel
    /// `(x - offset.x, y - offset.y)`.
    pub fn from_offset(offset: IPoint) -> Self {
        Self::translate(-offset.x as f32, -offset.y as f32)
    }

    /// Scale about the origin.
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            sx,
            sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Maps rectangle `dst` onto rectangle `src`.
    ///
    /// ```rust
    /// use gblur_core::IRect;
    /// use gblur_gpu::LocalMatrix;
    ///
    /// let m = LocalMatrix::rect_to_rect(IRect::from_wh(5, 5), IRect::from_xywh(10, 0, 10, 10));
    /// assert_eq!(m.map(0.0, 0.0), (10.0, 0.0));
    /// assert_eq!(m.map(5.0, 5.0), (20.0, 10.0));
    /// ```
    pub fn rect_to_rect(dst: IRect, src: IRect) -> Self {
        let sx = src.width() as f32 / dst.width() as f32;
        let sy = src.height() as f32 / dst.height() as f32;
        Self {
            sx,
            sy,
            tx: src.left as f32 - dst.left as f32 * sx,
            ty: src.top as f32 - dst.top as f32 * sy,
        }
    }

    /// Applies the mapping to a point.
    #[inline]
    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.sx + self.tx, y * self.sy + self.ty)
    }
}

impl Default for LocalMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_defaults_to_stored_values() {
        let texture = ();
        let paint = Paint::texture(&texture);
        assert!(!paint.gamma_correct);
        assert!(paint.with_gamma_correct(true).gamma_correct);
    }

    #[test]
    fn test_offset_matrix() {
        let m = LocalMatrix::from_offset(IPoint::new(-3, 2));
        assert_eq!(m.map(0.5, 4.5), (3.5, 2.5));
    }

    #[test]
    fn test_domain_resolve() {
        let d = TextureDomain::new(IRect::from_ltrb(2, 2, 4, 4), DomainMode::Clamp);
        assert_eq!(d.resolve(0, 9), Some((2, 3)));
        let d = TextureDomain::new(IRect::from_ltrb(2, 2, 4, 4), DomainMode::Decal);
        assert_eq!(d.resolve(3, 4), None);
    }
}
