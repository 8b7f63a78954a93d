//! The surface provider abstraction the blur engine is written against.

use gblur_core::{BackingFit, ColorSpace, IRect, PixelFormat};

use crate::backend::GpuLimits;
use crate::paint::{LocalMatrix, Paint};
use crate::GpuResult;

/// Allocation request for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDesc {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
    /// Storage format.
    pub format: PixelFormat,
    /// Color space tag.
    pub color_space: Option<ColorSpace>,
    /// Backing store policy.
    pub fit: BackingFit,
}

impl SurfaceDesc {
    /// Exact-fit, untagged surface.
    pub const fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            color_space: None,
            fit: BackingFit::Exact,
        }
    }

    /// Sets the color space tag.
    pub const fn with_color_space(mut self, color_space: Option<ColorSpace>) -> Self {
        self.color_space = color_space;
        self
    }

    /// Sets the backing fit.
    pub const fn with_fit(mut self, fit: BackingFit) -> Self {
        self.fit = fit;
        self
    }

    /// Logical bounds at the origin.
    #[inline]
    pub const fn bounds(&self) -> IRect {
        IRect::from_size(self.width, self.height)
    }

    /// Whether draws into this surface filter in linear light.
    ///
    /// True for sRGB-encoded formats with a color space tag; untagged
    /// surfaces are filtered on their stored values.
    #[inline]
    pub const fn is_gamma_correct(&self) -> bool {
        self.format.is_srgb() && self.color_space.is_some()
    }

    /// Number of `f32` values in an RGBA image of the logical size.
    #[inline]
    pub const fn pixel_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Common view of surfaces and textures.
pub trait GpuSurface: Send + Sync {
    /// Description the surface was allocated with.
    fn desc(&self) -> &SurfaceDesc;

    /// Allocated (width, height), at least the logical size.
    fn backing_size(&self) -> (u32, u32);

    /// Logical width.
    fn width(&self) -> u32 {
        self.desc().width
    }

    /// Logical height.
    fn height(&self) -> u32 {
        self.desc().height
    }

    /// Logical bounds at the origin.
    fn bounds(&self) -> IRect {
        self.desc().bounds()
    }

    /// Device memory held by the backing store.
    fn size_bytes(&self) -> u64 {
        let (w, h) = self.backing_size();
        w as u64 * h as u64 * self.desc().format.bytes_per_pixel() as u64
    }
}

/// Allocation and draw counters of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProviderStats {
    /// Surfaces and textures currently alive.
    pub live_surfaces: u64,
    /// Backing bytes currently alive.
    pub live_bytes: u64,
    /// Successful allocations (uploads included).
    pub allocations: u64,
    /// Refused allocations.
    pub failed_allocations: u64,
    /// Rectangle draws recorded.
    pub draws: u64,
    /// Clears recorded.
    pub clears: u64,
}

/// Device operations the blur engine depends on.
///
/// Surfaces are render targets owned by whoever allocated them. Converting
/// one into a [`Texture`](Self::Texture) ends its writable life; the texture
/// can then be sampled by effects in later draws.
///
/// # Coordinate rules
///
/// - Draws are clipped to the surface's logical bounds.
/// - Clears are clipped to the *backing store*, so strips just past the
///   logical edge of an approximate-fit surface can be zeroed.
/// - Effects read texels clamped to the texture's logical bounds after
///   domain resolution.
pub trait SurfaceProvider: Send + Sync {
    /// Writable surface.
    type Surface: GpuSurface;
    /// Read-only texture.
    type Texture: GpuSurface;

    /// Allocates a surface; contents are unspecified.
    fn allocate(&self, desc: &SurfaceDesc) -> GpuResult<Self::Surface>;

    /// Fills `rect` with `color`.
    fn clear(&self, surface: &mut Self::Surface, rect: IRect, color: [f32; 4]) -> GpuResult<()>;

    /// Fills `rect` with the output of `paint`, mapping pixel centers
    /// through `local` into the effect's texture space.
    fn draw_rect(
        &self,
        surface: &mut Self::Surface,
        rect: IRect,
        paint: &Paint<'_, Self::Texture>,
        local: LocalMatrix,
    ) -> GpuResult<()>;

    /// Turns a finished render target into a readable texture.
    fn into_texture(&self, surface: Self::Surface) -> GpuResult<Self::Texture>;

    /// Creates a texture from RGBA `f32` pixels of the logical size.
    fn upload(&self, desc: &SurfaceDesc, pixels: &[f32]) -> GpuResult<Self::Texture>;

    /// Reads the logical region back as RGBA `f32`, row-major.
    fn read_pixels(&self, texture: &Self::Texture) -> GpuResult<Vec<f32>>;

    /// Largest surface dimension the device supports.
    fn max_texture_dimension(&self) -> u32 {
        self.limits().max_texture_dim
    }

    /// Allocation and draw counters.
    fn stats(&self) -> ProviderStats;

    /// Device limits.
    fn limits(&self) -> &GpuLimits;

    /// Backend name.
    fn name(&self) -> &'static str;
}
