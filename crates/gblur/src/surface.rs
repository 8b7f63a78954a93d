//! Provider calls with their failures mapped to [`BlurError`].

use gblur_core::{BackingFit, IRect};
use gblur_gpu::{GpuSurface, LocalMatrix, Paint, SurfaceDesc, SurfaceProvider};

use crate::error::{BlurError, BlurResult};

/// Transparent black.
pub(crate) const TRANSPARENT: [f32; 4] = [0.0; 4];

/// `target` resized to `width` x `height` with `fit`.
///
/// Non-positive sizes become zero, which providers refuse to allocate.
pub(crate) fn sized(target: &SurfaceDesc, width: i32, height: i32, fit: BackingFit) -> SurfaceDesc {
    SurfaceDesc::new(width.max(0) as u32, height.max(0) as u32, target.format)
        .with_color_space(target.color_space)
        .with_fit(fit)
}

pub(crate) fn allocate<P: SurfaceProvider>(provider: &P, desc: &SurfaceDesc) -> BlurResult<P::Surface> {
    provider.allocate(desc).map_err(BlurError::Allocation)
}

pub(crate) fn acquire<P: SurfaceProvider>(provider: &P, surface: P::Surface) -> BlurResult<P::Texture> {
    provider.into_texture(surface).map_err(BlurError::TextureAcquisition)
}

/// Zeroes `rect`, skipping empty rectangles.
pub(crate) fn clear<P: SurfaceProvider>(provider: &P, surface: &mut P::Surface, rect: IRect) -> BlurResult<()> {
    if rect.is_empty() {
        return Ok(());
    }
    provider.clear(surface, rect, TRANSPARENT).map_err(BlurError::Draw)
}

/// Draws `paint`, filtering in linear light when `surface` is a tagged sRGB
/// target.
pub(crate) fn draw<P: SurfaceProvider>(
    provider: &P,
    surface: &mut P::Surface,
    rect: IRect,
    paint: Paint<'_, P::Texture>,
    local: LocalMatrix,
) -> BlurResult<()> {
    let paint = paint.with_gamma_correct(surface.desc().is_gamma_correct());
    provider.draw_rect(surface, rect, &paint, local).map_err(BlurError::Draw)
}
