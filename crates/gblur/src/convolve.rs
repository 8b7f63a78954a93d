//! Separable 1D Gaussian passes.
//!
//! With a domain mode other than Ignore, the destination is split into bands
//! so only pixels near the content edge pay for bounded sampling. For an X
//! pass:
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │            top: clear            │
//! ├──────┬────────────────────┬──────┤
//! │ left │  mid: no bounds    │right │  rows of the content rectangle
//! ├──────┴────────────────────┴──────┤
//! │          bottom: clear           │
//! └──────────────────────────────────┘
//! ```
//!
//! `left` and `right` are `radius` wide inside the content. When the
//! content is narrower than two radii the middle band vanishes and the
//! whole row band is convolved with bounds. A Y pass is the same with the
//! axes swapped.

use gblur_core::{BackingFit, DomainMode, IPoint, IRect};
use gblur_gpu::{Direction, Effect, LocalMatrix, Paint, SurfaceDesc, SurfaceProvider};
use tracing::trace;

use crate::error::BlurResult;
use crate::sigma::AxisBlur;
use crate::surface;

/// Draws one 1D convolution over `rect`, reading the source at
/// `dst - src_offset`.
#[allow(clippy::too_many_arguments)]
fn convolve_gaussian_1d<P: SurfaceProvider>(
    provider: &P,
    dst: &mut P::Surface,
    rect: IRect,
    src_offset: IPoint,
    texture: &P::Texture,
    direction: Direction,
    axis: AxisBlur,
    mode: DomainMode,
    bounds: [i32; 2],
) -> BlurResult<()> {
    let paint = Paint::new(Effect::GaussianConvolution {
        texture,
        direction,
        radius: axis.radius,
        sigma: axis.sigma,
        mode,
        bounds,
    });
    surface::draw(provider, dst, rect, paint, LocalMatrix::from_offset(src_offset))
}

/// Convolves `texture` along `direction` into a new `src_rect`-sized surface.
///
/// `src_bounds` is the content rectangle in texture coordinates and
/// `src_offset` maps texture coordinates to destination coordinates.
#[allow(clippy::too_many_arguments)]
pub fn convolve_gaussian<P: SurfaceProvider>(
    provider: &P,
    texture: &P::Texture,
    src_rect: IRect,
    src_offset: IPoint,
    direction: Direction,
    axis: AxisBlur,
    src_bounds: IRect,
    mode: DomainMode,
    target: &SurfaceDesc,
    fit: BackingFit,
) -> BlurResult<P::Surface> {
    debug_assert!(
        src_rect.width() <= target.width as i32 && src_rect.height() <= target.height as i32,
        "pass {src_rect} larger than output"
    );

    let desc = surface::sized(target, src_rect.width(), src_rect.height(), fit);
    let mut dst = surface::allocate(provider, &desc)?;
    let mut dst_rect = IRect::from_wh(src_rect.width(), src_rect.height());

    if mode == DomainMode::Ignore {
        trace!(?direction, radius = axis.radius, %dst_rect, "convolve");
        convolve_gaussian_1d(provider, &mut dst, dst_rect, src_offset, texture, direction, axis, mode, [0, 0])?;
        return Ok(dst);
    }

    let mut mid = src_bounds.offset(src_offset);
    let (bounds, top, bottom, left, right);
    match direction {
        Direction::X => {
            bounds = [src_bounds.left, src_bounds.right];
            top = IRect::from_ltrb(0, 0, dst_rect.right, mid.top);
            bottom = IRect::from_ltrb(0, mid.bottom, dst_rect.right, dst_rect.bottom);
            mid = mid.inset(axis.radius, 0);
            left = IRect::from_ltrb(0, mid.top, mid.left, mid.bottom);
            right = IRect::from_ltrb(mid.right, mid.top, dst_rect.width(), mid.bottom);
            dst_rect.top = mid.top;
            dst_rect.bottom = mid.bottom;
        }
        Direction::Y => {
            bounds = [src_bounds.top, src_bounds.bottom];
            top = IRect::from_ltrb(0, 0, mid.left, dst_rect.bottom);
            bottom = IRect::from_ltrb(mid.right, 0, dst_rect.right, dst_rect.bottom);
            mid = mid.inset(0, axis.radius);
            left = IRect::from_ltrb(mid.left, 0, mid.right, mid.top);
            right = IRect::from_ltrb(mid.left, mid.bottom, mid.right, dst_rect.height());
            dst_rect.left = mid.left;
            dst_rect.right = mid.right;
        }
    }
    trace!(?direction, radius = axis.radius, mode = %mode, %mid, "convolve bands");

    surface::clear(provider, &mut dst, top)?;
    surface::clear(provider, &mut dst, bottom)?;

    if mid.is_empty() {
        // Radius covers the content: bounded sampling everywhere
        convolve_gaussian_1d(provider, &mut dst, dst_rect, src_offset, texture, direction, axis, mode, bounds)?;
    } else {
        convolve_gaussian_1d(provider, &mut dst, left, src_offset, texture, direction, axis, mode, bounds)?;
        convolve_gaussian_1d(provider, &mut dst, right, src_offset, texture, direction, axis, mode, bounds)?;
        convolve_gaussian_1d(
            provider,
            &mut dst,
            mid,
            src_offset,
            texture,
            direction,
            axis,
            DomainMode::Ignore,
            bounds,
        )?;
    }
    Ok(dst)
}
