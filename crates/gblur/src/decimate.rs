//! Power-of-two downsampling.
//!
//! Each pass halves the axes that still need reducing with a bilinear 2:1
//! draw, so a pass averages 2x2 (or 2x1) blocks. The read rectangle is
//! first rounded out to a multiple of the scale factors so every halving
//! lands on whole pixels.
//!
//! Only the first pass sees the caller's texture and honors the domain
//! mode; later passes read intermediates with plain clamped sampling.

use gblur_core::{BackingFit, DomainMode, IPoint, IRect};
use gblur_gpu::{LocalMatrix, Paint, SurfaceDesc, SurfaceProvider, TextureDomain};
use tracing::{debug, trace};

use crate::error::BlurResult;
use crate::plan::BlurPlan;
use crate::surface;

/// Downsamples `texture` by the plan's scale factors.
///
/// `content` is the valid region of `texture` and `src_offset` maps texture
/// coordinates to output coordinates. Returns the decimated texture and its
/// content rectangle; the result is addressed in output coordinates divided
/// by the scale factors, so the offset is consumed.
///
/// When a convolution follows, a radius-wide margin past the content is
/// cleared so that pass never samples unwritten memory.
pub fn decimate<P: SurfaceProvider>(
    provider: &P,
    texture: &P::Texture,
    src_offset: IPoint,
    content: IRect,
    plan: &BlurPlan,
    mode: DomainMode,
    target: &SurfaceDesc,
) -> BlurResult<(P::Texture, IRect)> {
    let (sx, sy) = (plan.x.scale_factor, plan.y.scale_factor);
    debug_assert!(sx.count_ones() == 1 && sy.count_ones() == 1, "scale factors must be powers of two");
    debug_assert!(sx > 1 || sy > 1, "nothing to decimate");

    let src_rect = if mode == DomainMode::Ignore {
        target.bounds()
    } else {
        content.offset(src_offset)
    };
    let src_rect = src_rect
        .scale_round_out(1.0 / sx as f32, 1.0 / sy as f32)
        .scale(sx, sy);

    // First pass: from the caller's texture, in its own coordinates.
    let mut dst_rect = src_rect.shrink_by_2(sx > 1, sy > 1);
    let domain = (mode != DomainMode::Ignore).then(|| TextureDomain::new(content, mode));
    let mut dst = allocate_pass(provider, target, dst_rect)?;
    surface::draw(
        provider,
        &mut dst,
        dst_rect,
        Paint::bilinear(texture, domain),
        LocalMatrix::rect_to_rect(dst_rect, src_rect.offset(-src_offset)),
    )?;
    trace!(pass = 1, %dst_rect, "decimate");

    let mut i = 2;
    while i < sx || i < sy {
        let src = surface::acquire(provider, dst)?;
        let src_rect = dst_rect;
        dst_rect = dst_rect.shrink_by_2(i < sx, i < sy);
        dst = allocate_pass(provider, target, dst_rect)?;
        surface::draw(
            provider,
            &mut dst,
            dst_rect,
            Paint::bilinear(&src, None),
            LocalMatrix::rect_to_rect(dst_rect, src_rect),
        )?;
        trace!(pass = i, %dst_rect, "decimate");
        i *= 2;
    }

    let content = dst_rect;
    if plan.x.is_active() {
        if sx > 1 {
            // Protect the X pass from reading garbage right of the content.
            let margin = IRect::from_xywh(content.right, content.top, plan.x.radius, content.height());
            surface::clear(provider, &mut dst, margin)?;
        }
    } else if sy > 1 {
        // Same for a Y pass below the content.
        let margin = IRect::from_xywh(content.left, content.bottom, content.width(), plan.y.radius);
        surface::clear(provider, &mut dst, margin)?;
    }

    debug!(scale_x = sx, scale_y = sy, %content, "decimated");
    Ok((surface::acquire(provider, dst)?, content))
}

/// Intermediate surface reaching the right/bottom edge of `rect`.
fn allocate_pass<P: SurfaceProvider>(provider: &P, target: &SurfaceDesc, rect: IRect) -> BlurResult<P::Surface> {
    let desc = surface::sized(target, rect.right, rect.bottom, BackingFit::Approx);
    surface::allocate(provider, &desc)
}
