//! Upsampling back to the output size.

use gblur_core::{BackingFit, DomainMode, IRect};
use gblur_gpu::{GpuSurface, LocalMatrix, Paint, SurfaceDesc, SurfaceProvider, TextureDomain};
use tracing::debug;

use crate::error::BlurResult;
use crate::surface;

/// Bilinearly upsamples a decimated, convolved surface to `target` size.
///
/// Output pixel `(x, y)` samples the source at `((x + 0.5) / sx, (y + 0.5) / sy)`,
/// so each source pixel covers an `sx` x `sy` block of the output. The
/// whole output rectangle is drawn.
pub fn reexpand<P: SurfaceProvider>(
    provider: &P,
    mut src: P::Surface,
    scale_x: i32,
    scale_y: i32,
    mode: DomainMode,
    target: &SurfaceDesc,
    fit: BackingFit,
) -> BlurResult<P::Surface> {
    let src_rect = src.bounds();
    clear_bilinear_border(provider, &mut src)?;
    let texture = surface::acquire(provider, src)?;

    let desc = target.with_fit(fit);
    let mut dst = surface::allocate(provider, &desc)?;
    let domain = (mode != DomainMode::Ignore).then(|| TextureDomain::new(src_rect, mode));
    let local = LocalMatrix::scale(1.0 / scale_x as f32, 1.0 / scale_y as f32);
    debug!(scale_x, scale_y, from = %src_rect, to = %desc.bounds(), "reexpand");
    surface::draw(provider, &mut dst, desc.bounds(), Paint::bilinear(&texture, domain), local)?;
    Ok(dst)
}

/// Zeroes the column right of and the row below `src`'s content.
///
/// These pixels may lie in approximate-fit padding that a bilinear footprint
/// at the content edge touches.
pub(crate) fn clear_bilinear_border<P: SurfaceProvider>(provider: &P, src: &mut P::Surface) -> BlurResult<()> {
    let rect = src.bounds();
    let below = IRect::from_xywh(rect.left, rect.bottom, rect.width() + 1, 1);
    let right = IRect::from_xywh(rect.right, rect.top, 1, rect.height());
    surface::clear(provider, src, below)?;
    surface::clear(provider, src, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{provider, red, FORMAT, POISON};
    use approx::assert_relative_eq;

    fn constant_surface(p: &gblur_gpu::CpuProvider, w: u32, h: u32, v: f32) -> gblur_gpu::CpuSurface {
        let desc = SurfaceDesc::new(w, h, FORMAT).with_fit(BackingFit::Approx);
        let mut s = p.allocate(&desc).unwrap();
        p.clear(&mut s, desc.bounds(), [v, 0.0, 0.0, 1.0]).unwrap();
        s
    }

    #[test]
    fn test_output_size_exact() {
        let p = provider();
        let src = constant_surface(&p, 5, 3, 0.25);
        let target = SurfaceDesc::new(37, 10, FORMAT);
        let dst = reexpand(&p, src, 8, 4, DomainMode::Ignore, &target, BackingFit::Exact).unwrap();
        assert_eq!(dst.backing_size(), (37, 10));
        for v in red(&p, dst) {
            assert_relative_eq!(v, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_linear_ramp_interpolated() {
        let p = provider();
        let desc = SurfaceDesc::new(4, 1, FORMAT);
        let tex = p.upload(&desc, &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 1.0, 3.0, 0.0, 0.0, 1.0]).unwrap();
        let mut src = p.allocate(&desc).unwrap();
        p.draw_rect(&mut src, desc.bounds(), &Paint::texture(&tex), LocalMatrix::IDENTITY).unwrap();

        let target = SurfaceDesc::new(8, 1, FORMAT);
        let out = red(&p, reexpand(&p, src, 2, 1, DomainMode::Clamp, &target, BackingFit::Exact).unwrap());
        // x = 1 samples u = 1.0: halfway between texels 0 and 1
        assert_relative_eq!(out[1], 0.25, epsilon = 1e-6);
        assert_relative_eq!(out[2], 0.75, epsilon = 1e-6);
        // Edges clamp
        assert_relative_eq!(out[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(out[7], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_decal_darkens_edges() {
        let p = provider();
        let src = constant_surface(&p, 4, 4, 1.0);
        let target = SurfaceDesc::new(16, 16, FORMAT);
        let out = red(&p, reexpand(&p, src, 4, 4, DomainMode::Decal, &target, BackingFit::Exact).unwrap());
        assert!(out[0] < 1.0);
        assert_relative_eq!(out[8 * 16 + 8], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_border_cleared_in_padding() {
        let p = provider();
        let mut src = constant_surface(&p, 5, 3, 0.25);
        assert_eq!(src.backing_size(), (16, 16));
        clear_bilinear_border(&p, &mut src).unwrap();
        let t = p.into_texture(src).unwrap();

        for y in 0..=3 {
            assert_eq!(t.backing_texel(5, y), Some([0.0; 4]), "right column y={y}");
        }
        for x in 0..=5 {
            assert_eq!(t.backing_texel(x, 3), Some([0.0; 4]), "bottom row x={x}");
        }
        // Content untouched, nothing past the one pixel border written
        assert_eq!(t.backing_texel(4, 2), Some([0.25, 0.0, 0.0, 1.0]));
        assert_eq!(t.backing_texel(6, 0), Some([POISON; 4]));
        assert_eq!(t.backing_texel(0, 4), Some([POISON; 4]));
        assert_eq!(t.backing_texel(6, 3), Some([POISON; 4]));
    }
}
