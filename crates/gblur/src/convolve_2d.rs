//! Single-pass 2D Gaussian for small kernels.

use gblur_core::{BackingFit, DomainMode, IPoint, IRect};
use gblur_gpu::{Effect, LocalMatrix, Paint, SurfaceDesc, SurfaceProvider, MAX_KERNEL_SIZE};
use tracing::trace;

use crate::error::BlurResult;
use crate::sigma::AxisBlur;
use crate::surface;

/// Blurs both axes of `texture` in one draw into a `target`-sized surface.
///
/// Only valid without decimation and when the combined kernel fits in
/// [`MAX_KERNEL_SIZE`] taps.
#[allow(clippy::too_many_arguments)]
pub fn convolve_gaussian_2d<P: SurfaceProvider>(
    provider: &P,
    texture: &P::Texture,
    src_bounds: IRect,
    src_offset: IPoint,
    x: AxisBlur,
    y: AxisBlur,
    mode: DomainMode,
    target: &SurfaceDesc,
    fit: BackingFit,
) -> BlurResult<P::Surface> {
    debug_assert!(x.scale_factor == 1 && y.scale_factor == 1, "2D pass on a decimated blur");
    debug_assert!(x.kernel_width() * y.kernel_width() <= MAX_KERNEL_SIZE);

    let desc = target.with_fit(fit);
    let mut dst = surface::allocate(provider, &desc)?;
    trace!(radius_x = x.radius, radius_y = y.radius, mode = %mode, "convolve 2d");

    let paint = Paint::new(Effect::MatrixConvolution {
        texture,
        radius_x: x.radius,
        radius_y: y.radius,
        sigma_x: x.sigma,
        sigma_y: y.sigma,
        mode,
        bounds: src_bounds,
    });
    surface::draw(provider, &mut dst, desc.bounds(), paint, LocalMatrix::from_offset(src_offset))?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigma::normalize_sigma;
    use crate::testing::{image, provider, red, FORMAT};
    use approx::assert_relative_eq;

    #[test]
    fn test_impulse_matches_outer_product() {
        let p = provider();
        let src = image(&p, 7, 7, |x, y| if (x, y) == (3, 3) { 1.0 } else { 0.0 });
        let (x, y) = (normalize_sigma(0.6, 256), normalize_sigma(0.3, 256));
        let dst = convolve_gaussian_2d(
            &p,
            &src,
            IRect::from_wh(7, 7),
            IPoint::ZERO,
            x,
            y,
            DomainMode::Ignore,
            &SurfaceDesc::new(7, 7, FORMAT),
            BackingFit::Exact,
        )
        .unwrap();
        let out = red(&p, dst);

        let kernel = gblur_gpu::gaussian_kernel_2d(x.radius, y.radius, x.sigma, y.sigma);
        let width = x.kernel_width() as usize;
        for (j, row) in kernel.chunks(width).enumerate() {
            for (i, w) in row.iter().enumerate() {
                let (px, py) = (3 + i - x.radius as usize, 3 + j - y.radius as usize);
                assert_relative_eq!(out[py * 7 + px], *w, epsilon = 1e-6);
            }
        }
        assert_relative_eq!(out.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_decal_bounds_with_offset() {
        let p = provider();
        let src = image(&p, 8, 8, |_, _| 1.0);
        let axis = normalize_sigma(0.5, 256);
        // Output covers source (2..6, 2..6); content is source (2..6, 2..6).
        let dst = convolve_gaussian_2d(
            &p,
            &src,
            IRect::from_ltrb(2, 2, 6, 6),
            IPoint::new(-2, -2),
            axis,
            axis,
            DomainMode::Decal,
            &SurfaceDesc::new(4, 4, FORMAT),
            BackingFit::Exact,
        )
        .unwrap();
        let out = red(&p, dst);
        // Corners lose the most, interior row/column symmetric
        assert!(out[0] < out[5]);
        assert_relative_eq!(out[0], out[15], epsilon = 1e-6);
        assert_relative_eq!(out[3], out[12], epsilon = 1e-6);
    }
}
