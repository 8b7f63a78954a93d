//! Sigma normalization.
//!
//! The convolution effects only handle kernels up to
//! [`MAX_KERNEL_RADIUS`](gblur_gpu::MAX_KERNEL_RADIUS). Larger blurs are
//! approximated by downsampling: every halving of the image halves the sigma
//! that remains to be applied.
//!
//! ```text
//! sigma 20 ──► 10 (x2) ──► 5 (x4) ──► 2.5 (x8), radius ceil(7.5) = 8
//! ```

use gblur_gpu::MAX_KERNEL_RADIUS;

/// Largest sigma convolved directly.
pub const MAX_BLUR_SIGMA: f32 = 4.0;

/// Blur parameters of one axis after normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBlur {
    /// Sigma applied at the decimated resolution.
    pub sigma: f32,
    /// Power-of-two downsampling factor.
    pub scale_factor: i32,
    /// Kernel radius, `ceil(3 * sigma)`.
    pub radius: i32,
}

impl AxisBlur {
    /// No blur along this axis.
    pub const NONE: AxisBlur = AxisBlur {
        sigma: 0.0,
        scale_factor: 1,
        radius: 0,
    };

    /// Whether the axis gets a convolution pass.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.sigma > 0.0
    }

    /// Whether the axis is downsampled first.
    #[inline]
    pub fn is_decimated(&self) -> bool {
        self.scale_factor > 1
    }

    /// Taps of the 1D kernel.
    #[inline]
    pub fn kernel_width(&self) -> i32 {
        2 * self.radius + 1
    }
}

/// Reduces `sigma` to at most [`MAX_BLUR_SIGMA`] by downsampling.
///
/// The scale factor never exceeds the largest power of two that fits in
/// `max_texture_size`; once it would, the remaining sigma is clamped to
/// [`MAX_BLUR_SIGMA`] instead. Negative and NaN sigmas mean no blur.
///
/// ```rust
/// use gblur::normalize_sigma;
///
/// let axis = normalize_sigma(20.0, 16384);
/// assert_eq!(axis.scale_factor, 8);
/// assert_eq!(axis.sigma, 2.5);
/// assert_eq!(axis.radius, 8);
///
/// // Capped by a tiny device
/// let axis = normalize_sigma(1000.0, 16);
/// assert_eq!((axis.scale_factor, axis.sigma, axis.radius), (16, 4.0, 12));
/// ```
pub fn normalize_sigma(sigma: f32, max_texture_size: u32) -> AxisBlur {
    if sigma.is_nan() || sigma <= 0.0 {
        return AxisBlur::NONE;
    }

    let cap = scale_cap(max_texture_size);
    let mut sigma = sigma;
    let mut scale_factor = 1i32;
    while sigma > MAX_BLUR_SIGMA {
        scale_factor = scale_factor.saturating_mul(2);
        sigma *= 0.5;
        if scale_factor > cap {
            scale_factor = cap;
            sigma = MAX_BLUR_SIGMA;
        }
    }

    let radius = (sigma * 3.0).ceil() as i32;
    debug_assert!(radius <= MAX_KERNEL_RADIUS, "radius {radius} exceeds kernel limit");
    AxisBlur {
        sigma,
        scale_factor,
        radius,
    }
}

/// Largest power of two not above the device limit.
fn scale_cap(max_texture_size: u32) -> i32 {
    let max = max_texture_size.clamp(1, 1 << 30);
    1 << (31 - max.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_sigma_untouched() {
        let axis = normalize_sigma(1.0, 16384);
        assert_eq!(axis, AxisBlur { sigma: 1.0, scale_factor: 1, radius: 3 });
        assert!(axis.is_active());
        assert!(!axis.is_decimated());
    }

    #[test]
    fn test_zero_and_invalid() {
        assert_eq!(normalize_sigma(0.0, 16384), AxisBlur::NONE);
        assert_eq!(normalize_sigma(-2.0, 16384), AxisBlur::NONE);
        assert_eq!(normalize_sigma(f32::NAN, 16384), AxisBlur::NONE);
        assert_eq!(AxisBlur::NONE.kernel_width(), 1);
    }

    #[test]
    fn test_infinite_sigma_capped() {
        let axis = normalize_sigma(f32::INFINITY, 256);
        assert_eq!((axis.scale_factor, axis.sigma, axis.radius), (256, 4.0, 12));
    }

    #[test]
    fn test_scale_cap() {
        assert_eq!(scale_cap(16), 16);
        assert_eq!(scale_cap(300), 256);
        assert_eq!(scale_cap(1), 1);
        assert_eq!(scale_cap(0), 1);
        assert_eq!(scale_cap(u32::MAX), 1 << 30);
    }

    #[test]
    fn test_non_pow2_device() {
        let axis = normalize_sigma(10_000.0, 100);
        assert_eq!(axis.scale_factor, 64);
        assert_eq!(axis.sigma, MAX_BLUR_SIGMA);
    }

    proptest! {
        #[test]
        fn prop_small_sigma_scale_one(sigma in 0.001f32..=4.0) {
            let axis = normalize_sigma(sigma, 16384);
            prop_assert_eq!(axis.scale_factor, 1);
            prop_assert_eq!(axis.sigma, sigma);
            prop_assert_eq!(axis.radius, (sigma * 3.0).ceil() as i32);
        }

        #[test]
        fn prop_large_sigma_bounded(sigma in 4.001f32..100_000.0, max in 1u32..=16384) {
            let axis = normalize_sigma(sigma, max);
            prop_assert!(axis.scale_factor.count_ones() == 1);
            prop_assert!(axis.scale_factor as u32 <= max);
            prop_assert!(axis.sigma <= MAX_BLUR_SIGMA);
            prop_assert!(axis.radius <= MAX_KERNEL_RADIUS);
            if axis.sigma == MAX_BLUR_SIGMA && axis.scale_factor as f32 * MAX_BLUR_SIGMA < sigma {
                prop_assert_eq!(axis.radius, 12);
            } else {
                // Not capped: the scale factor accounts for the whole sigma.
                prop_assert!((axis.sigma * axis.scale_factor as f32 - sigma).abs() <= sigma * 1e-6);
            }
        }

        #[test]
        fn prop_capped_by_tiny_device(sigma in 64.001f32..10_000.0) {
            let axis = normalize_sigma(sigma, 16);
            prop_assert_eq!(axis.scale_factor, 16);
            prop_assert_eq!(axis.sigma, MAX_BLUR_SIGMA);
            prop_assert_eq!(axis.radius, 12);
        }
    }
}
