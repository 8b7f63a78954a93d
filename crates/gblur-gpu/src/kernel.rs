//! Gaussian kernel tables.
//!
//! Both convolution effects evaluate a normalized, truncated Gaussian:
//! tap `k` of a radius `r` kernel has weight `exp(-k² / 2σ²)`, divided by the
//! sum over `-r..=r` so a constant image stays constant.
//!
//! # Limits
//!
//! - [`MAX_KERNEL_RADIUS`] - Largest radius the 1D effect accepts (12, i.e.
//!   25 taps, enough for σ = 4 at three standard deviations)
//! - [`MAX_KERNEL_SIZE`] - Tap budget of the single-pass 2D effect
//!
//! # Example
//!
//! ```rust
//! use gblur_gpu::kernel::gaussian_kernel_1d;
//!
//! let k = gaussian_kernel_1d(2, 1.0);
//! assert_eq!(k.len(), 5);
//! assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-6);
//! assert_eq!(k[0], k[4]);
//! ```

/// Largest radius of a 1D Gaussian convolution.
pub const MAX_KERNEL_RADIUS: i32 = 12;

/// Tap budget of the 2D convolution (a 5x5 kernel).
pub const MAX_KERNEL_SIZE: i32 = 25;

/// Normalized 1D Gaussian weights for taps `-radius..=radius`.
///
/// A zero sigma degenerates to a single unit tap at the center.
pub fn gaussian_kernel_1d(radius: i32, sigma: f32) -> Vec<f32> {
    debug_assert!(
        (0..=MAX_KERNEL_RADIUS).contains(&radius),
        "kernel radius {radius} out of range"
    );
    let radius = radius.max(0);
    let width = (2 * radius + 1) as usize;
    if sigma <= 0.0 {
        let mut data = vec![0.0; width];
        data[radius as usize] = 1.0;
        return data;
    }

    let denom = 1.0 / (2.0 * sigma * sigma);
    let mut data: Vec<f32> = (-radius..=radius)
        // Center tap stays finite when sigma is small enough for denom to overflow
        .map(|k| if k == 0 { 1.0 } else { (-((k * k) as f32) * denom).exp() })
        .collect();
    let sum: f32 = data.iter().sum();
    for w in &mut data {
        *w /= sum;
    }
    data
}

/// Normalized 2D Gaussian weights, row-major over
/// `(-radius_y..=radius_y) x (-radius_x..=radius_x)`.
///
/// The kernel is the outer product of the two 1D kernels, so it sums to one
/// like they do.
pub fn gaussian_kernel_2d(radius_x: i32, radius_y: i32, sigma_x: f32, sigma_y: f32) -> Vec<f32> {
    let kx = gaussian_kernel_1d(radius_x, sigma_x);
    let ky = gaussian_kernel_1d(radius_y, sigma_y);
    ky.iter()
        .flat_map(|wy| kx.iter().map(move |wx| wx * wy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_normalized() {
        for radius in 0..=MAX_KERNEL_RADIUS {
            let sigma = radius as f32 / 3.0;
            let k = gaussian_kernel_1d(radius, sigma);
            assert_eq!(k.len(), (2 * radius + 1) as usize);
            assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_kernel_shape() {
        let k = gaussian_kernel_1d(3, 1.0);
        assert!(k[3] > k[2] && k[2] > k[1] && k[1] > k[0]);
        assert_relative_eq!(k[2] / k[3], (-0.5f32).exp(), epsilon = 1e-6);
        for i in 0..3 {
            assert_eq!(k[i], k[6 - i]);
        }
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        assert_eq!(gaussian_kernel_1d(0, 0.0), vec![1.0]);
        assert_eq!(gaussian_kernel_1d(2, 0.0), vec![0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_tiny_sigma_finite() {
        let k = gaussian_kernel_1d(1, 1e-30);
        assert_eq!(k, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_kernel_2d_outer_product() {
        let k = gaussian_kernel_2d(2, 1, 0.6, 0.3);
        assert_eq!(k.len(), 5 * 3);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        let kx = gaussian_kernel_1d(2, 0.6);
        let ky = gaussian_kernel_1d(1, 0.3);
        assert_relative_eq!(k[5 + 2], kx[2] * ky[1]);
        assert!(((2 * 2 + 1) * (2 * 1 + 1)) <= MAX_KERNEL_SIZE);
    }
}
