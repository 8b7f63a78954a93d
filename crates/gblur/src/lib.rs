//! # gblur
//!
//! Multi-pass Gaussian blur over GPU surfaces.
//!
//! The engine turns a blur request into a handful of clears and textured
//! rectangle draws recorded through a [`SurfaceProvider`]. Large sigmas are
//! handled by downsampling first, so no single convolution ever needs more
//! than a few dozen taps.
//!
//! # Pipeline
//!
//! ```text
//!  source ──► decimate ──► convolve X ──► convolve Y ──► reexpand ──► output
//!   (1/2^n per axis)      (1D, r ≤ 12)   (1D, r ≤ 12)   (bilinear)
//!
//!  small kernels: source ──► convolve 2D (≤ 25 taps) ──► output
//! ```
//!
//! # Modules
//!
//! - [`sigma`] - Sigma normalization and decimation factors
//! - [`plan`] - Stage sequencing and backing fits
//! - [`convolve`] - Separable 1D passes with content-aware banding
//! - [`convolve_2d`] - Single-pass fast path
//! - [`decimate`] - Power-of-two downsampling
//! - [`reexpand`] - Upsampling to the output size
//!
//! # Example
//!
//! ```rust
//! use gblur::{gaussian_blur, BlurRequest};
//! use gblur_core::{IRect, PixelFormat};
//! use gblur_gpu::{CpuProvider, GpuSurface, SurfaceDesc, SurfaceProvider};
//!
//! let provider = CpuProvider::new();
//! let desc = SurfaceDesc::new(32, 32, PixelFormat::RgbaFloat);
//! let src = provider.upload(&desc, &vec![1.0; 32 * 32 * 4])?;
//!
//! let request = BlurRequest::new(IRect::from_wh(32, 32), 3.0, 3.0);
//! let out = gaussian_blur(&provider, &src, &request).expect("blur");
//! assert_eq!((out.surface.width(), out.surface.height()), (32, 32));
//! # Ok::<(), gblur_gpu::GpuError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod blur;
pub mod convolve;
pub mod convolve_2d;
pub mod decimate;
mod error;
pub mod plan;
pub mod reexpand;
mod request;
pub mod sigma;
mod surface;

#[cfg(test)]
mod testing;

pub use blur::{gaussian_blur, try_gaussian_blur, BlurOutput};
pub use convolve::convolve_gaussian;
pub use convolve_2d::convolve_gaussian_2d;
pub use decimate::decimate;
pub use error::{BlurError, BlurResult};
pub use plan::{BlurPlan, Stage};
pub use reexpand::reexpand;
pub use request::BlurRequest;
pub use sigma::{normalize_sigma, AxisBlur, MAX_BLUR_SIGMA};
