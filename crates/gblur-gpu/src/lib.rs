//! Surface providers for the blur engine.
//!
//! The engine never talks to a device directly. It records clears and
//! textured-rectangle draws through the [`SurfaceProvider`] trait, which a
//! software rasterizer and a wgpu compute backend both implement.
//!
//! # Architecture
//!
//! ```text
//! gblur (engine)
//!     └── SurfaceProvider trait
//!             ├── CpuProvider  (rayon)
//!             └── WgpuProvider (compute shaders, feature "wgpu")
//! ```
//!
//! A draw is described by a [`Paint`]: one [`Effect`] that produces a color
//! per pixel from a source texture, plus whether sRGB texels are filtered in
//! linear light. Draws replace what they cover. Effects cover what
//! the engine needs and nothing more: plain (optionally domain-bounded)
//! texture sampling, a 1D Gaussian convolution and a small 2D Gaussian
//! convolution.
//!
//! # Example
//!
//! ```rust
//! use gblur_core::{IRect, PixelFormat};
//! use gblur_gpu::{CpuProvider, LocalMatrix, Paint, SurfaceDesc, SurfaceProvider};
//!
//! let provider = CpuProvider::new();
//! let desc = SurfaceDesc::new(4, 4, PixelFormat::RgbaFloat);
//! let src = provider.upload(&desc, &vec![0.5; 4 * 4 * 4])?;
//!
//! let mut dst = provider.allocate(&desc)?;
//! provider.draw_rect(&mut dst, IRect::from_wh(4, 4), &Paint::texture(&src), LocalMatrix::IDENTITY)?;
//! let out = provider.read_pixels(&provider.into_texture(dst)?)?;
//! assert_eq!(out, vec![0.5; 4 * 4 * 4]);
//! # Ok::<(), gblur_gpu::GpuError>(())
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod kernel;
pub mod paint;
pub mod provider;
#[cfg(feature = "wgpu")]
mod shaders;

pub use backend::{CpuProvider, CpuProviderConfig, CpuSurface, CpuTexture, GpuLimits};
#[cfg(feature = "wgpu")]
pub use backend::{WgpuProvider, WgpuSurface, WgpuTexture};
pub use kernel::{gaussian_kernel_1d, gaussian_kernel_2d, MAX_KERNEL_RADIUS, MAX_KERNEL_SIZE};
pub use paint::{Direction, Effect, Filter, LocalMatrix, Paint, TextureDomain};
pub use provider::{GpuSurface, ProviderStats, SurfaceDesc, SurfaceProvider};

use thiserror::Error;

/// Surface provider errors.
#[derive(Error, Debug)]
pub enum GpuError {
    /// No adapter matched the requested power preference.
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    /// The adapter refused to open a device.
    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    /// A dimension exceeds the provider's maximum surface size.
    #[error("Surface too large: {width}x{height} exceeds device limit {limit}")]
    ImageTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Largest accepted dimension.
        limit: u32,
    },

    /// Width or height is zero.
    #[error("Invalid dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),

    /// The allocation would exceed the memory budget.
    #[error("Out of memory: {requested} bytes requested, {available} available")]
    OutOfMemory {
        /// Bytes the allocation needs.
        requested: u64,
        /// Bytes left in the budget.
        available: u64,
    },

    /// Uploaded data does not match the surface size.
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Floats the surface holds.
        expected: usize,
        /// Floats supplied.
        actual: usize,
    },

    /// A device call failed after the provider was created.
    #[error("GPU operation failed: {0}")]
    OperationFailed(String),
}

/// Result type of provider operations.
pub type GpuResult<T> = Result<T, GpuError>;
