//! Surface provider backends.
//!
//! Provides a CPU (rayon) rasterizer and a wgpu compute backend.
//!
//! # Architecture
//!
//! ```text
//! SurfaceProvider
//!     +-- CpuProvider  (rayon parallelization)
//!     +-- WgpuProvider (Vulkan/Metal/DX12)
//! ```

mod cpu_backend;
mod limits;
pub mod memory;
mod raster;
mod stats;

#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use cpu_backend::{CpuProvider, CpuProviderConfig, CpuSurface, CpuTexture};
pub use limits::{GpuLimits, DEFAULT_MAX_TEXTURE_DIM};

#[cfg(feature = "wgpu")]
pub use wgpu_backend::{WgpuProvider, WgpuSurface, WgpuTexture};
