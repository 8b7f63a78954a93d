//! Device limits.
//!
//! Every provider reports a [`GpuLimits`]. The blur engine only reads
//! `max_texture_dim` (it bounds decimation); providers use the memory fields
//! to refuse allocations they cannot back.
//!
//! # Example
//!
//! ```rust
//! use gblur_gpu::GpuLimits;
//!
//! let limits = GpuLimits::default().with_max_texture_dim(256);
//! assert_eq!(limits.max_texture_dim, 256);
//! assert!(limits.available_memory < limits.total_memory);
//! ```

/// Memory safety margin: use at most 60% of VRAM.
const VRAM_SAFETY_MARGIN: f64 = 0.4;

/// Device memory assumed when it cannot be queried.
pub const DEFAULT_VRAM_BYTES: u64 = 2 * 1024 * 1024 * 1024; // 2 GB
/// Surface dimension limit when the device reports none.
pub const DEFAULT_MAX_TEXTURE_DIM: u32 = 16384;
/// Single buffer limit when the device reports none.
pub const DEFAULT_MAX_BUFFER_BYTES: u64 = 256 * 1024 * 1024; // 256 MB

/// Device resource limits.
#[derive(Debug, Clone)]
pub struct GpuLimits {
    /// Maximum surface dimension (width or height).
    pub max_texture_dim: u32,
    /// Maximum single buffer size in bytes.
    pub max_buffer_bytes: u64,
    /// Total device memory in bytes (detected or estimated).
    pub total_memory: u64,
    /// Memory usable for surfaces (after safety margin).
    pub available_memory: u64,
    /// Whether values were auto-detected vs defaults.
    pub detected: bool,
}

impl Default for GpuLimits {
    fn default() -> Self {
        Self {
            max_texture_dim: DEFAULT_MAX_TEXTURE_DIM,
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
            total_memory: DEFAULT_VRAM_BYTES,
            available_memory: (DEFAULT_VRAM_BYTES as f64 * (1.0 - VRAM_SAFETY_MARGIN)) as u64,
            detected: false,
        }
    }
}

impl GpuLimits {
    /// Overrides the maximum surface dimension.
    pub fn with_max_texture_dim(mut self, dim: u32) -> Self {
        self.max_texture_dim = dim.max(1);
        self
    }

    /// Creates limits from wgpu adapter limits.
    #[cfg(feature = "wgpu")]
    pub fn from_wgpu_limits(limits: &wgpu::Limits, total_vram: Option<u64>) -> Self {
        let total = total_vram.unwrap_or(DEFAULT_VRAM_BYTES);
        let available = (total as f64 * (1.0 - VRAM_SAFETY_MARGIN)) as u64;

        Self {
            max_texture_dim: limits.max_texture_dimension_2d,
            max_buffer_bytes: limits.max_buffer_size,
            total_memory: total,
            available_memory: available,
            detected: true,
        }
    }
}
