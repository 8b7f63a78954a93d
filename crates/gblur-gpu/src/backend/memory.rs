//! Host memory detection and environment overrides.
//!
//! # Environment Variables
//!
//! - `GBLUR_MEMORY_MB` - Memory budget for software surfaces in megabytes
//! - `GBLUR_MAX_TEXTURE_DIM` - Maximum surface dimension reported by providers
//! - `GBLUR_GPU_MEMORY_MB` - VRAM assumed by the wgpu provider

use std::env;
use std::sync::OnceLock;

/// Default safety margin - use at most 80% of available memory.
pub const SAFE_MEMORY_FRACTION: f64 = 0.80;

/// Cache for system memory detection.
static AVAILABLE_MEMORY: OnceLock<u64> = OnceLock::new();

/// Available system RAM in bytes, with the safety margin applied.
pub fn available_memory() -> u64 {
    *AVAILABLE_MEMORY.get_or_init(|| {
        let avail = sys_info::mem_info()
            .map(|m| m.avail * 1024) // KB to bytes
            .unwrap_or(4 * 1024 * 1024 * 1024); // 4 GB fallback
        (avail as f64 * SAFE_MEMORY_FRACTION) as u64
    })
}

/// `GBLUR_MEMORY_MB` in bytes, if set.
pub fn env_memory_budget() -> Option<u64> {
    env_u64("GBLUR_MEMORY_MB").map(|mb| mb.saturating_mul(1024 * 1024))
}

/// `GBLUR_MAX_TEXTURE_DIM`, if set to a usable value.
pub fn env_max_texture_dim() -> Option<u32> {
    env_u64("GBLUR_MAX_TEXTURE_DIM")
        .filter(|&d| (1..=u32::MAX as u64).contains(&d))
        .map(|d| d as u32)
}

/// `GBLUR_GPU_MEMORY_MB` in bytes, if set.
pub fn env_gpu_memory() -> Option<u64> {
    env_u64("GBLUR_GPU_MEMORY_MB").map(|mb| mb.saturating_mul(1024 * 1024))
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
