//! Shared fixtures for unit tests.

use gblur_core::PixelFormat;
use gblur_gpu::{CpuProvider, CpuProviderConfig, CpuSurface, CpuTexture, SurfaceDesc, SurfaceProvider};

pub(crate) const FORMAT: PixelFormat = PixelFormat::RgbaFloat;

/// Fill value of fresh backing stores; must never reach an output.
pub(crate) const POISON: f32 = 1000.0;

pub(crate) fn provider() -> CpuProvider {
    CpuProvider::with_config(
        CpuProviderConfig::default()
            .with_max_texture_dim(256)
            .with_memory_budget(64 << 20)
            .with_uninitialized([POISON; 4]),
    )
}

/// `w` x `h` opaque image with the red channel set to `value(x, y)`.
pub(crate) fn image(p: &CpuProvider, w: u32, h: u32, value: impl Fn(u32, u32) -> f32) -> CpuTexture {
    let data: Vec<f32> = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .flat_map(|(x, y)| [value(x, y), 0.0, 0.0, 1.0])
        .collect();
    p.upload(&SurfaceDesc::new(w, h, FORMAT), &data).unwrap()
}

/// Red channel of a finished surface, row-major.
pub(crate) fn red(p: &CpuProvider, s: CpuSurface) -> Vec<f32> {
    let out = p.read_pixels(&p.into_texture(s).unwrap()).unwrap();
    out.chunks(4).map(|px| px[0]).collect()
}
