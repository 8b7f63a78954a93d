//! Software surface provider using rayon for parallelization.
//!
//! Surfaces are RGBA `f32` buffers sized to their backing store. Every write
//! is rounded to the precision of the surface's [`PixelFormat`], so results
//! match what an 8-bit or half-float device target would hold.
//!
//! Freshly allocated backing stores are filled with
//! [`CpuProviderConfig::uninitialized`]; tests poison it to prove that no
//! stage reads pixels it did not write or clear.

use std::sync::Arc;

use gblur_core::{encode_srgb, IRect};
use rayon::prelude::*;
use tracing::{debug, trace};

use super::limits::{GpuLimits, DEFAULT_MAX_TEXTURE_DIM};
use super::memory;
use super::raster::{Program, Texels};
use super::stats::{Allocation, Counters};
use crate::paint::{LocalMatrix, Paint};
use crate::provider::{GpuSurface, ProviderStats, SurfaceDesc, SurfaceProvider};
use crate::{GpuError, GpuResult};

/// Configuration of the software provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuProviderConfig {
    /// Largest surface dimension accepted.
    pub max_texture_dim: u32,
    /// Bytes of live surfaces allowed at once.
    pub memory_budget: u64,
    /// Fill value of newly allocated backing stores.
    pub uninitialized: [f32; 4],
}

impl Default for CpuProviderConfig {
    fn default() -> Self {
        Self {
            max_texture_dim: DEFAULT_MAX_TEXTURE_DIM,
            memory_budget: memory::available_memory(),
            uninitialized: [0.0; 4],
        }
    }
}

impl CpuProviderConfig {
    /// Defaults with `GBLUR_MAX_TEXTURE_DIM` and `GBLUR_MEMORY_MB` applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dim) = memory::env_max_texture_dim() {
            config.max_texture_dim = dim;
        }
        if let Some(budget) = memory::env_memory_budget() {
            config.memory_budget = budget;
        }
        config
    }

    /// Sets the maximum surface dimension.
    pub fn with_max_texture_dim(mut self, dim: u32) -> Self {
        self.max_texture_dim = dim.max(1);
        self
    }

    /// Sets the memory budget in bytes.
    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget = bytes;
        self
    }

    /// Sets the fill value of new backing stores.
    pub fn with_uninitialized(mut self, value: [f32; 4]) -> Self {
        self.uninitialized = value;
        self
    }
}

/// Backing store shared by surfaces and textures.
#[derive(Debug)]
struct Store {
    desc: SurfaceDesc,
    backing: (u32, u32),
    pixels: Vec<[f32; 4]>,
    _alloc: Allocation,
}

impl Store {
    #[inline]
    fn stride(&self) -> usize {
        self.backing.0 as usize
    }
}

/// Writable software surface.
#[derive(Debug)]
pub struct CpuSurface {
    store: Store,
}

/// Read-only software texture.
#[derive(Debug)]
pub struct CpuTexture {
    store: Store,
}

impl CpuTexture {
    /// Texel at (x, y) of the backing store, including padding.
    pub fn backing_texel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        let (bw, bh) = self.store.backing;
        (x < bw && y < bh).then(|| self.store.pixels[y as usize * bw as usize + x as usize])
    }
}

impl GpuSurface for CpuSurface {
    fn desc(&self) -> &SurfaceDesc {
        &self.store.desc
    }

    fn backing_size(&self) -> (u32, u32) {
        self.store.backing
    }
}

impl GpuSurface for CpuTexture {
    fn desc(&self) -> &SurfaceDesc {
        &self.store.desc
    }

    fn backing_size(&self) -> (u32, u32) {
        self.store.backing
    }
}

impl Texels for CpuTexture {
    #[inline]
    fn texel(&self, x: i32, y: i32) -> [f32; 4] {
        let desc = &self.store.desc;
        let x = x.clamp(0, desc.width as i32 - 1) as usize;
        let y = y.clamp(0, desc.height as i32 - 1) as usize;
        self.store.pixels[y * self.store.stride() + x]
    }
}

/// Software surface provider.
pub struct CpuProvider {
    config: CpuProviderConfig,
    limits: GpuLimits,
    counters: Arc<Counters>,
}

impl CpuProvider {
    /// Provider configured from the environment.
    pub fn new() -> Self {
        Self::with_config(CpuProviderConfig::from_env())
    }

    /// Provider with an explicit configuration.
    pub fn with_config(config: CpuProviderConfig) -> Self {
        let limits = GpuLimits {
            max_texture_dim: config.max_texture_dim,
            max_buffer_bytes: u64::MAX,
            total_memory: config.memory_budget,
            available_memory: config.memory_budget,
            detected: true,
        };
        Self {
            config,
            limits,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CpuProviderConfig {
        &self.config
    }

    fn make_store(&self, desc: &SurfaceDesc) -> GpuResult<Store> {
        match self.try_make_store(desc) {
            Ok(store) => Ok(store),
            Err(e) => {
                self.counters.failed();
                debug!(width = desc.width, height = desc.height, error = %e, "surface allocation refused");
                Err(e)
            }
        }
    }

    fn try_make_store(&self, desc: &SurfaceDesc) -> GpuResult<Store> {
        if desc.width == 0 || desc.height == 0 {
            return Err(GpuError::InvalidDimensions(desc.width, desc.height));
        }
        let max = self.config.max_texture_dim;
        if desc.width > max || desc.height > max {
            return Err(GpuError::ImageTooLarge {
                width: desc.width,
                height: desc.height,
                limit: max,
            });
        }

        let backing = (
            desc.fit.backing_dim(desc.width, max),
            desc.fit.backing_dim(desc.height, max),
        );
        let bytes = backing.0 as u64 * backing.1 as u64 * desc.format.bytes_per_pixel() as u64;
        let live = self.counters.live_bytes();
        if live.saturating_add(bytes) > self.config.memory_budget {
            return Err(GpuError::OutOfMemory {
                requested: bytes,
                available: self.config.memory_budget.saturating_sub(live),
            });
        }

        trace!(
            width = desc.width,
            height = desc.height,
            backing_w = backing.0,
            backing_h = backing.1,
            format = %desc.format,
            "allocate"
        );

        Ok(Store {
            desc: *desc,
            backing,
            pixels: vec![self.config.uninitialized; backing.0 as usize * backing.1 as usize],
            _alloc: self.counters.allocated(bytes),
        })
    }
}

impl Default for CpuProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceProvider for CpuProvider {
    type Surface = CpuSurface;
    type Texture = CpuTexture;

    fn allocate(&self, desc: &SurfaceDesc) -> GpuResult<CpuSurface> {
        Ok(CpuSurface {
            store: self.make_store(desc)?,
        })
    }

    fn clear(&self, surface: &mut CpuSurface, rect: IRect, color: [f32; 4]) -> GpuResult<()> {
        self.counters.cleared();
        let store = &mut surface.store;
        let backing = IRect::from_size(store.backing.0, store.backing.1);
        let Some(rect) = rect.intersect(&backing) else {
            return Ok(());
        };
        trace!(%rect, "clear");

        let value = store.desc.format.quantize(color);
        let stride = store.stride();
        let (l, r) = (rect.left as usize, rect.right as usize);
        store
            .pixels
            .par_chunks_mut(stride)
            .skip(rect.top as usize)
            .take(rect.height() as usize)
            .for_each(|row| row[l..r].fill(value));
        Ok(())
    }

    fn draw_rect(
        &self,
        surface: &mut CpuSurface,
        rect: IRect,
        paint: &Paint<'_, CpuTexture>,
        local: LocalMatrix,
    ) -> GpuResult<()> {
        self.counters.drew();
        let store = &mut surface.store;
        let Some(rect) = rect.intersect(&store.desc.bounds()) else {
            return Ok(());
        };
        trace!(%rect, effect = paint.effect.name(), ?local, "draw_rect");

        let program = Program::compile(paint);
        let format = store.desc.format;
        let encode = paint.gamma_correct;
        let stride = store.stride();
        store
            .pixels
            .par_chunks_mut(stride)
            .enumerate()
            .skip(rect.top as usize)
            .take(rect.height() as usize)
            .for_each(|(y, row)| {
                let cy = y as f32 + 0.5;
                for x in rect.left..rect.right {
                    let (u, v) = local.map(x as f32 + 0.5, cy);
                    let color = program.shade(u, v);
                    row[x as usize] = format.quantize(if encode { encode_srgb(color) } else { color });
                }
            });
        Ok(())
    }

    fn into_texture(&self, surface: CpuSurface) -> GpuResult<CpuTexture> {
        Ok(CpuTexture {
            store: surface.store,
        })
    }

    fn upload(&self, desc: &SurfaceDesc, pixels: &[f32]) -> GpuResult<CpuTexture> {
        let expected = desc.pixel_len();
        if pixels.len() != expected {
            return Err(GpuError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let mut store = self.make_store(desc)?;
        let stride = store.stride();
        let width = desc.width as usize;
        let format = desc.format;
        store
            .pixels
            .par_chunks_mut(stride)
            .zip(pixels.par_chunks(width * 4))
            .for_each(|(row, src)| {
                for (dst, px) in row[..width].iter_mut().zip(src.chunks_exact(4)) {
                    *dst = format.quantize([px[0], px[1], px[2], px[3]]);
                }
            });
        Ok(CpuTexture { store })
    }

    fn read_pixels(&self, texture: &CpuTexture) -> GpuResult<Vec<f32>> {
        let store = &texture.store;
        let width = store.desc.width as usize;
        Ok(store
            .pixels
            .chunks(store.stride())
            .take(store.desc.height as usize)
            .flat_map(|row| row[..width].iter().flatten().copied())
            .collect())
    }

    fn stats(&self) -> ProviderStats {
        self.counters.snapshot()
    }

    fn limits(&self) -> &GpuLimits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "CPU"
    }
}
