//! wgpu surface provider.
//!
//! Surfaces are storage buffers of RGBA `f32` sized to the backing store.
//! Clears and draws are compute dispatches; they are submitted in order and
//! only [`read_pixels`](SurfaceProvider::read_pixels) waits for the queue.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use gblur_core::{DomainMode, IRect, PixelFormat};
use tracing::{debug, trace};
use wgpu::util::DeviceExt;

use super::limits::GpuLimits;
use super::memory;
use super::stats::{Allocation, Counters};
use crate::kernel::{gaussian_kernel_1d, gaussian_kernel_2d};
use crate::paint::{Direction, Effect, Filter, LocalMatrix, Paint};
use crate::provider::{GpuSurface, ProviderStats, SurfaceDesc, SurfaceProvider};
use crate::shaders;
use crate::{GpuError, GpuResult};

/// Bytes per texel of a surface buffer.
const TEXEL_BYTES: u64 = 16;

/// Compute workgroup edge, matches `@workgroup_size(16, 16)`.
const WORKGROUP: u32 = 16;

// =============================================================================
// Uniform Buffers
// =============================================================================

/// Clear parameters, see `shaders::CLEAR`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct ClearUniform {
    rect: [i32; 4],
    dims: [u32; 4],
    color: [f32; 4],
}

/// Draw parameters, see `shaders::DRAW`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DrawUniform {
    rect: [i32; 4],
    dst_dims: [u32; 4],
    src_dims: [u32; 4],
    local: [f32; 4],
    domain: [i32; 4],
    modes: [u32; 4],
    radius: [i32; 4],
}

// =============================================================================
// Surfaces
// =============================================================================

/// Writable GPU surface.
pub struct WgpuSurface {
    buffer: wgpu::Buffer,
    desc: SurfaceDesc,
    backing: (u32, u32),
    _alloc: Allocation,
}

/// Read-only GPU texture.
pub struct WgpuTexture {
    buffer: wgpu::Buffer,
    desc: SurfaceDesc,
    backing: (u32, u32),
    _alloc: Allocation,
}

impl GpuSurface for WgpuSurface {
    fn desc(&self) -> &SurfaceDesc {
        &self.desc
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }
}

impl GpuSurface for WgpuTexture {
    fn desc(&self) -> &SurfaceDesc {
        &self.desc
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }
}

// =============================================================================
// Provider
// =============================================================================

struct Pipelines {
    clear: wgpu::ComputePipeline,
    draw: wgpu::ComputePipeline,
}

/// wgpu surface provider.
pub struct WgpuProvider {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipelines: Pipelines,
    limits: GpuLimits,
    counters: Arc<Counters>,
}

impl WgpuProvider {
    /// Check if wgpu is available.
    pub fn is_available() -> bool {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .is_some()
        })
    }

    /// Create a provider on the best adapter.
    pub fn new() -> GpuResult<Self> {
        pollster::block_on(Self::new_async())
    }

    /// Create a provider asynchronously.
    pub async fn new_async() -> GpuResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gblur_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter_limits.clone(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        let info = adapter.get_info();
        let mut limits = GpuLimits::from_wgpu_limits(
            &adapter_limits,
            Some(estimate_vram(&info, adapter_limits.max_buffer_size)),
        );
        limits.max_buffer_bytes = limits
            .max_buffer_bytes
            .min(adapter_limits.max_storage_buffer_binding_size as u64);
        if let Some(dim) = memory::env_max_texture_dim() {
            limits.max_texture_dim = limits.max_texture_dim.min(dim);
        }
        debug!(
            adapter = %info.name,
            max_texture_dim = limits.max_texture_dim,
            vram = %memory::format_bytes(limits.total_memory),
            "wgpu provider ready"
        );

        let pipelines = Self::create_pipelines(&device);

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            pipelines,
            limits,
            counters: Arc::new(Counters::default()),
        })
    }

    fn create_pipelines(device: &wgpu::Device) -> Pipelines {
        let create_pipeline = |source: &str, label: &str| -> wgpu::ComputePipeline {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: None, // Auto layout
                module: &module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        Pipelines {
            clear: create_pipeline(shaders::CLEAR, "clear_pipeline"),
            draw: create_pipeline(shaders::DRAW, "draw_pipeline"),
        }
    }

    fn create_buffer(&self, desc: &SurfaceDesc) -> GpuResult<(wgpu::Buffer, (u32, u32), Allocation)> {
        match self.try_create_buffer(desc) {
            Ok(parts) => Ok(parts),
            Err(e) => {
                self.counters.failed();
                debug!(width = desc.width, height = desc.height, error = %e, "surface allocation refused");
                Err(e)
            }
        }
    }

    fn try_create_buffer(&self, desc: &SurfaceDesc) -> GpuResult<(wgpu::Buffer, (u32, u32), Allocation)> {
        if desc.width == 0 || desc.height == 0 {
            return Err(GpuError::InvalidDimensions(desc.width, desc.height));
        }
        let max = self.limits.max_texture_dim;
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
        let size = backing.0 as u64 * backing.1 as u64 * TEXEL_BYTES;
        let live = self.counters.live_bytes();
        if size > self.limits.max_buffer_bytes
            || live.saturating_add(size) > self.limits.available_memory
        {
            return Err(GpuError::OutOfMemory {
                requested: size,
                available: self.limits.available_memory.saturating_sub(live),
            });
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("surface_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if let Some(e) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::OperationFailed(format!("buffer allocation failed: {e}")));
        }

        trace!(
            width = desc.width,
            height = desc.height,
            backing_w = backing.0,
            backing_h = backing.1,
            "allocate"
        );
        Ok((buffer, backing, self.counters.allocated(size)))
    }

    /// Submit one compute dispatch over `rect`.
    fn dispatch(&self, pipeline: &wgpu::ComputePipeline, bind_group: &wgpu::BindGroup, rect: IRect) {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("compute_encoder"),
        });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("compute_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(
                (rect.width() as u32).div_ceil(WORKGROUP),
                (rect.height() as u32).div_ceil(WORKGROUP),
                1,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl SurfaceProvider for WgpuProvider {
    type Surface = WgpuSurface;
    type Texture = WgpuTexture;

    fn allocate(&self, desc: &SurfaceDesc) -> GpuResult<WgpuSurface> {
        let (buffer, backing, alloc) = self.create_buffer(desc)?;
        Ok(WgpuSurface {
            buffer,
            desc: *desc,
            backing,
            _alloc: alloc,
        })
    }

    fn clear(&self, surface: &mut WgpuSurface, rect: IRect, color: [f32; 4]) -> GpuResult<()> {
        self.counters.cleared();
        let backing = IRect::from_size(surface.backing.0, surface.backing.1);
        let Some(rect) = rect.intersect(&backing) else {
            return Ok(());
        };
        trace!(%rect, "clear");

        let uniform = ClearUniform {
            rect: [rect.left, rect.top, rect.right, rect.bottom],
            dims: [surface.backing.0, 0, 0, 0],
            color: surface.desc.format.quantize(color),
        };
        let params = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("clear_uniform"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let layout = self.pipelines.clear.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("clear_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: surface.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: params.as_entire_binding() },
            ],
        });

        self.dispatch(&self.pipelines.clear, &bind_group, rect);
        Ok(())
    }

    fn draw_rect(
        &self,
        surface: &mut WgpuSurface,
        rect: IRect,
        paint: &Paint<'_, WgpuTexture>,
        local: LocalMatrix,
    ) -> GpuResult<()> {
        self.counters.drew();
        let Some(rect) = rect.intersect(&surface.desc.bounds()) else {
            return Ok(());
        };
        trace!(%rect, effect = paint.effect.name(), ?local, "draw_rect");

        let src = paint.effect.texture();
        let (uniform, weights) = encode_draw(surface, rect, paint, local);
        let params = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("draw_uniform"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let weights = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kernel_buffer"),
            contents: bytemuck::cast_slice(&weights),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let layout = self.pipelines.draw.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: src.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: surface.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: weights.as_entire_binding() },
            ],
        });

        self.dispatch(&self.pipelines.draw, &bind_group, rect);
        Ok(())
    }

    fn into_texture(&self, surface: WgpuSurface) -> GpuResult<WgpuTexture> {
        Ok(WgpuTexture {
            buffer: surface.buffer,
            desc: surface.desc,
            backing: surface.backing,
            _alloc: surface._alloc,
        })
    }

    fn upload(&self, desc: &SurfaceDesc, pixels: &[f32]) -> GpuResult<WgpuTexture> {
        let expected = desc.pixel_len();
        if pixels.len() != expected {
            return Err(GpuError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let (buffer, backing, alloc) = self.create_buffer(desc)?;
        let stride = backing.0 as usize;
        let width = desc.width as usize;
        let mut staged = vec![[0.0f32; 4]; stride * desc.height as usize];
        for (row, src) in staged.chunks_mut(stride).zip(pixels.chunks(width * 4)) {
            for (dst, px) in row[..width].iter_mut().zip(src.chunks_exact(4)) {
                *dst = desc.format.quantize([px[0], px[1], px[2], px[3]]);
            }
        }
        self.queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&staged));

        Ok(WgpuTexture {
            buffer,
            desc: *desc,
            backing,
            _alloc: alloc,
        })
    }

    fn read_pixels(&self, texture: &WgpuTexture) -> GpuResult<Vec<f32>> {
        let stride = texture.backing.0 as u64;
        let size = stride * texture.desc.height as u64 * TEXEL_BYTES;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging_buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&Default::default());
        encoder.copy_buffer_to_buffer(&texture.buffer, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| GpuError::OperationFailed("Map channel closed".into()))?
            .map_err(|e| GpuError::OperationFailed(format!("Map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let texels: &[[f32; 4]] = bytemuck::cast_slice(&data);
        let width = texture.desc.width as usize;
        let result: Vec<f32> = texels
            .chunks(stride as usize)
            .flat_map(|row| row[..width].iter().flatten().copied())
            .collect();
        drop(data);
        staging.unmap();

        Ok(result)
    }

    fn stats(&self) -> ProviderStats {
        self.counters.snapshot()
    }

    fn limits(&self) -> &GpuLimits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "wgpu"
    }
}

/// Packs a draw into the shader uniform and its kernel table.
fn encode_draw(
    surface: &WgpuSurface,
    rect: IRect,
    paint: &Paint<'_, WgpuTexture>,
    local: LocalMatrix,
) -> (DrawUniform, Vec<f32>) {
    let src = paint.effect.texture();
    let mut uniform = DrawUniform {
        rect: [rect.left, rect.top, rect.right, rect.bottom],
        dst_dims: [
            surface.backing.0,
            format_code(surface.desc.format),
            u32::from(paint.gamma_correct),
            0,
        ],
        src_dims: [src.desc.width, src.desc.height, src.backing.0, 0],
        local: [local.sx, local.sy, local.tx, local.ty],
        domain: [0; 4],
        modes: [0; 4],
        radius: [0; 4],
    };

    let weights = match paint.effect {
        Effect::Texture { filter, domain, .. } => {
            uniform.modes[0] = match filter {
                Filter::Nearest => 0,
                Filter::Bilinear => 1,
            };
            if let Some(d) = domain {
                let mode = mode_code(d.mode);
                uniform.domain = [d.rect.left, d.rect.top, d.rect.right, d.rect.bottom];
                uniform.modes[1] = mode;
                uniform.modes[2] = mode;
            }
            // Storage bindings may not be empty.
            vec![1.0]
        }
        Effect::GaussianConvolution { direction, radius, sigma, mode, bounds, .. } => {
            uniform.modes[0] = 2;
            uniform.radius = [radius, 0, 0, 0];
            match direction {
                Direction::X => {
                    uniform.domain = [bounds[0], 0, bounds[1], 0];
                    uniform.modes[1] = mode_code(mode);
                }
                Direction::Y => {
                    uniform.domain = [0, bounds[0], 0, bounds[1]];
                    uniform.modes[2] = mode_code(mode);
                    uniform.radius[2] = 1;
                }
            }
            gaussian_kernel_1d(radius, sigma)
        }
        Effect::MatrixConvolution { radius_x, radius_y, sigma_x, sigma_y, mode, bounds, .. } => {
            let mode = mode_code(mode);
            uniform.modes = [3, mode, mode, 0];
            uniform.radius = [radius_x, radius_y, 0, 0];
            uniform.domain = [bounds.left, bounds.top, bounds.right, bounds.bottom];
            gaussian_kernel_2d(radius_x, radius_y, sigma_x, sigma_y)
        }
    };
    (uniform, weights)
}

/// Shader-side domain mode.
fn mode_code(mode: DomainMode) -> u32 {
    match mode {
        DomainMode::Ignore => 0,
        DomainMode::Clamp => 1,
        DomainMode::Repeat => 2,
        DomainMode::Decal => 3,
    }
}

/// Shader-side quantization selector.
fn format_code(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Rgba8888
        | PixelFormat::Bgra8888
        | PixelFormat::Srgba8888
        | PixelFormat::Sbgra8888 => 0,
        PixelFormat::Rgb888 => 1,
        PixelFormat::Rgba4444 => 2,
        PixelFormat::Rgb565 => 3,
        PixelFormat::Rgba1010102 => 4,
        PixelFormat::Alpha8 => 5,
        PixelFormat::RgbaHalf => 6,
        PixelFormat::Rg88 => 7,
        PixelFormat::R16Float => 8,
        PixelFormat::RgbaFloat => 9,
    }
}

/// Estimate VRAM from adapter info.
fn estimate_vram(info: &wgpu::AdapterInfo, max_buffer_bytes: u64) -> u64 {
    if let Some(bytes) = memory::env_gpu_memory() {
        return bytes;
    }

    let from_buffer = max_buffer_bytes.saturating_mul(2);
    match info.device_type {
        wgpu::DeviceType::DiscreteGpu => from_buffer.clamp(2u64 << 30, 24u64 << 30),
        wgpu::DeviceType::IntegratedGpu => from_buffer.clamp(512u64 << 20, 4u64 << 30),
        wgpu::DeviceType::VirtualGpu => from_buffer.clamp(1u64 << 30, 8u64 << 30),
        _ => from_buffer.clamp(256u64 << 20, 2u64 << 30),
    }
}
