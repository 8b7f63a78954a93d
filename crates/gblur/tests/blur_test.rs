//! End-to-end blurs on the software provider.

use approx::assert_relative_eq;
use gblur::{gaussian_blur, try_gaussian_blur, BlurError, BlurRequest, Stage};
use gblur_core::{BackingFit, ColorSpace, DomainMode, IRect, PixelFormat};
use gblur_gpu::{CpuProvider, CpuProviderConfig, CpuSurface, CpuTexture, GpuSurface, SurfaceDesc, SurfaceProvider};
use proptest::prelude::*;

/// Fresh backing stores are filled with this so stray reads show up.
const POISON: f32 = 1000.0;

fn provider() -> CpuProvider {
    CpuProvider::with_config(
        CpuProviderConfig::default()
            .with_max_texture_dim(256)
            .with_memory_budget(64 << 20)
            .with_uninitialized([POISON; 4]),
    )
}

fn image(p: &CpuProvider, w: u32, h: u32, value: impl Fn(u32, u32) -> f32) -> CpuTexture {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = value(x, y);
            data.extend_from_slice(&[v, v, v, 1.0]);
        }
    }
    p.upload(&SurfaceDesc::new(w, h, PixelFormat::RgbaFloat), &data).unwrap()
}

/// Red channel, row-major.
fn red(p: &CpuProvider, s: CpuSurface) -> Vec<f32> {
    let tex = p.into_texture(s).unwrap();
    p.read_pixels(&tex).unwrap().chunks(4).map(|px| px[0]).collect()
}

#[test]
fn test_uniform_stays_uniform() {
    let p = provider();
    let src = image(&p, 10, 10, |_, _| 1.0);
    let request = BlurRequest::new(IRect::from_wh(10, 10), 1.0, 1.0);
    let out = gaussian_blur(&p, &src, &request).unwrap();

    // radius 3 per axis is 49 taps, too many for one pass
    assert_eq!(out.plan.stages(), vec![Stage::ConvolveX, Stage::ConvolveY]);
    assert_eq!((out.info.width, out.info.height), (10, 10));
    for v in red(&p, out.surface) {
        assert_relative_eq!(v, 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_impulse_symmetric_and_conserved() {
    let p = provider();
    let src = image(&p, 33, 33, |x, y| if x == 16 && y == 16 { 1.0 } else { 0.0 });
    let request = BlurRequest::new(IRect::from_wh(33, 33), 2.0, 2.0);
    let out = red(&p, gaussian_blur(&p, &src, &request).unwrap().surface);

    let at = |x: usize, y: usize| out[y * 33 + x];
    let peak = out.iter().cloned().fold(f32::MIN, f32::max);
    assert_eq!(at(16, 16), peak);
    assert_relative_eq!(at(15, 16), at(17, 16), epsilon = 1e-6);
    assert_relative_eq!(at(16, 15), at(16, 17), epsilon = 1e-6);
    assert_relative_eq!(at(15, 16), at(16, 15), epsilon = 1e-6);
    assert_relative_eq!(at(12, 12), at(20, 20), epsilon = 1e-6);

    let energy: f32 = out.iter().sum();
    assert_relative_eq!(energy, 1.0, epsilon = 1e-4);
}

#[test]
fn test_large_sigma_decimates() {
    let p = provider();
    let src = image(&p, 37, 10, |_, _| 0.5);
    let request = BlurRequest::new(IRect::from_wh(37, 10), 20.0, 0.0);
    let out = gaussian_blur(&p, &src, &request).unwrap();

    assert_eq!(out.plan.x.scale_factor, 8);
    assert_eq!(out.plan.stages(), vec![Stage::Decimate, Stage::ConvolveX, Stage::Reexpand]);
    assert_eq!((out.surface.width(), out.surface.height()), (37, 10));
    let (bw, bh) = out.surface.backing_size();
    assert_eq!((bw, bh), (37, 10), "caller asked for an exact fit");
    for v in red(&p, out.surface) {
        assert_relative_eq!(v, 0.5, epsilon = 1e-5);
    }
}

#[test]
fn test_x_only_leaves_rows_alone() {
    let p = provider();
    let src = image(&p, 16, 8, |_, y| y as f32 / 8.0);
    let request = BlurRequest::new(IRect::from_wh(16, 8), 1.0, 0.0);
    let out = red(&p, gaussian_blur(&p, &src, &request).unwrap().surface);
    for (i, v) in out.iter().enumerate() {
        assert_relative_eq!(*v, (i / 16) as f32 / 8.0, epsilon = 1e-5);
    }
}

#[test]
fn test_clamp_never_reads_outside_content() {
    let p = provider();
    let content = IRect::from_ltrb(5, 5, 15, 15);
    let src = image(&p, 20, 20, |x, y| if content.contains(x as i32, y as i32) { 1.0 } else { 50.0 });
    let request = BlurRequest::new(IRect::from_wh(20, 20), 1.5, 1.5)
        .with_src_bounds(content)
        .with_mode(DomainMode::Clamp);
    for v in red(&p, gaussian_blur(&p, &src, &request).unwrap().surface) {
        assert_relative_eq!(v, 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_clamp_decimated_never_reads_outside_content() {
    let p = provider();
    let content = IRect::from_ltrb(8, 8, 56, 56);
    let src = image(&p, 64, 64, |x, y| if content.contains(x as i32, y as i32) { 1.0 } else { 50.0 });
    let request = BlurRequest::new(IRect::from_wh(64, 64), 12.0, 12.0)
        .with_src_bounds(content)
        .with_mode(DomainMode::Clamp);
    let out = gaussian_blur(&p, &src, &request).unwrap();
    assert!(out.plan.is_decimated());
    for v in red(&p, out.surface) {
        assert_relative_eq!(v, 1.0, epsilon = 1e-4);
    }
}

#[test]
fn test_decal_fades_without_garbage() {
    let p = provider();
    let src = image(&p, 40, 40, |_, _| 1.0);
    let request = BlurRequest::new(IRect::from_wh(40, 40), 10.0, 10.0).with_mode(DomainMode::Decal);
    let out = gaussian_blur(&p, &src, &request).unwrap();
    assert_eq!(out.plan.x.scale_factor, 4);

    let out = red(&p, out.surface);
    for v in &out {
        assert!(v.is_finite() && (0.0..=1.0 + 1e-4).contains(v), "bad value {v}");
    }
    assert!(out[20 * 40 + 20] > 0.8);
    assert!(out[0] < 0.5);
    assert_relative_eq!(out[0], out[39], epsilon = 1e-4);
    assert_relative_eq!(out[0], out[39 * 40], epsilon = 1e-4);
}

#[test]
fn test_destination_offset() {
    let p = provider();
    let src = image(&p, 48, 48, |x, _| if x >= 24 { 1.0 } else { 0.0 });
    // Window straddling the step edge
    let request = BlurRequest::new(IRect::from_ltrb(16, 8, 32, 24), 2.0, 2.0);
    let out = red(&p, gaussian_blur(&p, &src, &request).unwrap().surface);
    assert_eq!(out.len(), 16 * 16);
    for row in out.chunks(16) {
        // Column 8 of the window is source column 24
        assert!(row[0] < 0.01);
        assert!(row[15] > 0.99);
        assert_relative_eq!(row[7] + row[8], 1.0, epsilon = 1e-4);
    }
}

#[test]
fn test_fast_path_single_draw() {
    let p = provider();
    let src = image(&p, 8, 8, |x, y| ((x + y) % 2) as f32);
    let before = p.stats();
    let request = BlurRequest::new(IRect::from_wh(8, 8), 0.5, 0.5);
    let out = gaussian_blur(&p, &src, &request).unwrap();
    let after = p.stats();
    assert_eq!(out.plan.stages(), vec![Stage::FastPath]);
    assert_eq!(after.draws - before.draws, 1);
    assert_eq!(after.allocations - before.allocations, 1);
}

#[test]
fn test_intermediates_released() {
    let p = provider();
    let src = image(&p, 64, 32, |x, _| x as f32 / 64.0);
    let baseline = p.stats().live_surfaces;
    let request = BlurRequest::new(IRect::from_wh(64, 32), 9.0, 6.0).with_mode(DomainMode::Clamp);
    let out = gaussian_blur(&p, &src, &request).unwrap();
    assert_eq!(p.stats().live_surfaces, baseline + 1);
    drop(out);
    assert_eq!(p.stats().live_surfaces, baseline);
}

#[test]
fn test_oversized_destination_fails_cleanly() {
    let p = provider();
    let src = image(&p, 16, 16, |_, _| 1.0);
    let baseline = p.stats();
    let request = BlurRequest::new(IRect::from_wh(300, 300), 1.0, 1.0);

    assert!(matches!(try_gaussian_blur(&p, &src, &request), Err(BlurError::Allocation(_))));
    assert!(gaussian_blur(&p, &src, &request).is_none());

    let after = p.stats();
    assert_eq!(after.live_surfaces, baseline.live_surfaces);
    assert_eq!(after.live_bytes, baseline.live_bytes);
    assert!(after.failed_allocations > baseline.failed_allocations);
}

#[test]
fn test_memory_exhaustion_fails_cleanly() {
    // Room for the source and the X pass, not the output too
    let p = CpuProvider::with_config(
        CpuProviderConfig::default()
            .with_max_texture_dim(256)
            .with_memory_budget(5 * 32 * 32 * 16 / 2),
    );
    let src = image(&p, 32, 32, |_, _| 1.0);
    let request = BlurRequest::new(IRect::from_wh(32, 32), 1.0, 1.0);
    assert!(gaussian_blur(&p, &src, &request).is_none());
    assert_eq!(p.stats().live_surfaces, 1);
}

#[test]
fn test_invalid_requests() {
    let p = provider();
    let src = image(&p, 4, 4, |_, _| 1.0);

    let none = BlurRequest::new(IRect::from_wh(4, 4), 0.0, -1.0);
    assert!(matches!(try_gaussian_blur(&p, &src, &none), Err(BlurError::NoBlur)));

    let nan = BlurRequest::new(IRect::from_wh(4, 4), f32::NAN, 0.0);
    assert!(gaussian_blur(&p, &src, &nan).is_none());

    let empty = BlurRequest::new(IRect::from_ltrb(2, 2, 2, 4), 1.0, 1.0);
    assert!(matches!(try_gaussian_blur(&p, &src, &empty), Err(BlurError::Allocation(_))));

    let rg = p.upload(&SurfaceDesc::new(2, 2, PixelFormat::Rg88), &[0.0; 16]).unwrap();
    let request = BlurRequest::new(IRect::from_wh(2, 2), 1.0, 1.0);
    assert!(matches!(
        try_gaussian_blur(&p, &rg, &request),
        Err(BlurError::UnsupportedFormat(PixelFormat::Rg88))
    ));
}

#[test]
fn test_srgb_target_blurs_in_linear_light() {
    let p = provider();
    let stripes: Vec<f32> = (0..8)
        .flat_map(|_| 0..64)
        .flat_map(|x| {
            let v = (x % 2) as f32;
            [v, v, v, 1.0]
        })
        .collect();
    let src = p.upload(&SurfaceDesc::new(64, 8, PixelFormat::Srgba8888), &stripes).unwrap();
    let request = BlurRequest::new(IRect::from_wh(64, 8), 3.0, 0.0);

    // Tagged: half linear intensity, encoded back to sRGB
    let tagged = request.with_color_space(Some(ColorSpace::Srgb));
    let out = try_gaussian_blur(&p, &src, &tagged).unwrap();
    assert_eq!(out.surface.desc().format, PixelFormat::Srgba8888);
    let row = red(&p, out.surface);
    assert_relative_eq!(row[4 * 64 + 32], 0.7353566, epsilon = 2.0 / 255.0);

    // Untagged: stored values are averaged directly
    let out = try_gaussian_blur(&p, &src, &request).unwrap();
    assert_eq!(out.surface.desc().format, PixelFormat::Rgba8888);
    let row = red(&p, out.surface);
    assert_relative_eq!(row[4 * 64 + 32], 128.0 / 255.0, epsilon = 1.5 / 255.0);
}

#[test]
fn test_approx_fit_output() {
    let p = provider();
    let src = image(&p, 20, 20, |_, _| 1.0);
    let request = BlurRequest::new(IRect::from_wh(20, 20), 1.0, 1.0).with_fit(BackingFit::Approx);
    let out = gaussian_blur(&p, &src, &request).unwrap();
    assert_eq!((out.surface.width(), out.surface.height()), (20, 20));
    let (bw, bh) = out.surface.backing_size();
    assert!(bw >= 20 && bh >= 20);
}

#[test]
fn test_quantized_output() {
    let p = provider();
    let desc = SurfaceDesc::new(8, 8, PixelFormat::Rgba8888);
    let src = p.upload(&desc, &[0.5; 8 * 8 * 4]).unwrap();
    let request = BlurRequest::new(IRect::from_wh(8, 8), 1.0, 1.0);
    let out = gaussian_blur(&p, &src, &request).unwrap();
    assert_eq!(out.surface.desc().format, PixelFormat::Rgba8888);
    for v in red(&p, out.surface) {
        // 0.5 stored as 128/255
        assert_relative_eq!(v, 128.0 / 255.0, epsilon = 1e-6);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_constant_image_survives(
        sigma_x in 0.0f32..30.0,
        sigma_y in 0.0f32..30.0,
        mode in prop_oneof![Just(DomainMode::Ignore), Just(DomainMode::Clamp), Just(DomainMode::Repeat)],
        w in 1u32..40,
        h in 1u32..40,
    ) {
        prop_assume!(sigma_x > 0.0 || sigma_y > 0.0);
        let p = provider();
        let src = image(&p, w, h, |_, _| 0.25);
        let request = BlurRequest::new(IRect::from_size(w, h), sigma_x, sigma_y).with_mode(mode);
        let out = gaussian_blur(&p, &src, &request).unwrap();
        prop_assert_eq!((out.surface.width(), out.surface.height()), (w, h));
        for v in red(&p, out.surface) {
            prop_assert!((v - 0.25).abs() < 1e-4, "got {}", v);
        }
    }
}
