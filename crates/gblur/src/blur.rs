//! The blur entry points.

use gblur_core::{blur_pixel_format, BackingFit, DomainMode, IPoint, IRect, ImageInfo};
use gblur_gpu::{Direction, GpuSurface, SurfaceDesc, SurfaceProvider};
use tracing::debug;

use crate::convolve::convolve_gaussian;
use crate::convolve_2d::convolve_gaussian_2d;
use crate::decimate::decimate;
use crate::error::{BlurError, BlurResult};
use crate::plan::{BlurPlan, Stage};
use crate::reexpand::reexpand;
use crate::request::BlurRequest;
use crate::sigma::{normalize_sigma, AxisBlur};
use crate::surface;

/// A finished blur.
#[derive(Debug)]
pub struct BlurOutput<S> {
    /// Output surface, `dst_bounds` sized.
    pub surface: S,
    /// Description of the output image.
    pub info: ImageInfo,
    /// Stages that produced it.
    pub plan: BlurPlan,
}

/// Blurs `src` as described by `request`.
///
/// Returns `None` on any failure; the cause is logged at debug level. Use
/// [`try_gaussian_blur`] to get it instead.
pub fn gaussian_blur<P: SurfaceProvider>(
    provider: &P,
    src: &P::Texture,
    request: &BlurRequest,
) -> Option<BlurOutput<P::Surface>> {
    match try_gaussian_blur(provider, src, request) {
        Ok(output) => Some(output),
        Err(e) => {
            debug!(error = %e, dst = %request.dst_bounds, "gaussian blur failed");
            None
        }
    }
}

/// Blurs `src` as described by `request`, reporting why it failed.
///
/// Intermediate surfaces are dropped as soon as the next stage has consumed
/// them; on failure nothing allocated here survives.
pub fn try_gaussian_blur<P: SurfaceProvider>(
    provider: &P,
    src: &P::Texture,
    request: &BlurRequest,
) -> BlurResult<BlurOutput<P::Surface>> {
    for bounds in [request.dst_bounds, request.src_bounds] {
        if !bounds.within_coord_limit() {
            return Err(BlurError::InvalidBounds(bounds));
        }
    }

    let format = blur_pixel_format(src.desc().format, request.color_space);
    let info = ImageInfo::from_format(
        request.dst_bounds.width(),
        request.dst_bounds.height(),
        format,
        request.alpha_type,
        request.color_space,
    )?;

    let max_texture_size = provider.max_texture_dimension();
    let plan = BlurPlan::new(
        normalize_sigma(request.sigma_x, max_texture_size),
        normalize_sigma(request.sigma_y, max_texture_size),
        request.fit,
    );
    if !plan.x.is_active() && !plan.y.is_active() {
        return Err(BlurError::NoBlur);
    }
    debug!(
        width = info.width,
        height = info.height,
        format = %format,
        ?plan,
        stages = ?plan.stages(),
        "gaussian blur"
    );

    let target = SurfaceDesc::new(info.width, info.height, format).with_color_space(request.color_space);
    let mode = request.mode;
    let mut src_offset = -request.dst_bounds.origin();
    let mut local_bounds = request.src_bounds;
    let mut src_rect = target
        .bounds()
        .scale_round_out(1.0 / plan.x.scale_factor as f32, 1.0 / plan.y.scale_factor as f32);

    // Latest intermediate texture; `None` reads the caller's source.
    let mut texture: Option<P::Texture> = None;
    // Latest render target, not yet turned into a texture.
    let mut pending: Option<P::Surface> = None;

    let mut stage = plan.next(Stage::Init);
    while stage != Stage::Done {
        let fit = plan.fit_for(stage);
        match stage {
            Stage::FastPath => {
                pending = Some(convolve_gaussian_2d(
                    provider, src, local_bounds, src_offset, plan.x, plan.y, mode, &target, fit,
                )?);
            }
            Stage::Decimate => {
                let (decimated, content) =
                    decimate(provider, src, src_offset, local_bounds, &plan, mode, &target)?;
                texture = Some(decimated);
                local_bounds = content;
                src_offset = IPoint::ZERO;
            }
            Stage::ConvolveX => {
                let source = texture.as_ref().unwrap_or(src);
                let y_radius = if plan.y.is_active() { plan.y.radius } else { 0 };
                let dst = convolve_x(
                    provider,
                    source,
                    src_rect,
                    src_offset,
                    plan.x,
                    y_radius,
                    local_bounds,
                    mode,
                    &target,
                    fit,
                )?;

                // Rows outside the content were cleared, so the Y pass only
                // needs the content rows, now in pass coordinates.
                let content = local_bounds.offset(src_offset);
                src_rect = src_rect.offset_to(0, 0);
                local_bounds = if mode == DomainMode::Ignore {
                    src_rect
                } else {
                    IRect::from_ltrb(0, content.top.max(0), src_rect.width(), content.bottom.min(src_rect.height()))
                };
                src_offset = IPoint::ZERO;
                texture = None;
                pending = Some(dst);
            }
            Stage::ConvolveY => {
                if let Some(dst) = pending.take() {
                    texture = Some(surface::acquire(provider, dst)?);
                }
                let source = texture.as_ref().unwrap_or(src);
                pending = Some(convolve_gaussian(
                    provider,
                    source,
                    src_rect,
                    src_offset,
                    Direction::Y,
                    plan.y,
                    local_bounds,
                    mode,
                    &target,
                    fit,
                )?);
                src_rect = src_rect.offset_to(0, 0);
                src_offset = IPoint::ZERO;
                texture = None;
            }
            Stage::Reexpand => {
                let convolved = stage_input(pending.take(), stage)?;
                pending = Some(reexpand(
                    provider,
                    convolved,
                    plan.x.scale_factor,
                    plan.y.scale_factor,
                    mode,
                    &target,
                    fit,
                )?);
            }
            Stage::Init | Stage::Done => {}
        }
        stage = plan.next(stage);
    }

    let surface = stage_input(pending, Stage::Done)?;
    Ok(BlurOutput { surface, info, plan })
}

/// Horizontal pass into a new surface, with `y_radius` rows below it zeroed
/// for the vertical pass that reads them.
#[allow(clippy::too_many_arguments)]
fn convolve_x<P: SurfaceProvider>(
    provider: &P,
    texture: &P::Texture,
    src_rect: IRect,
    src_offset: IPoint,
    axis: AxisBlur,
    y_radius: i32,
    src_bounds: IRect,
    mode: DomainMode,
    target: &SurfaceDesc,
    fit: BackingFit,
) -> BlurResult<P::Surface> {
    let mut dst = convolve_gaussian(
        provider,
        texture,
        src_rect,
        src_offset,
        Direction::X,
        axis,
        src_bounds,
        mode,
        target,
        fit,
    )?;
    let margin = IRect::from_xywh(0, src_rect.height(), src_rect.width(), y_radius);
    surface::clear(provider, &mut dst, margin)?;
    Ok(dst)
}

/// The surface `stage` consumes. The plan orders stages so that one exists.
fn stage_input<S>(surface: Option<S>, stage: Stage) -> BlurResult<S> {
    debug_assert!(surface.is_some(), "{stage} has no input surface");
    surface.ok_or(BlurError::Internal(stage))
}
