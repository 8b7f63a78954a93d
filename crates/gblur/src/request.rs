//! Blur parameters.

use gblur_core::{AlphaType, BackingFit, ColorSpace, DomainMode, IRect};

/// Everything a blur needs besides the provider and the source texture.
///
/// # Example
///
/// ```rust
/// use gblur::BlurRequest;
/// use gblur_core::{BackingFit, DomainMode, IRect};
///
/// let request = BlurRequest::new(IRect::from_xywh(10, 10, 64, 64), 3.0, 3.0)
///     .with_src_bounds(IRect::from_wh(100, 100))
///     .with_mode(DomainMode::Clamp)
///     .with_fit(BackingFit::Approx);
/// assert_eq!(request.sigma_x, 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurRequest {
    /// Output rectangle in source texture coordinates; its origin becomes
    /// the output's (0, 0).
    pub dst_bounds: IRect,
    /// Valid region of the source texture, used by non-Ignore domain modes.
    pub src_bounds: IRect,
    /// Horizontal standard deviation in pixels.
    pub sigma_x: f32,
    /// Vertical standard deviation in pixels.
    pub sigma_y: f32,
    /// Sampling outside `src_bounds`.
    pub mode: DomainMode,
    /// Alpha interpretation of the output.
    pub alpha_type: AlphaType,
    /// Color space of the source and output.
    pub color_space: Option<ColorSpace>,
    /// Backing fit of the output surface.
    pub fit: BackingFit,
}

impl Default for BlurRequest {
    fn default() -> Self {
        Self {
            dst_bounds: IRect::EMPTY,
            src_bounds: IRect::EMPTY,
            sigma_x: 0.0,
            sigma_y: 0.0,
            mode: DomainMode::Ignore,
            alpha_type: AlphaType::Premul,
            color_space: None,
            fit: BackingFit::Exact,
        }
    }
}

impl BlurRequest {
    /// Blur of `dst_bounds` with the content assumed to match it.
    pub fn new(dst_bounds: IRect, sigma_x: f32, sigma_y: f32) -> Self {
        Self {
            dst_bounds,
            src_bounds: dst_bounds,
            sigma_x,
            sigma_y,
            ..Default::default()
        }
    }

    /// Sets the valid source region.
    pub fn with_src_bounds(mut self, src_bounds: IRect) -> Self {
        self.src_bounds = src_bounds;
        self
    }

    /// Sets both sigmas.
    pub fn with_sigma(mut self, sigma_x: f32, sigma_y: f32) -> Self {
        self.sigma_x = sigma_x;
        self.sigma_y = sigma_y;
        self
    }

    /// Sets the domain mode.
    pub fn with_mode(mut self, mode: DomainMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the output alpha type.
    pub fn with_alpha_type(mut self, alpha_type: AlphaType) -> Self {
        self.alpha_type = alpha_type;
        self
    }

    /// Sets the color space.
    pub fn with_color_space(mut self, color_space: Option<ColorSpace>) -> Self {
        self.color_space = color_space;
        self
    }

    /// Sets the output backing fit.
    pub fn with_fit(mut self, fit: BackingFit) -> Self {
        self.fit = fit;
        self
    }
}
