//! Stage sequencing.
//!
//! A blur runs as a short state machine:
//!
//! ```text
//! Init ─┬─► FastPath ─────────────────────────────────────► Done
//!       └─► [Decimate] ─► [ConvolveX] ─► [ConvolveY] ─► [Reexpand] ─► Done
//! ```
//!
//! Bracketed stages are skipped when not needed. Only the stage that writes
//! the final output uses the caller's backing fit; everything before it is
//! an intermediate and gets an approximate fit.

use gblur_core::BackingFit;
use gblur_gpu::MAX_KERNEL_SIZE;

use crate::sigma::AxisBlur;

/// One step of a blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing done yet
    Init,
    /// Single-pass 2D convolution
    FastPath,
    /// Power-of-two downsampling
    Decimate,
    /// Horizontal 1D convolution
    ConvolveX,
    /// Vertical 1D convolution
    ConvolveY,
    /// Bilinear upsampling to the output size
    Reexpand,
    /// Finished
    Done,
}

impl Stage {
    /// Short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::FastPath => "fast_path",
            Self::Decimate => "decimate",
            Self::ConvolveX => "convolve_x",
            Self::ConvolveY => "convolve_y",
            Self::Reexpand => "reexpand",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized axes plus the requested output fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurPlan {
    /// Horizontal axis
    pub x: AxisBlur,
    /// Vertical axis
    pub y: AxisBlur,
    /// Fit of the final output surface
    pub fit: BackingFit,
}

impl BlurPlan {
    /// Creates a plan.
    pub const fn new(x: AxisBlur, y: AxisBlur, fit: BackingFit) -> Self {
        Self { x, y, fit }
    }

    /// Both axes blurred by a kernel small enough for one 2D pass.
    pub fn use_fast_path(&self) -> bool {
        self.x.is_active()
            && self.y.is_active()
            && self.x.kernel_width() * self.y.kernel_width() <= MAX_KERNEL_SIZE
    }

    /// Either axis is downsampled.
    pub fn is_decimated(&self) -> bool {
        self.x.is_decimated() || self.y.is_decimated()
    }

    /// Stage that follows `stage`.
    pub fn next(&self, stage: Stage) -> Stage {
        match stage {
            Stage::Init if !self.x.is_active() && !self.y.is_active() => Stage::Done,
            Stage::Init if self.use_fast_path() => Stage::FastPath,
            Stage::Init if self.is_decimated() => Stage::Decimate,
            Stage::Init | Stage::Decimate => {
                if self.x.is_active() {
                    Stage::ConvolveX
                } else {
                    Stage::ConvolveY
                }
            }
            Stage::ConvolveX if self.y.is_active() => Stage::ConvolveY,
            Stage::ConvolveX | Stage::ConvolveY if self.is_decimated() => Stage::Reexpand,
            Stage::FastPath | Stage::ConvolveX | Stage::ConvolveY | Stage::Reexpand | Stage::Done => {
                Stage::Done
            }
        }
    }

    /// Backing fit of the surface written by `stage`.
    pub fn fit_for(&self, stage: Stage) -> BackingFit {
        match stage {
            Stage::Decimate => BackingFit::Approx,
            // Reexpand will be last
            Stage::ConvolveX | Stage::ConvolveY if self.is_decimated() => BackingFit::Approx,
            // The Y pass will be last
            Stage::ConvolveX if self.y.is_active() => BackingFit::Approx,
            _ => self.fit,
        }
    }

    /// Stages executed, in order, excluding `Init` and `Done`.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        let mut stage = self.next(Stage::Init);
        while stage != Stage::Done {
            stages.push(stage);
            stage = self.next(stage);
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigma::normalize_sigma;

    fn plan(sx: f32, sy: f32) -> BlurPlan {
        BlurPlan::new(
            normalize_sigma(sx, 16384),
            normalize_sigma(sy, 16384),
            BackingFit::Exact,
        )
    }

    #[test]
    fn test_fast_path() {
        // radius 2 x radius 1: 5 * 3 = 15 taps
        let p = plan(0.6, 0.3);
        assert!(p.use_fast_path());
        assert_eq!(p.stages(), vec![Stage::FastPath]);
        assert_eq!(p.fit_for(Stage::FastPath), BackingFit::Exact);
    }

    #[test]
    fn test_separable_no_decimation() {
        // radius 3 each: 49 taps is over budget
        let p = plan(1.0, 1.0);
        assert!(!p.use_fast_path());
        assert_eq!(p.stages(), vec![Stage::ConvolveX, Stage::ConvolveY]);
        assert_eq!(p.fit_for(Stage::ConvolveX), BackingFit::Approx);
        assert_eq!(p.fit_for(Stage::ConvolveY), BackingFit::Exact);
    }

    #[test]
    fn test_single_axis() {
        let p = plan(2.0, 0.0);
        assert_eq!(p.stages(), vec![Stage::ConvolveX]);
        assert_eq!(p.fit_for(Stage::ConvolveX), BackingFit::Exact);

        let p = plan(0.0, 2.0);
        assert_eq!(p.stages(), vec![Stage::ConvolveY]);
        assert_eq!(p.fit_for(Stage::ConvolveY), BackingFit::Exact);
    }

    #[test]
    fn test_decimated() {
        let p = plan(20.0, 0.0);
        assert_eq!(p.stages(), vec![Stage::Decimate, Stage::ConvolveX, Stage::Reexpand]);
        assert_eq!(p.fit_for(Stage::Decimate), BackingFit::Approx);
        assert_eq!(p.fit_for(Stage::ConvolveX), BackingFit::Approx);
        assert_eq!(p.fit_for(Stage::Reexpand), BackingFit::Exact);

        let p = plan(1.0, 9.0);
        assert_eq!(
            p.stages(),
            vec![Stage::Decimate, Stage::ConvolveX, Stage::ConvolveY, Stage::Reexpand]
        );
        assert_eq!(p.fit_for(Stage::ConvolveY), BackingFit::Approx);
    }

    #[test]
    fn test_no_blur() {
        assert!(plan(0.0, 0.0).stages().is_empty());
    }
}
