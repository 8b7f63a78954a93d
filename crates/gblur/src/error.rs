//! Error types for the blur engine.

use gblur_core::{IRect, PixelFormat};
use gblur_gpu::GpuError;
use thiserror::Error;

use crate::plan::Stage;

/// Why a blur produced no image.
#[derive(Error, Debug)]
pub enum BlurError {
    /// The source format has no matching color type.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    /// A surface could not be created.
    #[error("surface allocation failed: {0}")]
    Allocation(#[source] GpuError),

    /// A finished render target could not be read back as a texture.
    #[error("texture acquisition failed: {0}")]
    TextureAcquisition(#[source] GpuError),

    /// A clear or draw was rejected by the provider.
    #[error("draw failed: {0}")]
    Draw(#[source] GpuError),

    /// Both sigmas are zero.
    #[error("nothing to blur: both sigmas are zero")]
    NoBlur,

    /// A request rectangle lies too far from the origin to address.
    #[error("bounds {0} exceed the coordinate limit")]
    InvalidBounds(IRect),

    /// A stage ran without the surface an earlier stage produces.
    #[error("blur pipeline reached {0} without an input surface")]
    Internal(Stage),
}

impl From<gblur_core::Error> for BlurError {
    fn from(err: gblur_core::Error) -> Self {
        match err {
            gblur_core::Error::UnsupportedFormat(format) => Self::UnsupportedFormat(format),
            gblur_core::Error::InvalidDimensions { width, height } => {
                Self::Allocation(GpuError::InvalidDimensions(
                    width.clamp(0, u32::MAX as i64) as u32,
                    height.clamp(0, u32::MAX as i64) as u32,
                ))
            }
        }
    }
}

/// Result type for blur operations.
pub type BlurResult<T> = Result<T, BlurError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: BlurError = gblur_core::Error::UnsupportedFormat(PixelFormat::Rg88).into();
        assert!(matches!(err, BlurError::UnsupportedFormat(PixelFormat::Rg88)));

        let err: BlurError = gblur_core::Error::InvalidDimensions { width: -3, height: 4 }.into();
        assert!(matches!(err, BlurError::Allocation(GpuError::InvalidDimensions(0, 4))));
    }
}
