//! Error types for gblur-core.
//!
//! # Usage
//!
//! ```rust
//! use gblur_core::{Error, PixelFormat, Result};
//!
//! fn color_type_of(format: PixelFormat) -> Result<gblur_core::ColorType> {
//!     format.color_type().ok_or(Error::UnsupportedFormat(format))
//! }
//!
//! assert!(color_type_of(PixelFormat::Rg88).is_err());
//! ```

use thiserror::Error;

use crate::format::PixelFormat;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while describing images.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel format has no matching image color type.
    #[error("pixel format {0} has no image color type")]
    UnsupportedFormat(PixelFormat),

    /// Width or height is zero or does not fit the coordinate range.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: i64,
        /// Requested height
        height: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::UnsupportedFormat(PixelFormat::R16Float);
        assert_eq!(err.to_string(), "pixel format r16_float has no image color type");
        let err = Error::InvalidDimensions { width: 0, height: -4 };
        assert!(err.to_string().contains("0x-4"));
    }
}
