//! # gblur-core
//!
//! Core types shared by the blur engine and its surface providers.
//!
//! - [`IRect`], [`IPoint`] - Integer geometry for content and draw rectangles
//! - [`PixelFormat`], [`ColorType`], [`AlphaType`] - Pixel layout descriptions
//! - [`ColorSpace`] - Color space tags carried by surfaces
//! - [`ImageInfo`] - Size and color description of an image
//! - [`BackingFit`] - Exact vs approximate backing stores
//! - [`DomainMode`] - Edge sampling policy
//!
//! ## Crate Structure
//!
//! This crate has no GPU knowledge and no internal dependencies:
//!
//! ```text
//! gblur-core (this crate)
//!    ^
//!    |
//!    +-- gblur-gpu (surface providers)
//!    +-- gblur (blur engine)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod colorspace;
pub mod error;
pub mod format;
pub mod info;
pub mod rect;

pub use colorspace::*;
pub use error::*;
pub use format::*;
pub use info::*;
pub use rect::*;

/// Prelude module for convenient imports.
///
/// ```
/// use gblur_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::colorspace::ColorSpace;
    pub use crate::error::{Error, Result};
    pub use crate::format::{blur_pixel_format, AlphaType, ColorType, PixelFormat};
    pub use crate::info::{BackingFit, DomainMode, ImageInfo};
    pub use crate::rect::{IPoint, IRect};
}
