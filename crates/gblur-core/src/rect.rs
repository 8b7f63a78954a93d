//! Integer rectangle and point types for blur geometry.
//!
//! Blur stages move rectangles between several coordinate spaces (source
//! texture, destination, decimated destination), so the types here are
//! signed and edge-based rather than origin + size.
//!
//! # Overview
//!
//! - [`IRect`] - Rectangle stored as left/top/right/bottom edges
//! - [`IPoint`] - Integer offset between coordinate spaces
//!
//! # Coordinate System
//!
//! All coordinates use the standard image convention:
//! - Origin (0, 0) is at the **top-left** corner
//! - X increases to the right
//! - Y increases downward
//! - Left/top edges are inclusive, right/bottom edges exclusive
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   (l,t)──────────┐
//!   │   │   content    │
//!   │   └──────────(r,b)
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use gblur_core::{IPoint, IRect};
//!
//! let content = IRect::from_xywh(10, 20, 100, 50);
//! let moved = content.offset(IPoint::new(-10, -20));
//! assert_eq!(moved, IRect::from_wh(100, 50));
//!
//! // Shrink for a 4x decimation, rounding outwards
//! let small = content.scale_round_out(0.25, 0.25);
//! assert_eq!(small, IRect::from_ltrb(2, 5, 28, 18));
//! ```

/// Integer 2D point, mostly used as an offset between coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IPoint {
    /// Horizontal component
    pub x: i32,
    /// Vertical component
    pub y: i32,
}

impl IPoint {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ZERO: IPoint = IPoint::new(0, 0);

    /// Returns `true` if both components are zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl std::ops::Neg for IPoint {
    type Output = IPoint;

    #[inline]
    fn neg(self) -> IPoint {
        IPoint::new(-self.x, -self.y)
    }
}

/// A rectangle defined by its four edges.
///
/// Left/top are inclusive, right/bottom exclusive. A rectangle whose right
/// edge is not greater than its left (or bottom not greater than top) is
/// empty; such "inverted" rectangles show up naturally when a band is inset
/// past its own width and are treated as empty everywhere.
///
/// # Example
///
/// ```rust
/// use gblur_core::IRect;
///
/// let rect = IRect::from_xywh(10, 20, 100, 50);
/// assert_eq!(rect.right, 110);
/// assert_eq!(rect.bottom, 70);
/// assert_eq!(rect.width(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    /// Left edge (inclusive)
    pub left: i32,
    /// Top edge (inclusive)
    pub top: i32,
    /// Right edge (exclusive)
    pub right: i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

impl IRect {
    /// The empty rectangle at the origin.
    pub const EMPTY: IRect = IRect::from_ltrb(0, 0, 0, 0);

    /// Largest edge magnitude for which sizes, offsets and scaling by small
    /// factors stay inside `i32`.
    pub const MAX_COORD: i32 = 1 << 29;

    /// Creates a rectangle from its edges.
    #[inline]
    pub const fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from origin and size.
    #[inline]
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::from_ltrb(x, y, x + width, y + height)
    }

    /// Creates a rectangle at the origin with the given size.
    ///
    /// ```rust
    /// use gblur_core::IRect;
    ///
    /// let rect = IRect::from_wh(1920, 1080);
    /// assert_eq!(rect.left, 0);
    /// assert_eq!(rect.top, 0);
    /// ```
    #[inline]
    pub const fn from_wh(width: i32, height: i32) -> Self {
        Self::from_ltrb(0, 0, width, height)
    }

    /// Creates a rectangle at the origin from unsigned surface dimensions.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::from_wh(width as i32, height as i32)
    }

    /// Width (may be negative for inverted rectangles).
    #[inline]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height (may be negative for inverted rectangles).
    #[inline]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> IPoint {
        IPoint::new(self.left, self.top)
    }

    /// Returns `true` if the rectangle covers no pixel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Returns `true` if every edge lies within `±MAX_COORD`.
    #[inline]
    pub const fn within_coord_limit(&self) -> bool {
        let m = Self::MAX_COORD;
        -m <= self.left
            && self.left <= m
            && -m <= self.top
            && self.top <= m
            && -m <= self.right
            && self.right <= m
            && -m <= self.bottom
            && self.bottom <= m
    }

    /// Number of pixels covered, zero for empty rectangles.
    #[inline]
    pub const fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width() as u64 * self.height() as u64
        }
    }

    /// Returns `true` if the pixel (x, y) is inside.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Returns `true` if `other` lies fully inside this rectangle.
    ///
    /// Empty rectangles are contained by everything.
    #[inline]
    pub const fn contains_rect(&self, other: &IRect) -> bool {
        other.is_empty()
            || (other.left >= self.left
                && other.top >= self.top
                && other.right <= self.right
                && other.bottom <= self.bottom)
    }

    /// Returns the translated rectangle.
    #[inline]
    pub const fn offset(&self, by: IPoint) -> IRect {
        IRect::from_ltrb(
            self.left + by.x,
            self.top + by.y,
            self.right + by.x,
            self.bottom + by.y,
        )
    }

    /// Returns the rectangle moved so its top-left corner is at (x, y).
    #[inline]
    pub const fn offset_to(&self, x: i32, y: i32) -> IRect {
        IRect::from_xywh(x, y, self.width(), self.height())
    }

    /// Moves each edge inwards by (dx, dy). Negative values grow the rectangle.
    ///
    /// No normalization happens: insetting past the middle yields an
    /// inverted, empty rectangle.
    ///
    /// ```rust
    /// use gblur_core::IRect;
    ///
    /// let r = IRect::from_wh(10, 10).inset(3, 0);
    /// assert_eq!(r, IRect::from_ltrb(3, 0, 7, 10));
    /// assert!(IRect::from_wh(4, 4).inset(3, 0).is_empty());
    /// ```
    #[inline]
    pub const fn inset(&self, dx: i32, dy: i32) -> IRect {
        IRect::from_ltrb(
            self.left + dx,
            self.top + dy,
            self.right - dx,
            self.bottom - dy,
        )
    }

    /// Intersection of two rectangles, or `None` when they do not overlap.
    pub fn intersect(&self, other: &IRect) -> Option<IRect> {
        let r = IRect::from_ltrb(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() { None } else { Some(r) }
    }

    /// Scales by fractional factors, flooring the left/top edges and
    /// ceiling the right/bottom ones so the result covers every touched pixel.
    pub fn scale_round_out(&self, sx: f32, sy: f32) -> IRect {
        IRect::from_ltrb(
            (self.left as f32 * sx).floor() as i32,
            (self.top as f32 * sy).floor() as i32,
            (self.right as f32 * sx).ceil() as i32,
            (self.bottom as f32 * sy).ceil() as i32,
        )
    }

    /// Scales every edge by integer factors.
    #[inline]
    pub const fn scale(&self, sx: i32, sy: i32) -> IRect {
        IRect::from_ltrb(
            self.left * sx,
            self.top * sy,
            self.right * sx,
            self.bottom * sy,
        )
    }

    /// Halves the edges along the selected axes.
    ///
    /// The halved edges must be even; decimation guarantees this by rounding
    /// the rectangle out to a multiple of the total scale factor first.
    pub fn shrink_by_2(&self, x_axis: bool, y_axis: bool) -> IRect {
        let mut r = *self;
        if x_axis {
            debug_assert!(r.left % 2 == 0 && r.right % 2 == 0, "odd x edges in {r}");
            r.left /= 2;
            r.right /= 2;
        }
        if y_axis {
            debug_assert!(r.top % 2 == 0 && r.bottom % 2 == 0, "odd y edges in {r}");
            r.top /= 2;
            r.bottom /= 2;
        }
        r
    }
}

impl std::fmt::Display for IRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IRect([{}, {}) x [{}, {}))",
            self.left, self.right, self.top, self.bottom
        )
    }
}
