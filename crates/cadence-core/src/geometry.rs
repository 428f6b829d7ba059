//! Geometric primitives for element positions and vertical ranges.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle in absolute diagram coordinates
//! - [`Range`] - A closed interval on the vertical (time) axis
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y  (time flows downward)
//! ```
//!
//! The Y axis is the ordering axis of a sequence diagram: an event lower on the
//! page happens later. Every [`Range`] is expressed in the same units as
//! [`Bounds`].

use std::fmt;

/// A 2D point in diagram coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// Axis-aligned rectangle defined by its minimum and maximum coordinates.
///
/// Sizes with negative components are normalised so that `min <= max` always
/// holds on both axes.
///
/// # Examples
///
/// ```
/// # use cadence_core::geometry::{Bounds, Point, Size};
/// let frame = Bounds::new(20.0, 10.0, 100.0, 50.0);
/// assert_eq!(frame.max_x(), 120.0);
/// assert_eq!(frame.vertical_range().upper(), 60.0);
///
/// let lifeline = Bounds::new_from_top_left(Point::new(50.0, 0.0), Size::new(10.0, 200.0));
/// assert!(frame.intersects(&lifeline));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and a width/height pair, the
    /// `(x, y, width, height)` shape in which model geometry is reported.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new_from_top_left(Point::new(x, y), Size::new(width, height))
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        let (min_x, max_x) = ordered(top_left.x(), top_left.x() + size.width());
        let (min_y, max_y) = ordered(top_left.y(), top_left.y() + size.height());
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the vertical extent of these bounds as a [`Range`].
    pub fn vertical_range(self) -> Range {
        Range::new(self.min_y, self.max_y)
    }

    /// Returns the horizontal extent of these bounds as a [`Range`].
    pub fn horizontal_range(self) -> Range {
        Range::new(self.min_x, self.max_x)
    }

    /// Checks whether two bounds overlap.
    ///
    /// Edges are inclusive so that zero-width elements (a lifeline drawn as a
    /// line) still intersect the areas they cross.
    pub fn intersects(&self, other: &Self) -> bool {
        self.horizontal_range().intersects(&other.horizontal_range())
            && self.vertical_range().intersects(&other.vertical_range())
    }
}

/// A closed interval `[lower, upper]` on the vertical axis.
///
/// Construction normalises inverted bounds, so `lower() <= upper()` holds for
/// every `Range` value. A zero-height range models a punctual event such as a
/// horizontal message or an end-of-life marker.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    lower: f32,
    upper: f32,
}

impl Range {
    /// Creates a range from two bounds given in any order.
    pub fn new(a: f32, b: f32) -> Self {
        let (lower, upper) = ordered(a, b);
        Self { lower, upper }
    }

    /// Creates a zero-height range at `y`.
    pub fn point(y: f32) -> Self {
        Self { lower: y, upper: y }
    }

    /// Returns the start of the range
    pub fn lower(self) -> f32 {
        self.lower
    }

    /// Returns the end of the range
    pub fn upper(self) -> f32 {
        self.upper
    }

    /// Returns `upper - lower`.
    pub fn width(self) -> f32 {
        self.upper - self.lower
    }

    /// Checks whether `y` lies inside the range, bounds included.
    pub fn includes(self, y: f32) -> bool {
        self.lower <= y && y <= self.upper
    }

    /// Checks whether `other` lies entirely inside this range.
    pub fn includes_range(self, other: Range) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }

    /// Checks whether the two ranges share at least one point.
    pub fn intersects(&self, other: &Range) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if b < a { (b, a) } else { (a, b) }
}
