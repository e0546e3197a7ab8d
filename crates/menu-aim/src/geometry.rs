#![forbid(unsafe_code)]

//! Geometric primitives for intent prediction.
//!
//! Coordinates are absolute page coordinates in pixels, origin at top-left,
//! y growing downward. Everything is `f64` so slopes between points can be
//! computed without conversions.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A recorded cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Slope of the line from `self` to `other` (`dy / dx`).
    ///
    /// Coincident x-coordinates yield an infinite (or NaN, for identical
    /// points) slope. Both compare consistently under IEEE semantics: an
    /// infinite slope is a vertical approach, a NaN slope fails every
    /// comparison and therefore never signals convergence.
    #[inline]
    #[must_use]
    pub fn slope_to(self, other: Point) -> f64 {
        (other.y - self.y) / (other.x - self.x)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Side of the menu on which submenus open.
///
/// Selects which axis receives the tolerance margin and which two corners
/// of the tolerant box the predictor measures against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SubmenuDirection {
    #[default]
    Right,
    Left,
    Below,
    Above,
}

impl SubmenuDirection {
    /// Parse a direction, falling back to [`SubmenuDirection::Right`] for
    /// anything unrecognized.
    #[must_use]
    pub fn parse_lossy(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Below => "below",
            Self::Above => "above",
        }
    }

    /// Whether the tolerance margin widens the box vertically.
    ///
    /// Horizontal submenus get slack above and below the menu; vertical
    /// ones get it to the left and right.
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }
}

impl fmt::Display for SubmenuDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known submenu direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError {
    value: String,
}

impl ParseDirectionError {
    /// The rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown submenu direction {:?} (expected right, left, below or above)",
            self.value
        )
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for SubmenuDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" => Ok(Self::Right),
            "left" => Ok(Self::Left),
            "below" | "down" => Ok(Self::Below),
            "above" | "up" => Ok(Self::Above),
            _ => Err(ParseDirectionError {
                value: s.to_string(),
            }),
        }
    }
}

/// The four corners of a (possibly widened) box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub upper_left: Point,
    pub upper_right: Point,
    pub lower_left: Point,
    pub lower_right: Point,
}

impl Corners {
    /// The `(decreasing, increasing)` reference corners for `direction`.
    ///
    /// A cursor heading for the submenu sees its slope to the decreasing
    /// corner fall and its slope to the increasing corner rise.
    #[must_use]
    pub const fn reference(&self, direction: SubmenuDirection) -> (Point, Point) {
        match direction {
            SubmenuDirection::Right => (self.upper_right, self.lower_right),
            SubmenuDirection::Left => (self.lower_left, self.upper_left),
            SubmenuDirection::Below => (self.lower_right, self.lower_left),
            SubmenuDirection::Above => (self.upper_left, self.upper_right),
        }
    }
}

/// Bounding box of a menu container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// Create a new region.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Check if the region has no usable area (zero, negative or NaN size).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Corners of the region widened by `tolerance` on the axis
    /// perpendicular to `direction`.
    #[must_use]
    pub fn tolerant_corners(&self, direction: SubmenuDirection, tolerance: f64) -> Corners {
        let (dx, dy) = if direction.is_horizontal() {
            (0.0, tolerance)
        } else {
            (tolerance, 0.0)
        };
        let left = self.left - dx;
        let right = self.right() + dx;
        let top = self.top - dy;
        let bottom = self.bottom() + dy;

        Corners {
            upper_left: Point::new(left, top),
            upper_right: Point::new(right, top),
            lower_left: Point::new(left, bottom),
            lower_right: Point::new(right, bottom),
        }
    }

    /// Check if `point` lies inside the tolerant box (edges inclusive).
    ///
    /// An empty region contains nothing, whatever the tolerance.
    #[must_use]
    pub fn contains_tolerant(
        &self,
        point: Point,
        direction: SubmenuDirection,
        tolerance: f64,
    ) -> bool {
        if self.is_empty() {
            return false;
        }
        let c = self.tolerant_corners(direction, tolerance);
        point.x >= c.upper_left.x
            && point.x <= c.lower_right.x
            && point.y >= c.upper_left.y
            && point.y <= c.lower_right.y
    }
}
