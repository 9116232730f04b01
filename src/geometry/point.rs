//! Planar points used as generating points and Voronoi vertices.
//!
//! # Special Floating-Point Equality Semantics
//!
//! Equality, ordering and hashing go through [`OrderedFloat`] instead of IEEE 754
//! comparison:
//! - `NaN` compares equal to itself, so points can be used as hash keys
//! - `+0.0` and `-0.0` compare (and hash) equal
//! - ordering is lexicographic by `(x, y)`, which is the canonical lattice order
//!
//! If you need standard IEEE 754 semantics, compare [`Point::coords`] directly.

#![forbid(unsafe_code)]

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Errors raised when a point carries a coordinate that cannot be used geometrically.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum PointValidationError {
    /// A coordinate value is NaN or infinite.
    #[error("Invalid coordinate at index {coordinate_index}: {coordinate_value}")]
    NonFiniteCoordinate {
        /// Index of the invalid coordinate (0 = x, 1 = y).
        coordinate_index: usize,
        /// Value of the invalid coordinate, as a string.
        coordinate_value: String,
    },
}

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A point in the plane.
///
/// Points are immutable once created; the coordinates are private and exposed
/// through read-only accessors.
///
/// # Examples
///
/// ```rust
/// use voronoi_lattice::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0]);
/// assert_eq!(p.coords(), &[1.0, 2.0]);
/// assert_eq!(p.x(), 1.0);
/// assert_eq!(p, Point::from([1.0, 2.0]));
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    coords: [f64; 2],
}

// =============================================================================
// PUBLIC API
// =============================================================================

impl Point {
    /// Creates a point from its `[x, y]` coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [f64; 2]) -> Self {
        Self { coords }
    }

    /// Returns a reference to the `[x, y]` coordinates.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; 2] {
        &self.coords
    }

    /// The x coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.coords[0]
    }

    /// The y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.coords[1]
    }

    /// Returns `true` if both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Validates that all coordinates are finite.
    ///
    /// # Errors
    ///
    /// Returns [`PointValidationError::NonFiniteCoordinate`] for the first NaN or
    /// infinite coordinate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use voronoi_lattice::geometry::point::Point;
    ///
    /// assert!(Point::new([0.0, 1.0]).validate().is_ok());
    /// assert!(Point::new([f64::NAN, 1.0]).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), PointValidationError> {
        for (index, &coord) in self.coords.iter().enumerate() {
            if !coord.is_finite() {
                return Err(PointValidationError::NonFiniteCoordinate {
                    coordinate_index: index,
                    coordinate_value: format!("{coord:?}"),
                });
            }
        }
        Ok(())
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to `other`, computed without intermediate overflow.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x() - other.x()).hypot(self.y() - other.y())
    }

    /// Largest absolute coordinate (the Chebyshev norm).
    ///
    /// A point lies inside the open box `(-r, r) × (-r, r)` exactly when this value is
    /// strictly less than `r`.
    #[inline]
    #[must_use]
    pub fn max_abs_coordinate(&self) -> f64 {
        self.x().abs().max(self.y().abs())
    }

    /// Midpoint of the segment between `self` and `other`.
    #[inline]
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new([
            0.5 * (self.x() + other.x()),
            0.5 * (self.y() + other.y()),
        ])
    }

    /// Replaces negative zero coordinates with positive zero.
    ///
    /// Symmetric lattice generation produces `-0.0` on the axes; normalizing keeps the
    /// exported tables free of `-0.00000000`.
    #[inline]
    #[must_use]
    pub fn normalize_signed_zero(self) -> Self {
        // Adding +0.0 maps -0.0 to +0.0 and leaves every other value unchanged.
        Self::new([self.x() + 0.0, self.y() + 0.0])
    }
}

// =============================================================================
// STANDARD TRAIT IMPLEMENTATIONS
// =============================================================================

impl Hash for Point {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &coord in &self.coords {
            OrderedFloat(coord).hash(state);
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| OrderedFloat(*a) == OrderedFloat(*b))
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(self.x())
            .cmp(&OrderedFloat(other.x()))
            .then_with(|| OrderedFloat(self.y()).cmp(&OrderedFloat(other.y())))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

impl From<[f64; 2]> for Point {
    #[inline]
    fn from(coords: [f64; 2]) -> Self {
        Self::new(coords)
    }
}

impl From<Point> for [f64; 2] {
    #[inline]
    fn from(point: Point) -> Self {
        point.coords
    }
}

impl From<&Point> for [f64; 2] {
    #[inline]
    fn from(point: &Point) -> Self {
        point.coords
    }
}

// =============================================================================
// TESTS
// =============================================================================
