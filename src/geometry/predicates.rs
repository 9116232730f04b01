//! Geometric predicates for planar triangles.
//!
//! Orientation and incircle tests are evaluated as small determinants with
//! [`nalgebra`] and classified against an adaptive tolerance that scales with the
//! magnitude of the operands (the permanent of the matrix). Values whose magnitude
//! falls inside the tolerance band are reported as `DEGENERATE` / `BOUNDARY`, so
//! exactly cocircular or collinear configurations are classified consistently.

use nalgebra::{Matrix2, Matrix3};

use crate::geometry::point::Point;

/// Relative tolerance applied to the permanent of a predicate matrix.
///
/// A determinant whose absolute value is below `RELATIVE_TOLERANCE * permanent` is
/// treated as zero.
pub const RELATIVE_TOLERANCE: f64 = 1e-12;

/// Represents the position of a point relative to a circumcircle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InSphere {
    /// The point is outside the circumcircle
    OUTSIDE,
    /// The point is on the circumcircle (within numerical tolerance)
    BOUNDARY,
    /// The point is inside the circumcircle
    INSIDE,
}

impl std::fmt::Display for InSphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clockwise (determinant < 0)
    NEGATIVE,
    /// Collinear (determinant ≈ 0)
    DEGENERATE,
    /// Counter-clockwise (determinant > 0)
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Errors that can occur while computing triangle centers.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum CircumcenterError {
    /// The three points are collinear, so no finite circumcenter exists.
    #[error("Degenerate triangle {a}, {b}, {c}: points are collinear")]
    DegenerateTriangle {
        /// First corner.
        a: Point,
        /// Second corner.
        b: Point,
        /// Third corner.
        c: Point,
    },
}

/// Twice the signed area of triangle `(a, b, c)`.
///
/// Positive for counter-clockwise triangles, negative for clockwise ones.
#[inline]
#[must_use]
pub fn signed_area2(a: &Point, b: &Point, c: &Point) -> f64 {
    orientation_matrix(a, b, c).determinant()
}

/// Determine the orientation of triangle `(a, b, c)`.
///
/// # Example
///
/// ```
/// use voronoi_lattice::geometry::point::Point;
/// use voronoi_lattice::geometry::predicates::{Orientation, orientation};
///
/// let a = Point::new([0.0, 0.0]);
/// let b = Point::new([1.0, 0.0]);
/// let c = Point::new([0.0, 1.0]);
/// assert_eq!(orientation(&a, &b, &c), Orientation::POSITIVE);
/// assert_eq!(orientation(&a, &c, &b), Orientation::NEGATIVE);
/// assert_eq!(orientation(&a, &b, &Point::new([2.0, 0.0])), Orientation::DEGENERATE);
/// ```
#[must_use]
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let matrix = orientation_matrix(a, b, c);
    let det = matrix.determinant();
    let bound = RELATIVE_TOLERANCE * permanent2(&matrix);

    if det > bound {
        Orientation::POSITIVE
    } else if det < -bound {
        Orientation::NEGATIVE
    } else {
        Orientation::DEGENERATE
    }
}

/// Classify `test_point` against the circumcircle of the counter-clockwise triangle
/// `(a, b, c)`.
///
/// Uses the lifted-paraboloid determinant with every row translated by the test point:
///
/// ```text
/// | ax-dx  ay-dy  (ax-dx)²+(ay-dy)² |
/// | bx-dx  by-dy  (bx-dx)²+(by-dy)² |
/// | cx-dx  cy-dy  (cx-dx)²+(cy-dy)² |
/// ```
///
/// For a clockwise triangle the classification is mirrored; callers that cannot
/// guarantee orientation should use [`incircle_unoriented`].
///
/// # Example
///
/// ```
/// use voronoi_lattice::geometry::point::Point;
/// use voronoi_lattice::geometry::predicates::{InSphere, incircle};
///
/// let a = Point::new([0.0, 0.0]);
/// let b = Point::new([1.0, 0.0]);
/// let c = Point::new([0.0, 1.0]);
/// assert_eq!(incircle(&a, &b, &c, &Point::new([0.5, 0.5])), InSphere::INSIDE);
/// assert_eq!(incircle(&a, &b, &c, &Point::new([1.0, 1.0])), InSphere::BOUNDARY);
/// assert_eq!(incircle(&a, &b, &c, &Point::new([2.0, 2.0])), InSphere::OUTSIDE);
/// ```
#[must_use]
pub fn incircle(a: &Point, b: &Point, c: &Point, test_point: &Point) -> InSphere {
    let matrix = incircle_matrix(a, b, c, test_point);
    let det = matrix.determinant();
    let bound = RELATIVE_TOLERANCE * permanent3(&matrix);

    if det > bound {
        InSphere::INSIDE
    } else if det < -bound {
        InSphere::OUTSIDE
    } else {
        InSphere::BOUNDARY
    }
}

/// Incircle test that first normalizes the triangle orientation.
///
/// Returns `None` when the triangle is degenerate.
#[must_use]
pub fn incircle_unoriented(
    a: &Point,
    b: &Point,
    c: &Point,
    test_point: &Point,
) -> Option<InSphere> {
    match orientation(a, b, c) {
        Orientation::POSITIVE => Some(incircle(a, b, c, test_point)),
        Orientation::NEGATIVE => Some(incircle(a, c, b, test_point)),
        Orientation::DEGENERATE => None,
    }
}

/// Circumcenter of triangle `(a, b, c)`.
///
/// Coordinates are computed relative to `a` to limit cancellation.
///
/// # Errors
///
/// Returns [`CircumcenterError::DegenerateTriangle`] when the points are collinear.
///
/// # Example
///
/// ```
/// use voronoi_lattice::geometry::point::Point;
/// use voronoi_lattice::geometry::predicates::circumcenter;
///
/// let center = circumcenter(
///     &Point::new([0.0, 0.0]),
///     &Point::new([1.0, 0.0]),
///     &Point::new([0.0, 1.0]),
/// )
/// .unwrap();
/// assert_eq!(center, Point::new([0.5, 0.5]));
/// ```
pub fn circumcenter(a: &Point, b: &Point, c: &Point) -> Result<Point, CircumcenterError> {
    if orientation(a, b, c) == Orientation::DEGENERATE {
        return Err(CircumcenterError::DegenerateTriangle {
            a: *a,
            b: *b,
            c: *c,
        });
    }

    let bx = b.x() - a.x();
    let by = b.y() - a.y();
    let cx = c.x() - a.x();
    let cy = c.y() - a.y();

    let d = 2.0 * bx.mul_add(cy, -(by * cx));
    let b_norm = bx.mul_add(bx, by * by);
    let c_norm = cx.mul_add(cx, cy * cy);

    let ux = cy.mul_add(b_norm, -(by * c_norm)) / d;
    let uy = bx.mul_add(c_norm, -(cx * b_norm)) / d;

    Ok(Point::new([a.x() + ux, a.y() + uy]))
}

/// Circumradius of triangle `(a, b, c)`.
///
/// # Errors
///
/// Returns an error if the circumcenter cannot be computed. See [`circumcenter`].
pub fn circumradius(a: &Point, b: &Point, c: &Point) -> Result<f64, CircumcenterError> {
    circumcenter(a, b, c).map(|center| center.distance(a))
}

// =============================================================================
// MATRIX HELPERS
// =============================================================================

fn orientation_matrix(a: &Point, b: &Point, c: &Point) -> Matrix2<f64> {
    Matrix2::new(
        b.x() - a.x(),
        b.y() - a.y(),
        c.x() - a.x(),
        c.y() - a.y(),
    )
}

fn incircle_matrix(a: &Point, b: &Point, c: &Point, d: &Point) -> Matrix3<f64> {
    let row = |p: &Point| {
        let dx = p.x() - d.x();
        let dy = p.y() - d.y();
        (dx, dy, dx.mul_add(dx, dy * dy))
    };
    let (a0, a1, a2) = row(a);
    let (b0, b1, b2) = row(b);
    let (c0, c1, c2) = row(c);
    Matrix3::new(a0, a1, a2, b0, b1, b2, c0, c1, c2)
}

/// Sum of the absolute values of the determinant's expansion terms.
fn permanent2(m: &Matrix2<f64>) -> f64 {
    let m = m.map(f64::abs);
    m[(0, 0)].mul_add(m[(1, 1)], m[(0, 1)] * m[(1, 0)])
}

fn permanent3(m: &Matrix3<f64>) -> f64 {
    let m = m.map(f64::abs);
    m[(0, 0)] * m[(1, 1)].mul_add(m[(2, 2)], m[(1, 2)] * m[(2, 1)])
        + m[(0, 1)] * m[(1, 0)].mul_add(m[(2, 2)], m[(1, 2)] * m[(2, 0)])
        + m[(0, 2)] * m[(1, 0)].mul_add(m[(2, 1)], m[(1, 1)] * m[(2, 0)])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point {
        Point::new([x, y])
    }

    #[test]
    fn test_orientation_basic() {
        assert_eq!(
            orientation(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0)),
            Orientation::POSITIVE
        );
        assert_eq!(
            orientation(&p(0.0, 0.0), &p(0.0, 1.0), &p(1.0, 0.0)),
            Orientation::NEGATIVE
        );
        assert_eq!(
            orientation(&p(0.0, 0.0), &p(1.0, 1.0), &p(3.0, 3.0)),
            Orientation::DEGENERATE
        );
    }

    #[test]
    fn test_orientation_scales_with_magnitude() {
        // Far from the origin the raw determinant is large in absolute terms but the
        // configuration is still exactly collinear.
        let offset = 1.0e6;
        assert_eq!(
            orientation(
                &p(offset, offset),
                &p(offset + 1.0, offset + 2.0),
                &p(offset + 2.0, offset + 4.0)
            ),
            Orientation::DEGENERATE
        );
        assert_eq!(
            orientation(
                &p(offset, offset),
                &p(offset + 1.0, offset),
                &p(offset, offset + 1.0)
            ),
            Orientation::POSITIVE
        );
    }

    #[test]
    fn test_incircle_square_is_cocircular() {
        let (a, b, c) = (p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0));
        assert_eq!(incircle(&a, &b, &c, &p(1.0, 1.0)), InSphere::BOUNDARY);
        assert_eq!(incircle(&a, &b, &c, &p(0.9, 0.9)), InSphere::INSIDE);
        assert_eq!(incircle(&a, &b, &c, &p(1.1, 1.1)), InSphere::OUTSIDE);
    }

    #[test]
    fn test_incircle_unoriented_matches_oriented() {
        let (a, b, c) = (p(0.0, 0.0), p(2.0, 0.0), p(1.0, 2.0));
        let inside = p(1.0, 0.5);
        assert_eq!(
            incircle_unoriented(&a, &c, &b, &inside),
            Some(incircle(&a, &b, &c, &inside))
        );
        assert_eq!(
            incircle_unoriented(&a, &b, &p(4.0, 0.0), &inside),
            None,
            "degenerate triangles have no circumcircle"
        );
    }

    #[test]
    fn test_circumcenter_and_radius() {
        let center = circumcenter(&p(1.0, 0.0), &p(1.0, 1.0), &p(0.0, 1.0)).unwrap();
        assert_relative_eq!(center.x(), 0.5, epsilon = 1e-15);
        assert_relative_eq!(center.y(), 0.5, epsilon = 1e-15);

        let h = 3.0_f64.sqrt() / 2.0;
        let radius = circumradius(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.5, h)).unwrap();
        assert_relative_eq!(radius, 1.0 / 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_circumcenter_degenerate() {
        let err = circumcenter(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)).unwrap_err();
        assert!(matches!(err, CircumcenterError::DegenerateTriangle { .. }));
        assert!(err.to_string().contains("collinear"));
    }

    #[test]
    fn test_signed_area2() {
        assert_relative_eq!(signed_area2(&p(0.0, 0.0), &p(2.0, 0.0), &p(0.0, 2.0)), 4.0);
        assert_relative_eq!(signed_area2(&p(0.0, 0.0), &p(0.0, 2.0), &p(2.0, 0.0)), -4.0);
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(Orientation::POSITIVE.to_string(), "POSITIVE");
        assert_eq!(InSphere::BOUNDARY.to_string(), "BOUNDARY");
    }
}
