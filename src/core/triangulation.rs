//! Incremental Bowyer-Watson Delaunay triangulation in the plane.
//!
//! The triangulation is built without a super-triangle. Hull edges are closed by a
//! symbolic vertex at infinity ([`INFINITE_VERTEX`]), so every edge always has two
//! incident triangles during construction:
//!
//! 1. **Initialization**: pick a maximal-area triangle from the input, orient it
//!    counter-clockwise and add the three infinite triangles across its edges.
//! 2. **Incremental insertion**: for each remaining point, in input order,
//!    - find the conflict region (finite triangles whose circumcircle strictly contains
//!      the point, and infinite triangles whose hull edge the point can see)
//!    - extract the cavity boundary (directed edges not shared by two conflict triangles)
//!    - fill the cavity with a fan of new triangles around the point
//! 3. **Finalization**: drop the infinite triangles, canonicalize and sort the rest.
//!
//! Cocircular configurations (`BOUNDARY` incircle results) do not conflict, so the
//! earliest inserted diagonal is kept for a square.
//!
//! # References
//!
//! - **Bowyer, A.** "Computing Dirichlet tessellations." *The Computer Journal* 24.2 (1981): 162-166.
//! - **Watson, D.F.** "Computing the n-dimensional Delaunay tessellation with application to
//!   Voronoi polytopes." *The Computer Journal* 24.2 (1981): 167-172.
//! - **CGAL Editorial Board.** *CGAL User and Reference Manual*, 2D Triangulations
//!   (infinite vertex representation).

use thiserror::Error;

use crate::core::collections::{
    EdgeToTrianglesMap, FastHashSet, fast_hash_map_with_capacity, fast_hash_set_with_capacity,
};
use crate::core::edge::EdgeKey;
use crate::geometry::point::Point;
use crate::geometry::predicates::{InSphere, Orientation, incircle, orientation, signed_area2};

/// Index of the symbolic vertex at infinity.
pub const INFINITE_VERTEX: usize = usize::MAX;

/// A triangle as three point indices.
///
/// Finite triangles are counter-clockwise. Infinite triangles keep
/// [`INFINITE_VERTEX`] in the last slot.
pub type Triangle = [usize; 3];

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while building or validating a triangulation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TriangulationError {
    /// Fewer than three points were supplied.
    #[error("Triangulation needs at least 3 points, got {actual}")]
    InsufficientPoints {
        /// Number of points supplied.
        actual: usize,
    },
    /// Every point lies on one line, so no triangle exists.
    #[error("All {count} points are collinear")]
    Collinear {
        /// Number of points supplied.
        count: usize,
    },
    /// A point conflicted with no triangle (it sits on the circumcircle of everything
    /// around it within tolerance).
    #[error("Point {point_index} conflicts with no triangle")]
    EmptyConflictRegion {
        /// Index of the point being inserted.
        point_index: usize,
    },
    /// The conflict region was not star-shaped from the inserted point.
    #[error("Cavity for point {point_index} is not star-shaped: {details}")]
    CavityNotStarShaped {
        /// Index of the point being inserted.
        point_index: usize,
        /// What went wrong.
        details: String,
    },
    /// An edge is shared by more than two triangles.
    #[error("Edge {edge:?} is shared by {count} triangles")]
    NonManifoldEdge {
        /// The edge endpoints.
        edge: [usize; 2],
        /// Number of incident triangles.
        count: usize,
    },
    /// A point lies strictly inside the circumcircle of a triangle.
    #[error("Delaunay violation: point {point_index} is inside the circumcircle of {triangle:?}")]
    DelaunayViolation {
        /// The offending triangle.
        triangle: Triangle,
        /// Index of the encroaching point.
        point_index: usize,
    },
}

// =============================================================================
// TRIANGULATION
// =============================================================================

/// Delaunay triangulation of a planar point set.
///
/// Point indices refer to positions in [`Triangulation::points`], which is a copy of the
/// input slice in its original order.
///
/// # Examples
///
/// ```rust
/// use voronoi_lattice::core::triangulation::Triangulation;
/// use voronoi_lattice::geometry::point::Point;
///
/// let points = [
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([0.0, 1.0]),
///     Point::new([1.0, 1.0]),
/// ];
/// let tri = Triangulation::new(&points).unwrap();
/// assert_eq!(tri.number_of_triangles(), 2);
/// assert_eq!(tri.hull_edges().len(), 4);
/// assert!(tri.is_delaunay());
/// ```
#[derive(Clone, Debug)]
pub struct Triangulation {
    points: Vec<Point>,
    triangles: Vec<Triangle>,
}

impl Triangulation {
    /// Builds the Delaunay triangulation of `points`.
    ///
    /// Coordinates are assumed finite and pairwise distinct; callers validate that
    /// before triangulating.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::InsufficientPoints`] for fewer than three points,
    /// [`TriangulationError::Collinear`] when no non-degenerate triangle exists, and an
    /// insertion error if a cavity cannot be re-triangulated.
    pub fn new(points: &[Point]) -> Result<Self, TriangulationError> {
        if points.len() < 3 {
            return Err(TriangulationError::InsufficientPoints {
                actual: points.len(),
            });
        }

        let seed = initial_triangle(points)?;
        let mut triangles: Vec<Triangle> = vec![
            seed,
            [seed[1], seed[0], INFINITE_VERTEX],
            [seed[2], seed[1], INFINITE_VERTEX],
            [seed[0], seed[2], INFINITE_VERTEX],
        ];

        for point_index in (0..points.len()).filter(|i| !seed.contains(i)) {
            insert_point(points, &mut triangles, point_index)?;
        }

        let mut finite: Vec<Triangle> = triangles
            .into_iter()
            .filter(|t| t[2] != INFINITE_VERTEX)
            .map(canonical_rotation)
            .collect();
        finite.sort_unstable();

        tracing::debug!(
            points = points.len(),
            triangles = finite.len(),
            "built Delaunay triangulation"
        );

        Ok(Self {
            points: points.to_vec(),
            triangles: finite,
        })
    }

    /// The input points, in input order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Finite triangles, counter-clockwise, rotated so the smallest index comes first,
    /// and sorted.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of finite triangles.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Maps every undirected edge to the indices of its incident finite triangles.
    ///
    /// Interior edges map to two triangles, hull edges to one.
    #[must_use]
    pub fn edge_to_triangles(&self) -> EdgeToTrianglesMap {
        let mut map: EdgeToTrianglesMap = fast_hash_map_with_capacity(self.triangles.len() * 2);
        for (index, t) in self.triangles.iter().enumerate() {
            for (a, b) in directed_edges(t) {
                map.entry(EdgeKey::new(a, b)).or_default().push(index);
            }
        }
        map
    }

    /// Hull edges (edges with exactly one incident triangle), sorted.
    #[must_use]
    pub fn hull_edges(&self) -> Vec<EdgeKey> {
        let mut hull: Vec<EdgeKey> = self
            .edge_to_triangles()
            .into_iter()
            .filter_map(|(edge, incident)| (incident.len() == 1).then_some(edge))
            .collect();
        hull.sort_unstable();
        hull
    }

    /// Checks the empty-circumcircle property for every triangle.
    ///
    /// This is an O(n·t) scan intended for tests and debugging.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::DelaunayViolation`] for the first point found
    /// strictly inside a circumcircle.
    pub fn validate_delaunay(&self) -> Result<(), TriangulationError> {
        for t in &self.triangles {
            let [a, b, c] = t.map(|i| self.points[i]);
            for (point_index, p) in self.points.iter().enumerate() {
                if t.contains(&point_index) {
                    continue;
                }
                if incircle(&a, &b, &c, p) == InSphere::INSIDE {
                    return Err(TriangulationError::DelaunayViolation {
                        triangle: *t,
                        point_index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns `true` if [`Self::validate_delaunay`] succeeds.
    #[must_use]
    pub fn is_delaunay(&self) -> bool {
        self.validate_delaunay().is_ok()
    }
}

// =============================================================================
// CONSTRUCTION HELPERS
// =============================================================================

/// Picks a large counter-clockwise seed triangle: point 0, the point farthest from it,
/// and the point maximizing the area with those two.
fn initial_triangle(points: &[Point]) -> Result<Triangle, TriangulationError> {
    let collinear = || TriangulationError::Collinear {
        count: points.len(),
    };
    let i0 = 0;
    let p0 = points[i0];

    let i1 = (1..points.len())
        .max_by(|&a, &b| {
            p0.distance_squared(&points[a])
                .total_cmp(&p0.distance_squared(&points[b]))
        })
        .ok_or_else(collinear)?;
    let p1 = points[i1];

    let i2 = (1..points.len())
        .filter(|&k| k != i1)
        .max_by(|&a, &b| {
            signed_area2(&p0, &p1, &points[a])
                .abs()
                .total_cmp(&signed_area2(&p0, &p1, &points[b]).abs())
        })
        .ok_or_else(collinear)?;

    match orientation(&p0, &p1, &points[i2]) {
        Orientation::POSITIVE => Ok([i0, i1, i2]),
        Orientation::NEGATIVE => Ok([i0, i2, i1]),
        Orientation::DEGENERATE => Err(collinear()),
    }
}

/// Inserts `points[point_index]` into `triangles`, re-triangulating its cavity.
fn insert_point(
    points: &[Point],
    triangles: &mut Vec<Triangle>,
    point_index: usize,
) -> Result<(), TriangulationError> {
    let p = points[point_index];
    let (conflict, kept): (Vec<Triangle>, Vec<Triangle>) = std::mem::take(triangles)
        .into_iter()
        .partition(|t| in_conflict(points, t, &p));

    if conflict.is_empty() {
        *triangles = kept;
        return Err(TriangulationError::EmptyConflictRegion { point_index });
    }

    let boundary = extract_cavity_boundary(&conflict, point_index)?;
    *triangles = kept;
    fill_cavity(points, triangles, &boundary, point_index)
}

/// Returns `true` if triangle `t` must be removed when `p` is inserted.
fn in_conflict(points: &[Point], t: &Triangle, p: &Point) -> bool {
    if t[2] == INFINITE_VERTEX {
        let (u, v) = (&points[t[0]], &points[t[1]]);
        match orientation(u, v, p) {
            Orientation::POSITIVE => true,
            Orientation::NEGATIVE => false,
            Orientation::DEGENERATE => strictly_inside_segment(u, v, p),
        }
    } else {
        incircle(&points[t[0]], &points[t[1]], &points[t[2]], p) == InSphere::INSIDE
    }
}

/// For `p` collinear with `u` and `v`, tests whether it lies strictly between them.
fn strictly_inside_segment(u: &Point, v: &Point, p: &Point) -> bool {
    let (ex, ey) = (v.x() - u.x(), v.y() - u.y());
    let projection = ex.mul_add(p.x() - u.x(), ey * (p.y() - u.y()));
    projection > 0.0 && projection < ex.mul_add(ex, ey * ey)
}

/// Directed edges of the conflict region that are not matched by their reverse.
///
/// The boundary of a star-shaped cavity is a single cycle, so every vertex starts
/// exactly one boundary edge.
fn extract_cavity_boundary(
    conflict: &[Triangle],
    point_index: usize,
) -> Result<Vec<(usize, usize)>, TriangulationError> {
    let directed: FastHashSet<(usize, usize)> =
        conflict.iter().flat_map(directed_edges).collect();

    let mut boundary = Vec::with_capacity(conflict.len() + 2);
    let mut starts = fast_hash_set_with_capacity(conflict.len() + 2);
    for (a, b) in conflict.iter().flat_map(directed_edges) {
        if directed.contains(&(b, a)) {
            continue;
        }
        if !starts.insert(a) {
            return Err(TriangulationError::CavityNotStarShaped {
                point_index,
                details: format!("vertex {a} starts more than one boundary edge"),
            });
        }
        boundary.push((a, b));
    }
    Ok(boundary)
}

/// Connects every boundary edge to the new point.
fn fill_cavity(
    points: &[Point],
    triangles: &mut Vec<Triangle>,
    boundary: &[(usize, usize)],
    point_index: usize,
) -> Result<(), TriangulationError> {
    let p = points[point_index];
    for &(a, b) in boundary {
        let triangle = infinite_last([a, b, point_index]);
        if triangle[2] != INFINITE_VERTEX {
            let o = orientation(&points[triangle[0]], &points[triangle[1]], &p);
            if o != Orientation::POSITIVE {
                return Err(TriangulationError::CavityNotStarShaped {
                    point_index,
                    details: format!("new triangle {triangle:?} is {o}"),
                });
            }
        }
        triangles.push(triangle);
    }
    Ok(())
}

/// The three directed edges of a triangle in its vertex order.
fn directed_edges(t: &Triangle) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

/// Rotates a triangle (preserving orientation) so [`INFINITE_VERTEX`], if present, is
/// last.
fn infinite_last(t: Triangle) -> Triangle {
    match t.iter().position(|&v| v == INFINITE_VERTEX) {
        Some(0) => [t[1], t[2], t[0]],
        Some(1) => [t[2], t[0], t[1]],
        _ => t,
    }
}

/// Rotates a triangle (preserving orientation) so its smallest index is first.
fn canonical_rotation(t: Triangle) -> Triangle {
    if t[1] < t[0] && t[1] < t[2] {
        [t[1], t[2], t[0]]
    } else if t[2] < t[0] && t[2] < t[1] {
        [t[2], t[0], t[1]]
    } else {
        t
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new([x, y])
    }

    fn unit_square() -> Vec<Point> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)]
    }

    #[test]
    fn test_single_triangle() {
        let tri = Triangulation::new(&[p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)]).unwrap();
        assert_eq!(tri.triangles(), &[[0, 2, 1]], "output must be counter-clockwise");
        assert_eq!(tri.hull_edges().len(), 3);
    }

    #[test]
    fn test_unit_square_has_two_triangles_and_four_hull_edges() {
        let tri = Triangulation::new(&unit_square()).unwrap();
        assert_eq!(tri.number_of_triangles(), 2);
        assert_eq!(
            tri.hull_edges(),
            vec![
                EdgeKey::new(0, 1),
                EdgeKey::new(0, 2),
                EdgeKey::new(1, 3),
                EdgeKey::new(2, 3),
            ]
        );
        assert!(tri.is_delaunay());
    }

    #[test]
    fn test_interior_point_splits_triangle() {
        let points = [p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0), p(1.0, 1.0)];
        let tri = Triangulation::new(&points).unwrap();
        assert_eq!(tri.number_of_triangles(), 3);
        assert_eq!(tri.hull_edges().len(), 3);
        let interior = tri.edge_to_triangles();
        assert_eq!(interior[&EdgeKey::new(0, 3)].len(), 2);
    }

    #[test]
    fn test_point_on_hull_edge_is_inserted() {
        let points = [p(0.0, 0.0), p(2.0, 0.0), p(1.0, 2.0), p(1.0, 0.0)];
        let tri = Triangulation::new(&points).unwrap();
        assert_eq!(tri.number_of_triangles(), 2);
        assert_eq!(tri.hull_edges().len(), 4);
        assert!(tri.is_delaunay());
    }

    #[test]
    fn test_collinear_extension_on_hull() {
        // Point 3 extends the hull edge 0-1 along its line.
        let points = [p(0.0, 0.0), p(1.0, 0.0), p(0.5, 1.0), p(2.0, 0.0)];
        let tri = Triangulation::new(&points).unwrap();
        assert!(tri.is_delaunay());
        for t in tri.triangles() {
            let [a, b, c] = t.map(|i| points[i]);
            assert_eq!(orientation(&a, &b, &c), Orientation::POSITIVE);
        }
    }

    #[test]
    fn test_euler_relation_on_grid() {
        let points: Vec<Point> = (0..5)
            .flat_map(|i| (0..4).map(move |j| p(f64::from(i), f64::from(j) * 1.5)))
            .collect();
        let tri = Triangulation::new(&points).unwrap();
        assert!(tri.is_delaunay());

        // t = 2n - 2 - h, with h counting every point on the hull boundary.
        let hull_points: FastHashSet<usize> = tri
            .hull_edges()
            .iter()
            .flat_map(|e| [e.v0(), e.v1()])
            .collect();
        assert_eq!(
            tri.number_of_triangles(),
            2 * points.len() - 2 - hull_points.len()
        );
    }

    #[test]
    fn test_triangles_are_canonical_and_sorted() {
        let points = [p(3.0, 1.0), p(0.0, 0.0), p(2.0, 3.0), p(4.0, 4.0), p(-1.0, 2.0)];
        let tri = Triangulation::new(&points).unwrap();
        for t in tri.triangles() {
            assert!(t[0] < t[1] && t[0] < t[2], "{t:?} is not canonical");
        }
        assert!(tri.triangles().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(
            Triangulation::new(&[p(0.0, 0.0), p(1.0, 0.0)]).unwrap_err(),
            TriangulationError::InsufficientPoints { actual: 2 }
        );
        assert_eq!(
            Triangulation::new(&[p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0), p(3.0, 3.0)])
                .unwrap_err(),
            TriangulationError::Collinear { count: 4 }
        );
    }

    #[test]
    fn test_rotation_helpers() {
        assert_eq!(infinite_last([INFINITE_VERTEX, 3, 4]), [3, 4, INFINITE_VERTEX]);
        assert_eq!(infinite_last([3, INFINITE_VERTEX, 4]), [4, 3, INFINITE_VERTEX]);
        assert_eq!(canonical_rotation([5, 2, 9]), [2, 9, 5]);
        assert_eq!(canonical_rotation([5, 9, 2]), [2, 5, 9]);
        assert!(strictly_inside_segment(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 0.0)));
        assert!(!strictly_inside_segment(&p(0.0, 0.0), &p(2.0, 0.0), &p(3.0, 0.0)));
    }
}
