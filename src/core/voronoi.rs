//! Voronoi diagram of a planar point set, computed as the dual of its Delaunay
//! triangulation.
//!
//! Every finite Delaunay triangle contributes its circumcenter as a Voronoi vertex. Every
//! Delaunay edge contributes a ridge between the cells of its two endpoints:
//!
//! - an interior edge (two triangles) becomes a finite ridge joining the two
//!   circumcenters
//! - a hull edge (one triangle) becomes an unbounded ridge `[None, Some(v)]` running from
//!   the circumcenter to infinity
//!
//! Circumcenters closer than [`VoronoiConfig::vertex_merge_tolerance`] are merged into
//! one vertex, and ridges whose two ends merge are dropped. Four cocircular points (a
//! square) therefore produce one vertex and four unbounded ridges.
//!
//! # Determinism
//!
//! For a fixed input slice the output is fully deterministic: triangles are visited in
//! sorted order, vertices are numbered by first appearance, and ridges are sorted by
//! their generating-point pair.
//!
//! # Examples
//!
//! ```rust
//! use voronoi_lattice::core::voronoi::build;
//! use voronoi_lattice::geometry::point::Point;
//!
//! let square = [
//!     Point::new([0.0, 0.0]),
//!     Point::new([1.0, 0.0]),
//!     Point::new([0.0, 1.0]),
//!     Point::new([1.0, 1.0]),
//! ];
//! let diagram = build(&square).unwrap();
//! assert_eq!(diagram.vertices(), &[Point::new([0.5, 0.5])]);
//! assert_eq!(diagram.ridges().len(), 4);
//! assert!(diagram.ridges().iter().all(|r| r.vertices == [None, Some(0)]));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::collections::HashGridIndex;
use crate::core::triangulation::{Triangulation, TriangulationError};
use crate::core::util::find_coincident_pair;
use crate::geometry::point::{Point, PointValidationError};
use crate::geometry::predicates::{CircumcenterError, circumcenter};

/// Minimum number of generating points for a planar Voronoi diagram.
pub const MIN_POINTS: usize = 4;

/// Default distance below which two generating points are coincident.
pub const DEFAULT_DUPLICATE_TOLERANCE: f64 = 1e-12;

/// Default distance below which two circumcenters become one Voronoi vertex.
pub const DEFAULT_VERTEX_MERGE_TOLERANCE: f64 = 1e-10;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Input rejected by [`VoronoiBuilder::build`].
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DegenerateInputError {
    /// Too few points to form a planar diagram.
    #[error("Voronoi diagram needs at least {required} points, got {actual}")]
    InsufficientPoints {
        /// Number of points supplied.
        actual: usize,
        /// Minimum number of points.
        required: usize,
    },
    /// A point has a NaN or infinite coordinate.
    #[error("Point {point_index} is not finite: {source}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        point_index: usize,
        /// The underlying validation error.
        source: PointValidationError,
    },
    /// Two points coincide within the duplicate tolerance.
    #[error("Points {first} and {second} coincide")]
    CoincidentPoints {
        /// Index of the earlier point.
        first: usize,
        /// Index of the later point.
        second: usize,
    },
    /// All points lie on a single line.
    #[error("All {count} points are collinear")]
    Collinear {
        /// Number of points supplied.
        count: usize,
    },
    /// The Delaunay triangulation could not be built.
    #[error("Triangulation failed: {0}")]
    Triangulation(#[from] TriangulationError),
    /// A Delaunay triangle had no finite circumcenter.
    #[error("Voronoi vertex computation failed: {0}")]
    Circumcenter(#[from] CircumcenterError),
}

/// Structural problems found by [`VoronoiDiagram::validate`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum VoronoiValidationError {
    /// A ridge refers to a generating point that does not exist.
    #[error("Ridge {ridge} refers to point {index}, but there are only {len} points")]
    PointIndexOutOfRange {
        /// Ridge position.
        ridge: usize,
        /// Offending index.
        index: usize,
        /// Number of points.
        len: usize,
    },
    /// A ridge refers to a Voronoi vertex that does not exist.
    #[error("Ridge {ridge} refers to vertex {index}, but there are only {len} vertices")]
    VertexIndexOutOfRange {
        /// Ridge position.
        ridge: usize,
        /// Offending index.
        index: usize,
        /// Number of vertices.
        len: usize,
    },
    /// A ridge separates a cell from itself.
    #[error("Ridge {ridge} separates point {point} from itself")]
    SelfRidge {
        /// Ridge position.
        ridge: usize,
        /// The repeated point index.
        point: usize,
    },
    /// A finite ridge starts and ends at the same vertex.
    #[error("Ridge {ridge} has zero length (both ends are vertex {vertex})")]
    ZeroLengthRidge {
        /// Ridge position.
        ridge: usize,
        /// The repeated vertex index.
        vertex: usize,
    },
    /// A ridge has no finite endpoint.
    #[error("Ridge {ridge} has no finite vertex")]
    NoFiniteVertex {
        /// Ridge position.
        ridge: usize,
    },
    /// A generating point or vertex has a NaN or infinite coordinate.
    #[error("{kind} {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// `"point"` or `"vertex"`.
        kind: &'static str,
        /// Offending index.
        index: usize,
    },
    /// Two generating points coincide within the duplicate tolerance.
    #[error("Points {first} and {second} coincide")]
    CoincidentPoints {
        /// Index of the earlier point.
        first: usize,
        /// Index of the later point.
        second: usize,
    },
}

// =============================================================================
// DATA MODEL
// =============================================================================

/// One edge of the Voronoi diagram.
///
/// `points` is the pair of generating points whose cells the ridge separates, in
/// ascending order. `vertices` holds the two endpoints as Voronoi vertex indices, with
/// `None` standing for the point at infinity; `None` sorts first, so an unbounded ridge
/// is always `[None, Some(v)]` and a finite one is `[Some(a), Some(b)]` with `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ridge {
    /// Generating-point pair.
    pub points: [usize; 2],
    /// Endpoint vertex indices, `None` at infinity.
    pub vertices: [Option<usize>; 2],
}

impl Ridge {
    /// Creates a ridge, ordering both pairs canonically.
    #[must_use]
    pub fn new(points: [usize; 2], vertices: [Option<usize>; 2]) -> Self {
        let mut points = points;
        let mut vertices = vertices;
        points.sort_unstable();
        vertices.sort_unstable();
        Self { points, vertices }
    }

    /// Returns `true` if both endpoints are finite vertices.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.vertices[0].is_some() && self.vertices[1].is_some()
    }

    /// Endpoint indices with `-1` for the point at infinity.
    #[must_use]
    pub fn vertex_row(&self) -> [isize; 2] {
        self.vertices
            .map(|v| v.map_or(-1, |index| isize::try_from(index).unwrap_or(isize::MAX)))
    }
}

/// Voronoi diagram of a set of generating points.
///
/// Ridges are stored once; the parallel `ridge_points` / `ridge_vertices` tables are
/// derived on demand, so they always have the same length.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VoronoiDiagram {
    points: Vec<Point>,
    vertices: Vec<Point>,
    ridges: Vec<Ridge>,
}

impl VoronoiDiagram {
    /// Assembles a diagram from its parts and validates it.
    ///
    /// # Errors
    ///
    /// Returns the first [`VoronoiValidationError`] found. See [`Self::validate`].
    pub fn from_parts(
        points: Vec<Point>,
        vertices: Vec<Point>,
        ridges: Vec<Ridge>,
    ) -> Result<Self, VoronoiValidationError> {
        let diagram = Self {
            points,
            vertices,
            ridges,
        };
        diagram.validate()?;
        Ok(diagram)
    }

    /// Generating points, in input order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Voronoi vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Ridges, sorted by generating-point pair.
    #[must_use]
    pub fn ridges(&self) -> &[Ridge] {
        &self.ridges
    }

    /// The generating-point pair of every ridge.
    #[must_use]
    pub fn ridge_points(&self) -> Vec<[usize; 2]> {
        self.ridges.iter().map(|r| r.points).collect()
    }

    /// The endpoint vertices of every ridge, with `-1` for the point at infinity.
    #[must_use]
    pub fn ridge_vertices(&self) -> Vec<[isize; 2]> {
        self.ridges.iter().map(Ridge::vertex_row).collect()
    }

    /// Line segments of the finite ridges, in ridge order.
    ///
    /// Unbounded ridges are skipped; this is the set of edges a downstream sketch
    /// draws.
    #[must_use]
    pub fn finite_segments(&self) -> Vec<(Point, Point)> {
        self.ridges
            .iter()
            .filter_map(|r| match r.vertices {
                [Some(a), Some(b)] => Some((self.vertices[a], self.vertices[b])),
                _ => None,
            })
            .collect()
    }

    /// Ridges bounding the cell of generating point `point`.
    pub fn cell_ridges(&self, point: usize) -> impl Iterator<Item = &Ridge> + '_ {
        self.ridges
            .iter()
            .filter(move |r| r.points.contains(&point))
    }

    /// Returns `true` if the cell of `point` is a bounded polygon.
    ///
    /// Cells of hull points extend to infinity.
    #[must_use]
    pub fn is_cell_bounded(&self, point: usize) -> bool {
        let mut any = false;
        for ridge in self.cell_ridges(point) {
            if !ridge.is_finite() {
                return false;
            }
            any = true;
        }
        any
    }

    /// Checks the structural invariants of the diagram.
    ///
    /// - every ridge point index is `< points.len()` and the pair is distinct
    /// - every finite ridge vertex index is `< vertices.len()`
    /// - every ridge has a finite vertex, and a finite ridge has two distinct vertices
    /// - all coordinates are finite
    /// - no two generating points coincide within [`DEFAULT_DUPLICATE_TOLERANCE`]
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), VoronoiValidationError> {
        for (kind, set) in [("point", &self.points), ("vertex", &self.vertices)] {
            if let Some(index) = set.iter().position(|p| !p.is_finite()) {
                return Err(VoronoiValidationError::NonFiniteCoordinate { kind, index });
            }
        }

        for (ridge, r) in self.ridges.iter().enumerate() {
            for &index in &r.points {
                if index >= self.points.len() {
                    return Err(VoronoiValidationError::PointIndexOutOfRange {
                        ridge,
                        index,
                        len: self.points.len(),
                    });
                }
            }
            if r.points[0] == r.points[1] {
                return Err(VoronoiValidationError::SelfRidge {
                    ridge,
                    point: r.points[0],
                });
            }
            for index in r.vertices.iter().flatten().copied() {
                if index >= self.vertices.len() {
                    return Err(VoronoiValidationError::VertexIndexOutOfRange {
                        ridge,
                        index,
                        len: self.vertices.len(),
                    });
                }
            }
            match r.vertices {
                [None, None] => return Err(VoronoiValidationError::NoFiniteVertex { ridge }),
                [Some(a), Some(b)] if a == b => {
                    return Err(VoronoiValidationError::ZeroLengthRidge { ridge, vertex: a });
                }
                _ => {}
            }
        }

        if let Some((first, second)) = find_coincident_pair(&self.points, DEFAULT_DUPLICATE_TOLERANCE)
        {
            return Err(VoronoiValidationError::CoincidentPoints { first, second });
        }
        Ok(())
    }

    /// Returns `true` if [`Self::validate`] succeeds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Tolerances used while building a diagram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiConfig {
    /// Generating points closer than this are rejected as coincident.
    pub duplicate_tolerance: f64,
    /// Circumcenters closer than this become one vertex.
    pub vertex_merge_tolerance: f64,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self {
            duplicate_tolerance: DEFAULT_DUPLICATE_TOLERANCE,
            vertex_merge_tolerance: DEFAULT_VERTEX_MERGE_TOLERANCE,
        }
    }
}

/// Builds [`VoronoiDiagram`]s with a fixed [`VoronoiConfig`].
#[derive(Clone, Debug, Default)]
pub struct VoronoiBuilder {
    config: VoronoiConfig,
}

impl VoronoiBuilder {
    /// Creates a builder with the given tolerances.
    #[must_use]
    pub const fn new(config: VoronoiConfig) -> Self {
        Self { config }
    }

    /// The tolerances in use.
    #[must_use]
    pub const fn config(&self) -> &VoronoiConfig {
        &self.config
    }

    /// Computes the Voronoi diagram of `points`.
    ///
    /// Point indices in the result refer to positions in `points`.
    ///
    /// # Errors
    ///
    /// Returns a [`DegenerateInputError`] for fewer than [`MIN_POINTS`] points, a
    /// non-finite coordinate, two coincident points, an all-collinear input, or a
    /// triangulation failure.
    pub fn build(&self, points: &[Point]) -> Result<VoronoiDiagram, DegenerateInputError> {
        if points.len() < MIN_POINTS {
            return Err(DegenerateInputError::InsufficientPoints {
                actual: points.len(),
                required: MIN_POINTS,
            });
        }
        for (point_index, p) in points.iter().enumerate() {
            p.validate()
                .map_err(|source| DegenerateInputError::NonFiniteCoordinate {
                    point_index,
                    source,
                })?;
        }
        if let Some((first, second)) =
            find_coincident_pair(points, self.config.duplicate_tolerance.max(0.0))
        {
            return Err(DegenerateInputError::CoincidentPoints { first, second });
        }

        let triangulation = Triangulation::new(points).map_err(|err| match err {
            TriangulationError::Collinear { count } => DegenerateInputError::Collinear { count },
            other => DegenerateInputError::Triangulation(other),
        })?;

        let (vertices, triangle_vertex) = self.circumcenter_vertices(&triangulation)?;
        let (ridges, collapsed) = dual_ridges(&triangulation, &triangle_vertex)?;

        if collapsed > 0 {
            tracing::warn!(
                collapsed,
                "dropped zero-length ridges between merged circumcenters (cocircular points)"
            );
        }
        tracing::debug!(
            points = points.len(),
            triangles = triangulation.number_of_triangles(),
            vertices = vertices.len(),
            ridges = ridges.len(),
            "built Voronoi diagram"
        );

        Ok(VoronoiDiagram {
            points: points.to_vec(),
            vertices,
            ridges,
        })
    }

    /// Computes one circumcenter per triangle and merges those within tolerance.
    ///
    /// Returns the vertex list and, for every triangle, its vertex index.
    fn circumcenter_vertices(
        &self,
        triangulation: &Triangulation,
    ) -> Result<(Vec<Point>, Vec<usize>), DegenerateInputError> {
        let tolerance = self.config.vertex_merge_tolerance.max(0.0);
        let points = triangulation.points();
        let triangles = triangulation.triangles();

        let mut vertices: Vec<Point> = Vec::with_capacity(triangles.len());
        let mut triangle_vertex = Vec::with_capacity(triangles.len());
        let mut grid: HashGridIndex = HashGridIndex::new(tolerance);

        for t in triangles {
            let center = circumcenter(&points[t[0]], &points[t[1]], &points[t[2]])?;
            let close = |v: &Point| *v == center || v.distance_squared(&center) < tolerance * tolerance;

            let mut existing: Option<usize> = None;
            let mut consider = |index: usize| {
                if close(&vertices[index]) {
                    existing = Some(existing.map_or(index, |e| e.min(index)));
                }
            };
            if !grid.for_each_candidate(&center, |index| {
                consider(index);
                true
            }) {
                (0..vertices.len()).for_each(&mut consider);
            }

            let index = existing.unwrap_or_else(|| {
                vertices.push(center);
                grid.insert(vertices.len() - 1, &center);
                vertices.len() - 1
            });
            triangle_vertex.push(index);
        }
        Ok((vertices, triangle_vertex))
    }
}

/// Computes the Voronoi diagram of `points` with default tolerances.
///
/// # Errors
///
/// See [`VoronoiBuilder::build`].
pub fn build(points: &[Point]) -> Result<VoronoiDiagram, DegenerateInputError> {
    VoronoiBuilder::default().build(points)
}

/// Turns every Delaunay edge into a ridge. Returns the sorted ridges and the number of
/// interior edges dropped because both circumcenters merged.
fn dual_ridges(
    triangulation: &Triangulation,
    triangle_vertex: &[usize],
) -> Result<(Vec<Ridge>, usize), TriangulationError> {
    let edges = triangulation.edge_to_triangles();
    let mut ridges = Vec::with_capacity(edges.len());
    let mut collapsed = 0;

    for (edge, incident) in &edges {
        match incident.as_slice() {
            [only] => ridges.push(Ridge::new(
                edge.to_array(),
                [None, Some(triangle_vertex[*only])],
            )),
            [left, right] => {
                let (a, b) = (triangle_vertex[*left], triangle_vertex[*right]);
                if a == b {
                    collapsed += 1;
                } else {
                    ridges.push(Ridge::new(edge.to_array(), [Some(a), Some(b)]));
                }
            }
            _ => {
                return Err(TriangulationError::NonManifoldEdge {
                    edge: edge.to_array(),
                    count: incident.len(),
                });
            }
        }
    }

    ridges.sort_unstable();
    Ok((ridges, collapsed))
}

// =============================================================================
// TESTS
// =============================================================================
