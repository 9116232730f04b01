//! Point deduplication utilities.

use crate::core::collections::{FastHashMap, HashGridIndex, fast_hash_map_with_capacity};
use crate::geometry::point::Point;

/// Sorts points lexicographically by `(x, y)` and normalizes `-0.0` to `0.0`.
///
/// Normalizing before sorting keeps `(-0.0, y)` and `(0.0, y)` adjacent, so later
/// deduplication sees them as one point.
///
/// # Examples
///
/// ```
/// use voronoi_lattice::core::util::sort_points;
/// use voronoi_lattice::geometry::point::Point;
///
/// let mut points = vec![Point::new([1.0, 0.0]), Point::new([-0.0, 2.0])];
/// sort_points(&mut points);
/// assert_eq!(points[0], Point::new([0.0, 2.0]));
/// assert!(points[0].x().is_sign_positive());
/// ```
pub fn sort_points(points: &mut [Point]) {
    for point in points.iter_mut() {
        *point = point.normalize_signed_zero();
    }
    points.sort_unstable();
}

/// Removes exact coordinate duplicates, keeping the first occurrence.
///
/// Equality is [`Point`]'s `OrderedFloat` equality, so NaN matches NaN and `+0.0`
/// matches `-0.0`. The relative order of the kept points is unchanged.
///
/// # Complexity
///
/// O(n) expected, using a hash set of the points seen so far.
///
/// # Examples
///
/// ```
/// use voronoi_lattice::core::util::dedup_points_exact;
/// use voronoi_lattice::geometry::point::Point;
///
/// let points = vec![
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 1.0]),
///     Point::new([-0.0, 0.0]),
/// ];
/// assert_eq!(dedup_points_exact(points).len(), 2);
/// ```
#[must_use]
pub fn dedup_points_exact(points: Vec<Point>) -> Vec<Point> {
    let mut seen = crate::core::collections::fast_hash_set_with_capacity(points.len());
    points.into_iter().filter(|p| seen.insert(*p)).collect()
}

/// Removes points closer than `epsilon` to an already-kept point.
///
/// A point is dropped when its Euclidean distance to some kept point is strictly
/// less than `epsilon`; the first occurrence of each cluster is kept. A negative
/// or zero `epsilon` drops nothing.
///
/// # Complexity
///
/// O(n) expected through a spatial hash grid with cell size `epsilon`; falls back to
/// an O(n²) scan once the grid cannot key a point (huge coordinates).
///
/// # Examples
///
/// ```
/// use voronoi_lattice::core::util::dedup_points_epsilon;
/// use voronoi_lattice::geometry::point::Point;
///
/// let points = vec![
///     Point::new([0.0, 0.0]),
///     Point::new([1e-11, 1e-11]),
///     Point::new([1.0, 1.0]),
/// ];
/// let unique = dedup_points_epsilon(points, 1e-10);
/// assert_eq!(unique.len(), 2);
/// ```
#[must_use]
pub fn dedup_points_epsilon(points: Vec<Point>, epsilon: f64) -> Vec<Point> {
    if epsilon.is_nan() || epsilon <= 0.0 {
        return points;
    }

    let mut grid: HashGridIndex = HashGridIndex::new(epsilon);
    let mut unique: Vec<Point> = Vec::with_capacity(points.len());

    for p in points {
        let mut close = false;
        let used = grid.for_each_candidate(&p, |i| {
            close = within_epsilon(&p, &unique[i], epsilon);
            !close
        });
        if !used {
            close = unique.iter().any(|u| within_epsilon(&p, u, epsilon));
        }
        if !close {
            grid.insert(unique.len(), &p);
            unique.push(p);
        }
    }

    unique
}

/// Finds a pair of points closer than `epsilon` (or exactly equal), if any.
///
/// Returns `(first, second)` with `first < second`, where `second` is the smallest
/// index that has a close predecessor and `first` is its smallest such predecessor.
/// Used to reject coincident generating points before triangulating.
///
/// # Complexity
///
/// O(n) expected through a spatial hash grid with cell size `epsilon`; falls back to
/// an O(n²) scan when the grid cannot key the input (zero tolerance, huge coordinates).
///
/// # Examples
///
/// ```
/// use voronoi_lattice::core::util::find_coincident_pair;
/// use voronoi_lattice::geometry::point::Point;
///
/// let points = [
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([1.0, 1e-14]),
/// ];
/// assert_eq!(find_coincident_pair(&points, 1e-12), Some((1, 2)));
/// ```
#[must_use]
pub fn find_coincident_pair(points: &[Point], epsilon: f64) -> Option<(usize, usize)> {
    let mut grid: HashGridIndex = HashGridIndex::new(epsilon);
    let mut exact: FastHashMap<Point, usize> = fast_hash_map_with_capacity(points.len());

    for (second, p) in points.iter().enumerate() {
        if let Some(&first) = exact.get(p) {
            return Some((first, second));
        }

        let mut first: Option<usize> = None;
        let mut consider = |i: usize| {
            if within_epsilon(p, &points[i], epsilon) {
                first = Some(first.map_or(i, |f| f.min(i)));
            }
        };
        let used = grid.for_each_candidate(p, |i| {
            consider(i);
            true
        });
        if !used {
            (0..second).for_each(&mut consider);
        }
        if let Some(first) = first {
            return Some((first, second));
        }

        exact.insert(*p, second);
        grid.insert(second, p);
    }
    None
}

/// Returns true if the distance between `a` and `b` is strictly less than `epsilon`.
#[inline]
fn within_epsilon(a: &Point, b: &Point, epsilon: f64) -> bool {
    a.distance_squared(b) < epsilon * epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new([x, y])
    }

    #[test]
    fn test_sort_points_normalizes_signed_zero() {
        let mut points = vec![p(0.0, 1.0), p(-0.0, -1.0), p(-1.0, 0.0), p(0.0, -0.0)];
        sort_points(&mut points);
        assert_eq!(
            points,
            vec![p(-1.0, 0.0), p(0.0, -1.0), p(0.0, 0.0), p(0.0, 1.0)]
        );
        assert!(
            points[1].x().is_sign_positive() && points[2].y().is_sign_positive(),
            "negative zero must not survive sorting"
        );
    }

    #[test]
    fn test_dedup_points_exact() {
        let unique = dedup_points_exact(vec![p(0.0, 0.0), p(0.0, 0.0), p(1.0, 1.0)]);
        assert_eq!(unique, vec![p(0.0, 0.0), p(1.0, 1.0)]);

        // NaN equals NaN under OrderedFloat semantics
        let unique = dedup_points_exact(vec![p(f64::NAN, 0.0), p(f64::NAN, 0.0)]);
        assert_eq!(unique.len(), 1);
    }

    #[test]
    fn test_dedup_points_epsilon_boundary() {
        // Distance exactly epsilon is kept (strict < epsilon)
        let unique = dedup_points_epsilon(vec![p(0.0, 0.0), p(0.5, 0.0), p(0.25, 0.0)], 0.5);
        assert_eq!(unique, vec![p(0.0, 0.0), p(0.5, 0.0)]);
    }

    #[test]
    fn test_dedup_points_epsilon_keeps_first_occurrence() {
        let unique = dedup_points_epsilon(vec![p(1e-13, 0.0), p(0.0, 0.0)], 1e-12);
        assert_eq!(unique, vec![p(1e-13, 0.0)]);
    }

    #[test]
    fn test_dedup_points_epsilon_negative_is_noop() {
        let points = vec![p(0.0, 0.0), p(1e-14, 0.0)];
        assert_eq!(dedup_points_epsilon(points.clone(), -1.0), points);
    }

    /// Reference result: keep a point unless an earlier kept point is within `epsilon`.
    fn dedup_by_scan(points: &[Point], epsilon: f64) -> Vec<Point> {
        let mut unique: Vec<Point> = Vec::new();
        for q in points {
            if !unique.iter().any(|u| within_epsilon(q, u, epsilon)) {
                unique.push(*q);
            }
        }
        unique
    }

    #[test]
    fn test_dedup_points_epsilon_matches_linear_scan() {
        // Scattered points on a coarse jittered grid, with clusters straddling cell edges.
        let points: Vec<Point> = (0..400_u32)
            .map(|i| {
                let x = f64::from((i * 37) % 101) * 0.013;
                let y = f64::from((i * 53) % 89) * 0.011;
                p(x, y)
            })
            .collect();
        for epsilon in [0.005, 0.02, 0.05, 0.3] {
            assert_eq!(
                dedup_points_epsilon(points.clone(), epsilon),
                dedup_by_scan(&points, epsilon),
                "epsilon = {epsilon}"
            );
        }
    }

    #[test]
    fn test_dedup_points_epsilon_unkeyable_coordinates() {
        // Cell coordinates overflow, so the scan fallback has to catch the duplicate.
        let points = vec![p(1e300, 0.0), p(0.0, 0.0), p(1e300, 0.0), p(1e-11, 0.0)];
        assert_eq!(
            dedup_points_epsilon(points, 1e-10),
            vec![p(1e300, 0.0), p(0.0, 0.0)]
        );
    }

    #[test]
    fn test_find_coincident_pair() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(1.0, 1e-13)];
        assert_eq!(find_coincident_pair(&points, 1e-12), Some((1, 3)));
        assert_eq!(find_coincident_pair(&points[..3], 1e-12), None);
        assert_eq!(
            find_coincident_pair(&[p(0.0, 0.0), p(-0.0, 0.0)], 1e-12),
            Some((0, 1)),
            "signed zeros are the same point"
        );
        assert_eq!(
            find_coincident_pair(&[p(3.0, 3.0), p(3.0, 3.0)], 0.0),
            Some((0, 1)),
            "exact duplicates are coincident even with zero tolerance"
        );
    }
}
