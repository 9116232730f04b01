//! General helper utilities for point sets.

mod deduplication;

pub use deduplication::*;

use crate::geometry::point::Point;

/// Keeps the points strictly inside the open box `(-radius, radius) × (-radius, radius)`.
///
/// Points on the boundary (`|x| == radius` or `|y| == radius`) are dropped, as are
/// points with a NaN coordinate. Order is preserved.
///
/// # Examples
///
/// ```
/// use voronoi_lattice::core::util::clip_to_open_box;
/// use voronoi_lattice::geometry::point::Point;
///
/// let points = vec![
///     Point::new([0.0, 0.0]),
///     Point::new([4.0, 0.0]),
///     Point::new([-3.9, 3.9]),
/// ];
/// let kept = clip_to_open_box(points, 4.0);
/// assert_eq!(kept.len(), 2);
/// ```
#[must_use]
pub fn clip_to_open_box(points: Vec<Point>, radius: f64) -> Vec<Point> {
    points
        .into_iter()
        .filter(|p| p.x().abs() < radius && p.y().abs() < radius)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_to_open_box_excludes_boundary() {
        let points = vec![
            Point::new([3.999, -3.999]),
            Point::new([-4.0, 0.0]),
            Point::new([0.0, 4.0]),
            Point::new([f64::NAN, 0.0]),
        ];
        let kept = clip_to_open_box(points, 4.0);
        assert_eq!(kept, vec![Point::new([3.999, -3.999])]);
    }

    #[test]
    fn test_clip_to_open_box_non_positive_radius() {
        let points = vec![Point::new([0.0, 0.0])];
        assert!(clip_to_open_box(points.clone(), 0.0).is_empty());
        assert!(clip_to_open_box(points, -1.0).is_empty());
    }
}
