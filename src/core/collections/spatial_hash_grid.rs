//! Planar spatial hash grid.
//!
//! Used to find near-coincident points (duplicate generating points, circumcenters that
//! should collapse into one Voronoi vertex) without an O(n²) scan. The grid is
//! ephemeral: it is built for one query batch and dropped.

use super::{FastHashMap, SmallBuffer};
use crate::geometry::point::Point;

const BUCKET_INLINE_CAPACITY: usize = 8;

/// Largest cell coordinate with unit resolution (2^52).
const MAX_CELL_COORDINATE: f64 = 4_503_599_627_370_496.0;

/// A hash grid mapping square cells of side `cell_size` to the keys stored in them.
///
/// Cells are keyed by the floored cell coordinates `floor(coord / cell_size)`, stored as
/// a [`Point`] so the `OrderedFloat` hashing of points is reused. Any two points closer
/// than `cell_size` fall into the same or adjacent cells.
#[derive(Clone, Debug)]
pub(crate) struct HashGridIndex<K = usize> {
    cell_size: f64,
    usable: bool,
    cells: FastHashMap<Point, SmallBuffer<K, BUCKET_INLINE_CAPACITY>>,
}

impl<K: Copy> HashGridIndex<K> {
    /// Create a new grid index with the given cell size.
    pub(crate) fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            usable: cell_size.is_finite() && cell_size > 0.0,
            cells: FastHashMap::default(),
        }
    }

    /// Returns `false` once a point could not be keyed.
    #[cfg(test)]
    pub(crate) const fn is_usable(&self) -> bool {
        self.usable
    }

    /// Insert `key` into the cell containing `point`.
    ///
    /// If the point cannot be keyed robustly the index is disabled.
    pub(crate) fn insert(&mut self, key: K, point: &Point) {
        if !self.usable {
            return;
        }
        let Some(cell) = self.cell_for(point) else {
            self.usable = false;
            return;
        };
        self.cells.entry(cell).or_default().push(key);
    }

    /// Visit every key in the 3×3 neighbourhood of the cell containing `point`.
    ///
    /// The visitor returns `false` to stop early. Returns `false` if the index could not
    /// answer the query.
    pub(crate) fn for_each_candidate<F>(&self, point: &Point, mut f: F) -> bool
    where
        F: FnMut(K) -> bool,
    {
        if !self.usable {
            return false;
        }
        let Some(base) = self.cell_for(point) else {
            return false;
        };

        for dx in [-1.0, 0.0, 1.0] {
            for dy in [-1.0, 0.0, 1.0] {
                let neighbor = Point::new([base.x() + dx, base.y() + dy]);
                if let Some(bucket) = self.cells.get(&neighbor) {
                    for &key in bucket {
                        if !f(key) {
                            return true;
                        }
                    }
                }
            }
        }
        true
    }

    fn cell_for(&self, point: &Point) -> Option<Point> {
        let mut cell = [0.0; 2];
        for (axis, coord) in point.coords().iter().enumerate() {
            let cell_coord = (coord / self.cell_size).floor();
            // Without unit resolution neighbour enumeration would be lossy.
            if cell_coord.is_nan() || cell_coord.abs() >= MAX_CELL_COORDINATE {
                return None;
            }
            cell[axis] = cell_coord;
        }
        Some(Point::new(cell).normalize_signed_zero())
    }
}
