//! Collection aliases used by the triangulation and the Voronoi dual.
//!
//! Keys in this crate are small integers (point indices, edge keys, triangle slots), so
//! the maps use the Fx hasher from [`rustc_hash`] instead of the DoS-resistant default.
//! None of these maps are fed untrusted keys.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::core::edge::EdgeKey;

mod spatial_hash_grid;

pub(crate) use spatial_hash_grid::HashGridIndex;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// `HashMap` with the Fx hasher.
///
/// # Examples
///
/// ```rust
/// use voronoi_lattice::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<usize, f64> = FastHashMap::default();
/// map.insert(3, 0.5);
/// assert_eq!(map.get(&3), Some(&0.5));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// `HashSet` with the Fx hasher.
pub type FastHashSet<T> = FxHashSet<T>;

/// Build hasher shared by [`FastHashMap`] and [`FastHashSet`].
pub type FastBuildHasher = FxBuildHasher;

/// Stack-allocated buffer that spills to the heap past `N` elements.
///
/// # Examples
///
/// ```rust
/// use voronoi_lattice::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 2> = SmallBuffer::new();
/// buffer.push(7);
/// buffer.push(9);
/// assert!(!buffer.spilled());
/// buffer.push(11);
/// assert!(buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC ALIASES
// =============================================================================

/// Triangles incident to an undirected edge.
///
/// A manifold planar triangulation has at most two triangles per edge, which
/// [`SmallBuffer`] holds inline.
pub type EdgeToTrianglesMap = FastHashMap<EdgeKey, SmallBuffer<usize, 2>>;

/// Creates a [`FastHashMap`] with pre-allocated capacity.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Creates a [`FastHashSet`] with pre-allocated capacity.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_helpers() {
        let map = fast_hash_map_with_capacity::<u64, usize>(100);
        assert!(map.capacity() >= 100);

        let set = fast_hash_set_with_capacity::<u64>(50);
        assert!(set.capacity() >= 50);
    }

    #[test]
    fn test_edge_map_holds_two_triangles_inline() {
        let mut map = EdgeToTrianglesMap::default();
        let edge = EdgeKey::new(4, 1);
        map.entry(edge).or_default().push(0);
        map.entry(EdgeKey::new(1, 4)).or_default().push(5);

        let incident = &map[&edge];
        assert_eq!(incident.as_slice(), &[0, 5]);
        assert!(!incident.spilled());
    }
}
