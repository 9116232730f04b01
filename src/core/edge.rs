//! Canonical edge identifiers.
//!
//! Edges of the triangulation are not stored explicitly; they are inferred from the
//! triangles. [`EdgeKey`] identifies an undirected edge by its two point indices with
//! `v0 <= v1`, so `(a, b)` and `(b, a)` map to the same key. Because the indices are
//! positions in the input point slice, the derived ordering is deterministic.

/// Canonical identifier for an undirected edge between two point indices.
///
/// # Examples
///
/// ```rust
/// use voronoi_lattice::core::edge::EdgeKey;
///
/// let edge = EdgeKey::new(7, 2);
/// assert_eq!(edge.endpoints(), (2, 7));
/// assert_eq!(edge, EdgeKey::new(2, 7));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    v0: usize,
    v1: usize,
}

impl EdgeKey {
    /// Creates a canonical edge key with `v0 <= v1`.
    #[inline]
    #[must_use]
    pub const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// Smaller endpoint.
    #[inline]
    #[must_use]
    pub const fn v0(self) -> usize {
        self.v0
    }

    /// Larger endpoint.
    #[inline]
    #[must_use]
    pub const fn v1(self) -> usize {
        self.v1
    }

    /// Both endpoints in canonical order.
    #[inline]
    #[must_use]
    pub const fn endpoints(self) -> (usize, usize) {
        (self.v0, self.v1)
    }

    /// Endpoints as an array, the layout used by the ridge tables.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [usize; 2] {
        [self.v0, self.v1]
    }
}

impl From<(usize, usize)> for EdgeKey {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_is_canonical() {
        let e1 = EdgeKey::new(5, 3);
        let e2 = EdgeKey::from((3, 5));
        assert_eq!(e1, e2);
        assert_eq!(e1.v0(), 3);
        assert_eq!(e1.v1(), 5);
        assert_eq!(e1.to_array(), [3, 5]);
    }

    #[test]
    fn test_edge_key_ordering_is_lexicographic() {
        let mut edges = vec![EdgeKey::new(2, 1), EdgeKey::new(0, 9), EdgeKey::new(1, 1)];
        edges.sort();
        assert_eq!(
            edges,
            vec![EdgeKey::new(0, 9), EdgeKey::new(1, 1), EdgeKey::new(1, 2)]
        );
    }
}
