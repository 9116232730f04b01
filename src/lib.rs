//! # voronoi-lattice
//!
//! Generates a near-hexagonal 2D point lattice, computes its Voronoi tessellation and
//! writes the geometry as four flat tables for a downstream finite-element modeler.
//!
//! # Features
//!
//! - Parameterized lattice generation with deduplication and clipping to a square region
//! - Voronoi diagrams via an in-crate Bowyer–Watson Delaunay triangulation
//! - Half-infinite ridges represented with `Option<usize>` rather than a `-1` sentinel
//! - Flat-file export with staged writes, and a reader for the same format
//! - Serialization/Deserialization of configuration with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use voronoi_lattice::prelude::*;
//!
//! let points = generate_lattice_points(&LatticeConfig::default()).unwrap();
//! assert_eq!(points.len(), 67);
//!
//! let diagram = build(&points).unwrap();
//! assert_eq!(diagram.ridge_points().len(), diagram.ridge_vertices().len());
//! assert!(diagram.is_valid());
//! ```
//!
//! # Half-infinite ridges
//!
//! A ridge between two cells on the outside of the lattice extends to infinity. Its
//! missing endpoint is `None` in [`Ridge::vertices`](core::voronoi::Ridge::vertices)
//! and becomes `-1` only when exported:
//!
//! ```rust
//! use voronoi_lattice::prelude::*;
//!
//! let square = [
//!     Point::new([0.0, 0.0]),
//!     Point::new([1.0, 0.0]),
//!     Point::new([0.0, 1.0]),
//!     Point::new([1.0, 1.0]),
//! ];
//! let diagram = build(&square).unwrap();
//!
//! assert_eq!(diagram.vertices(), &[Point::new([0.5, 0.5])]);
//! assert_eq!(diagram.ridge_vertices(), vec![[-1, 0]; 4]);
//! ```
//!
//! # Degenerate input
//!
//! Inputs that have no meaningful tessellation are rejected rather than patched up:
//!
//! ```rust
//! use voronoi_lattice::prelude::*;
//!
//! let line: Vec<_> = (0..5).map(|i| Point::new([f64::from(i), 0.0])).collect();
//! assert!(matches!(
//!     build(&line),
//!     Err(DegenerateInputError::Collinear { count: 5 })
//! ));
//! ```
//!
//! # Running the whole pipeline
//!
//! [`pipeline::run_and_export`] generates, builds and writes in one call. The
//! `voronoi-lattice` binary wraps it with command-line flags and a JSON config file.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains lattice generation, the Delaunay triangulation and the
/// Voronoi diagram built from it.
pub mod core {
    pub mod collections;
    pub mod edge;
    pub mod lattice;
    pub mod triangulation;
    pub mod util;
    pub mod voronoi;
}

/// Points and the geometric predicates evaluated on them.
pub mod geometry {
    pub mod point;
    pub mod predicates;
}

/// Reading and writing the flat geometry tables.
pub mod io {
    pub mod export;
    pub mod import;
}

pub mod pipeline;

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    pub use crate::core::{
        edge::EdgeKey,
        lattice::*,
        triangulation::{Triangulation, TriangulationError},
        util::*,
        voronoi::*,
    };

    pub use crate::core::collections::{
        EdgeToTrianglesMap, FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    pub use crate::geometry::{point::*, predicates::*};

    pub use crate::io::{
        export::{ExportConfig, GeometryExporter, IoWriteError, Table, TablePaths, export},
        import::{ImportError, read_tables},
    };

    pub use crate::pipeline::{PipelineConfig, PipelineError, run, run_and_export};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}
