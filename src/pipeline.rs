//! End-to-end pipeline: generate a lattice, build its Voronoi diagram, export the tables.
//!
//! Nothing runs at module load; callers drive each stage through [`run`] or
//! [`run_and_export`].
//!
//! # Examples
//!
//! ```rust
//! use voronoi_lattice::pipeline::{PipelineConfig, run};
//!
//! let diagram = run(&PipelineConfig::default()).unwrap();
//! assert_eq!(diagram.points().len(), 67);
//! assert!(diagram.is_valid());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::lattice::{LatticeConfig, LatticeConfigError, generate_lattice_points};
use crate::core::voronoi::{DegenerateInputError, VoronoiBuilder, VoronoiConfig, VoronoiDiagram};
use crate::io::export::{ExportConfig, GeometryExporter, IoWriteError, TablePaths};

/// Errors loading a [`PipelineConfig`] from disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        /// The config path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid JSON for [`PipelineConfig`].
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        /// The config path.
        path: PathBuf,
        /// The JSON error, including line and column.
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure along the pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Lattice parameters were rejected.
    #[error(transparent)]
    Lattice(#[from] LatticeConfigError),
    /// The generated points could not be turned into a diagram.
    #[error(transparent)]
    Degenerate(#[from] DegenerateInputError),
    /// Writing the tables failed.
    #[error(transparent)]
    Write(#[from] IoWriteError),
    /// Loading the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration for all three stages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lattice generation parameters.
    pub lattice: LatticeConfig,
    /// Voronoi construction tolerances.
    pub voronoi: VoronoiConfig,
    /// Output naming and precision.
    pub export: ExportConfig,
}

impl PipelineConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid JSON for this structure. Negative
    /// lattice counts are a [`ConfigError::Parse`] too.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Generates the lattice and builds its Voronoi diagram.
///
/// # Errors
///
/// Returns [`PipelineError::Lattice`] for invalid lattice parameters and
/// [`PipelineError::Degenerate`] if the clipped lattice cannot be triangulated, for
/// example when fewer than four points survive clipping.
pub fn run(config: &PipelineConfig) -> Result<VoronoiDiagram, PipelineError> {
    let points = generate_lattice_points(&config.lattice)?;
    let diagram = VoronoiBuilder::new(config.voronoi.clone()).build(&points)?;
    tracing::debug!(
        points = diagram.points().len(),
        vertices = diagram.vertices().len(),
        ridges = diagram.ridges().len(),
        "pipeline built diagram"
    );
    Ok(diagram)
}

/// Runs the pipeline and writes the four tables into `destination`.
///
/// # Errors
///
/// Everything [`run`] returns, plus [`PipelineError::Write`] if the tables cannot be
/// written.
pub fn run_and_export(
    config: &PipelineConfig,
    destination: &Path,
) -> Result<(VoronoiDiagram, TablePaths), PipelineError> {
    let diagram = run(config)?;
    let paths = GeometryExporter::new(config.export.clone()).export(&diagram, destination)?;
    Ok((diagram, paths))
}
