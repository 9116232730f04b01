//! Reading exported tables back into a [`VoronoiDiagram`].
//!
//! This mirrors how the downstream modeling stage loads the tables: whitespace-separated
//! rows, two columns each, matched to each other by row position.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::core::voronoi::{Ridge, VoronoiDiagram, VoronoiValidationError};
use crate::geometry::point::Point;
use crate::io::export::TablePaths;

/// Errors raised while reading exported tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// A table could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// The table path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A row could not be parsed.
    #[error("{}:{line}: {details}", .path.display())]
    Parse {
        /// The table path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with the row.
        details: String,
    },
    /// `ridge_points` and `ridge_vertices` have different lengths.
    #[error("ridge_points has {ridge_points} rows but ridge_vertices has {ridge_vertices}")]
    RowCountMismatch {
        /// Rows in `ridge_points`.
        ridge_points: usize,
        /// Rows in `ridge_vertices`.
        ridge_vertices: usize,
    },
    /// The tables parse but do not describe a valid diagram.
    #[error("Invalid diagram: {0}")]
    Invalid(#[from] VoronoiValidationError),
}

/// Reads the four tables at `paths` and validates the resulting diagram.
///
/// # Errors
///
/// Returns [`ImportError::Read`] if a file cannot be read, [`ImportError::Parse`] for a
/// malformed row, [`ImportError::RowCountMismatch`] if the two ridge tables disagree in
/// length, and [`ImportError::Invalid`] if the diagram fails validation.
pub fn read_tables(paths: &TablePaths) -> Result<VoronoiDiagram, ImportError> {
    let points = read_rows::<f64>(&paths.points)?
        .into_iter()
        .map(Point::from)
        .collect();
    let vertices = read_rows::<f64>(&paths.vertices)?
        .into_iter()
        .map(Point::from)
        .collect();
    let ridge_points = read_rows::<usize>(&paths.ridge_points)?;
    let ridge_vertices = read_rows::<i64>(&paths.ridge_vertices)?;

    if ridge_points.len() != ridge_vertices.len() {
        return Err(ImportError::RowCountMismatch {
            ridge_points: ridge_points.len(),
            ridge_vertices: ridge_vertices.len(),
        });
    }

    let mut ridges = Vec::with_capacity(ridge_points.len());
    for (row, (pair, ends)) in ridge_points.into_iter().zip(ridge_vertices).enumerate() {
        let vertices = [
            vertex_index(ends[0], &paths.ridge_vertices, row)?,
            vertex_index(ends[1], &paths.ridge_vertices, row)?,
        ];
        ridges.push(Ridge::new(pair, vertices));
    }

    let diagram = VoronoiDiagram::from_parts(points, vertices, ridges)?;
    tracing::debug!(
        points = diagram.points().len(),
        vertices = diagram.vertices().len(),
        ridges = diagram.ridges().len(),
        "read geometry tables"
    );
    Ok(diagram)
}

/// Reads a two-column table, skipping blank lines.
fn read_rows<T>(path: &Path) -> Result<Vec<[T; 2]>, ImportError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let parse_error = |details: String| ImportError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            details,
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => {}
            [a, b] => {
                let parse = |field: &str| {
                    field
                        .parse::<T>()
                        .map_err(|err| parse_error(format!("invalid value `{field}`: {err}")))
                };
                rows.push([parse(*a)?, parse(*b)?]);
            }
            other => {
                return Err(parse_error(format!(
                    "expected 2 columns, found {}",
                    other.len()
                )));
            }
        }
    }
    Ok(rows)
}

/// Maps the `-1` sentinel to `None`; rejects other negative values.
fn vertex_index(value: i64, path: &Path, row: usize) -> Result<Option<usize>, ImportError> {
    if value == -1 {
        return Ok(None);
    }
    usize::try_from(value)
        .map(Some)
        .map_err(|_| ImportError::Parse {
            path: path.to_path_buf(),
            line: row + 1,
            details: format!("vertex index {value} is negative and not the -1 sentinel"),
        })
}
