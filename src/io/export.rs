//! Flat-file export of a Voronoi diagram.
//!
//! The diagram is written as four plain-text tables that a downstream modeling script
//! loads positionally:
//!
//! | Table | Rows | Format |
//! |---|---|---|
//! | `points` | generating points | `x y`, fixed decimals |
//! | `vertices` | Voronoi vertices | `x y`, fixed decimals |
//! | `ridge_points` | one per ridge | `i j` point indices |
//! | `ridge_vertices` | one per ridge | `a b` vertex indices, `-1` at infinity |
//!
//! Values are space-separated with one row per line and a trailing `\n`. Row `k` of
//! `ridge_points` and row `k` of `ridge_vertices` describe the same ridge.
//!
//! # Publishing
//!
//! Each table is first written to a hidden sibling (`.points.txt.tmp`), flushed and
//! synced. Only when all four are on disk are they renamed over the final names. A
//! table already at a final name is first moved aside to `.points.txt.bak`.
//!
//! If any rename fails, the tables already published by this export are removed and
//! the moved-aside files are put back, so an error never leaves a table from the
//! failed run at a final name. The backups are deleted once all four renames succeed.
//! Each rename is atomic on its own, but the four are not atomic as a set: a process
//! crash between renames can still leave a mix of old and new tables.
//!
//! # Examples
//!
//! ```no_run
//! use voronoi_lattice::core::voronoi::build;
//! use voronoi_lattice::geometry::point::Point;
//! use voronoi_lattice::io::export::export;
//!
//! let diagram = build(&[
//!     Point::new([0.0, 0.0]),
//!     Point::new([1.0, 0.0]),
//!     Point::new([0.0, 1.0]),
//!     Point::new([1.0, 1.0]),
//! ])
//! .unwrap();
//! let paths = export(&diagram, "out".as_ref()).unwrap();
//! println!("wrote {}", paths.points.display());
//! ```

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::voronoi::VoronoiDiagram;
use crate::geometry::point::Point;

/// Default number of decimals for coordinate tables.
pub const DEFAULT_PRECISION: usize = 8;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// A table could not be written or published.
#[derive(Debug, Error)]
#[error("Failed to write {}: {source}", .path.display())]
pub struct IoWriteError {
    /// Final path of the table that failed.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: io::Error,
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// The four exported tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    /// Generating points.
    Points,
    /// Voronoi vertices.
    Vertices,
    /// Generating-point pair per ridge.
    RidgePoints,
    /// Vertex pair per ridge.
    RidgeVertices,
}

impl Table {
    /// All tables in export order.
    pub const ALL: [Self; 4] = [
        Self::Points,
        Self::Vertices,
        Self::RidgePoints,
        Self::RidgeVertices,
    ];

    /// Base file name of the table.
    #[must_use]
    pub const fn stem(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Vertices => "vertices",
            Self::RidgePoints => "ridge_points",
            Self::RidgeVertices => "ridge_vertices",
        }
    }
}

/// File naming and number formatting for an export.
///
/// The default produces `points.txt`, `vertices.txt`, `ridge_points.txt` and
/// `ridge_vertices.txt` with 8 decimals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prepended to every table name.
    pub file_prefix: String,
    /// File extension without the dot; empty for none.
    pub extension: String,
    /// Decimals written for coordinates.
    pub precision: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: String::new(),
            extension: "txt".to_owned(),
            precision: DEFAULT_PRECISION,
        }
    }
}

impl ExportConfig {
    /// File name of `table` under this configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use voronoi_lattice::io::export::{ExportConfig, Table};
    ///
    /// let config = ExportConfig {
    ///     file_prefix: "run1_".into(),
    ///     ..ExportConfig::default()
    /// };
    /// assert_eq!(config.file_name(Table::RidgeVertices), "run1_ridge_vertices.txt");
    /// ```
    #[must_use]
    pub fn file_name(&self, table: Table) -> String {
        if self.extension.is_empty() {
            format!("{}{}", self.file_prefix, table.stem())
        } else {
            format!("{}{}.{}", self.file_prefix, table.stem(), self.extension)
        }
    }
}

/// Locations of the four tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TablePaths {
    /// Generating points table.
    pub points: PathBuf,
    /// Voronoi vertices table.
    pub vertices: PathBuf,
    /// Ridge point pairs table.
    pub ridge_points: PathBuf,
    /// Ridge vertex pairs table.
    pub ridge_vertices: PathBuf,
}

impl TablePaths {
    /// Paths of the tables inside `dir` under `config`'s naming.
    #[must_use]
    pub fn in_dir(dir: &Path, config: &ExportConfig) -> Self {
        let path = |table| dir.join(config.file_name(table));
        Self {
            points: path(Table::Points),
            vertices: path(Table::Vertices),
            ridge_points: path(Table::RidgePoints),
            ridge_vertices: path(Table::RidgeVertices),
        }
    }

    /// Path of one table.
    #[must_use]
    pub fn get(&self, table: Table) -> &Path {
        match table {
            Table::Points => &self.points,
            Table::Vertices => &self.vertices,
            Table::RidgePoints => &self.ridge_points,
            Table::RidgeVertices => &self.ridge_vertices,
        }
    }
}

// =============================================================================
// EXPORTER
// =============================================================================

/// Writes diagrams to a destination directory.
#[derive(Clone, Debug, Default)]
pub struct GeometryExporter {
    config: ExportConfig,
}

impl GeometryExporter {
    /// Creates an exporter with the given naming and formatting.
    #[must_use]
    pub const fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Writes the four tables of `diagram` into `destination`.
    ///
    /// The directory must already exist; it is never created. Existing tables with the
    /// same names are replaced.
    ///
    /// # Errors
    ///
    /// Returns [`IoWriteError`] with the final path of the first table that could not
    /// be written or renamed. Temporary files are removed and earlier tables rolled
    /// back before returning.
    pub fn export(
        &self,
        diagram: &VoronoiDiagram,
        destination: &Path,
    ) -> Result<TablePaths, IoWriteError> {
        let paths = TablePaths::in_dir(destination, &self.config);
        let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(Table::ALL.len());

        for table in Table::ALL {
            let final_path = paths.get(table);
            let temp_path = temp_sibling(final_path);
            let contents = format_table(diagram, table, self.config.precision);
            if let Err(source) = write_synced(&temp_path, &contents) {
                remove_temporaries(staged.iter().map(|(temp, _)| temp.as_path()));
                remove_temporaries([temp_path.as_path()]);
                return Err(IoWriteError {
                    path: final_path.to_path_buf(),
                    source,
                });
            }
            staged.push((temp_path, final_path));
        }

        let mut published: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
        for (position, (temp_path, final_path)) in staged.iter().enumerate() {
            match replace_file(temp_path, final_path) {
                Ok(backup) => published.push((*final_path, backup)),
                Err(source) => {
                    roll_back(&published);
                    remove_temporaries(staged[position..].iter().map(|(temp, _)| temp.as_path()));
                    return Err(IoWriteError {
                        path: final_path.to_path_buf(),
                        source,
                    });
                }
            }
        }
        remove_temporaries(published.iter().filter_map(|(_, backup)| backup.as_deref()));

        tracing::info!(
            destination = %destination.display(),
            points = diagram.points().len(),
            vertices = diagram.vertices().len(),
            ridges = diagram.ridges().len(),
            "published geometry tables"
        );
        Ok(paths)
    }
}

/// Writes `diagram` into `destination` with the default [`ExportConfig`].
///
/// # Errors
///
/// See [`GeometryExporter::export`].
pub fn export(diagram: &VoronoiDiagram, destination: &Path) -> Result<TablePaths, IoWriteError> {
    GeometryExporter::default().export(diagram, destination)
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Renders one table as text.
///
/// # Examples
///
/// ```
/// use voronoi_lattice::core::voronoi::build;
/// use voronoi_lattice::geometry::point::Point;
/// use voronoi_lattice::io::export::{Table, format_table};
///
/// let diagram = build(&[
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([0.0, 1.0]),
///     Point::new([1.0, 1.0]),
/// ])
/// .unwrap();
/// assert_eq!(format_table(&diagram, Table::Vertices, 8), "0.50000000 0.50000000\n");
/// assert_eq!(format_table(&diagram, Table::RidgeVertices, 8), "-1 0\n".repeat(4));
/// ```
#[must_use]
pub fn format_table(diagram: &VoronoiDiagram, table: Table, precision: usize) -> String {
    match table {
        Table::Points => format_coordinates(diagram.points(), precision),
        Table::Vertices => format_coordinates(diagram.vertices(), precision),
        Table::RidgePoints => format_pairs(diagram.ridge_points()),
        Table::RidgeVertices => format_pairs(diagram.ridge_vertices()),
    }
}

fn format_coordinates(points: &[Point], precision: usize) -> String {
    let mut out = String::with_capacity(points.len() * (2 * precision + 8));
    for p in points {
        let p = p.normalize_signed_zero();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{:.precision$} {:.precision$}", p.x(), p.y());
    }
    out
}

fn format_pairs<T: std::fmt::Display>(rows: Vec<[T; 2]>) -> String {
    let mut out = String::new();
    for [a, b] in rows {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{a} {b}");
    }
    out
}

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Hidden temporary path next to `path`, e.g. `dir/.points.txt.tmp`.
fn temp_sibling(path: &Path) -> PathBuf {
    hidden_sibling(path, "tmp")
}

/// Where a replaced table waits until the export commits, e.g. `dir/.points.txt.bak`.
fn backup_sibling(path: &Path) -> PathBuf {
    hidden_sibling(path, "bak")
}

fn hidden_sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{suffix}"))
}

/// Renames `temp_path` to `final_path`, first moving any existing non-directory entry
/// at `final_path` to its backup sibling. Returns the backup path, if one was made.
///
/// On failure the backup is moved back, leaving `final_path` as it was.
fn replace_file(temp_path: &Path, final_path: &Path) -> io::Result<Option<PathBuf>> {
    let backup = match fs::symlink_metadata(final_path) {
        Ok(meta) if !meta.is_dir() => {
            let backup = backup_sibling(final_path);
            fs::rename(final_path, &backup)?;
            Some(backup)
        }
        Ok(_) => None,
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(err),
    };

    if let Err(err) = fs::rename(temp_path, final_path) {
        if let Some(backup) = &backup {
            restore_backup(backup, final_path);
        }
        return Err(err);
    }
    Ok(backup)
}

/// Undoes [`replace_file`] for every published table, newest first.
fn roll_back(published: &[(&Path, Option<PathBuf>)]) {
    for (final_path, backup) in published.iter().rev() {
        if let Err(err) = fs::remove_file(final_path) {
            tracing::warn!(
                path = %final_path.display(),
                error = %err,
                "could not withdraw published table"
            );
        }
        if let Some(backup) = backup {
            restore_backup(backup, final_path);
        }
    }
}

fn restore_backup(backup: &Path, final_path: &Path) {
    if let Err(err) = fs::rename(backup, final_path) {
        tracing::warn!(
            backup = %backup.display(),
            path = %final_path.display(),
            error = %err,
            "could not restore previous table"
        );
    }
}

fn write_synced(path: &Path, contents: &str) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(contents.as_bytes())?;
    writer.flush()?;
    let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()
}

fn remove_temporaries<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        if let Err(err) = fs::remove_file(path)
            && err.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %err, "could not remove staging file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::voronoi::build;
    use tempfile::tempdir;

    fn square_diagram() -> VoronoiDiagram {
        build(&[
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([0.0, 1.0]),
            Point::new([1.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_file_names() {
        let paths = TablePaths::in_dir(Path::new("out"), &ExportConfig::default());
        assert_eq!(paths.points, Path::new("out").join("points.txt"));
        assert_eq!(paths.ridge_points, Path::new("out").join("ridge_points.txt"));

        let bare = ExportConfig {
            extension: String::new(),
            ..ExportConfig::default()
        };
        assert_eq!(bare.file_name(Table::Vertices), "vertices");
    }

    #[test]
    fn test_format_tables() {
        let diagram = square_diagram();
        assert_eq!(
            format_table(&diagram, Table::Points, 8),
            "0.00000000 0.00000000\n1.00000000 0.00000000\n0.00000000 1.00000000\n1.00000000 1.00000000\n"
        );
        assert_eq!(
            format_table(&diagram, Table::RidgePoints, 8),
            "0 1\n0 2\n1 3\n2 3\n"
        );
        assert_eq!(format_table(&diagram, Table::Vertices, 3), "0.500 0.500\n");
    }

    #[test]
    fn test_negative_zero_is_written_as_zero() {
        assert_eq!(
            format_coordinates(&[Point::new([-0.0, -0.0])], 8),
            "0.00000000 0.00000000\n"
        );
    }

    #[test]
    fn test_export_writes_four_tables_and_no_temporaries() {
        let dir = tempdir().unwrap();
        let paths = export(&square_diagram(), dir.path()).unwrap();

        for table in Table::ALL {
            assert!(paths.get(table).is_file(), "{table:?} missing");
        }
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let ridge_vertices = fs::read_to_string(&paths.ridge_vertices).unwrap();
        assert_eq!(ridge_vertices, "-1 0\n-1 0\n-1 0\n-1 0\n");
    }

    #[test]
    fn test_export_to_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = export(&square_diagram(), &missing).unwrap_err();
        assert_eq!(err.path, missing.join("points.txt"));
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
        assert!(!missing.exists(), "destination must not be created");
    }

    #[test]
    fn test_staging_siblings_are_hidden() {
        assert_eq!(
            temp_sibling(Path::new("a/b/points.txt")),
            Path::new("a/b/.points.txt.tmp")
        );
        assert_eq!(
            backup_sibling(Path::new("a/b/points.txt")),
            Path::new("a/b/.points.txt.bak")
        );
    }

    #[test]
    fn test_replace_file_restores_previous_table_on_failure() {
        let dir = tempdir().unwrap();
        let final_path = dir.path().join("points.txt");
        fs::write(&final_path, "old\n").unwrap();

        // The temporary was never written, so the rename fails.
        let missing_temp = temp_sibling(&final_path);
        assert!(replace_file(&missing_temp, &final_path).is_err());
        assert_eq!(fs::read_to_string(&final_path).unwrap(), "old\n");
        assert!(!backup_sibling(&final_path).exists());
    }

    #[test]
    fn test_failed_last_rename_rolls_back_earlier_tables() {
        let dir = tempdir().unwrap();
        let paths = TablePaths::in_dir(dir.path(), &ExportConfig::default());
        fs::write(&paths.points, "stale\n").unwrap();
        fs::create_dir(&paths.ridge_vertices).unwrap();
        fs::write(paths.ridge_vertices.join("keep"), "x").unwrap();

        let err = export(&square_diagram(), dir.path()).unwrap_err();
        assert_eq!(err.path, paths.ridge_vertices);

        assert_eq!(fs::read_to_string(&paths.points).unwrap(), "stale\n");
        assert!(!paths.vertices.exists());
        assert!(!paths.ridge_points.exists());
        assert!(paths.ridge_vertices.join("keep").is_file());

        let staging: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp") || name.ends_with(".bak"))
            .collect();
        assert!(staging.is_empty(), "left behind {staging:?}");
    }

    #[test]
    fn test_successful_export_drops_backups() {
        let dir = tempdir().unwrap();
        let paths = TablePaths::in_dir(dir.path(), &ExportConfig::default());
        fs::write(&paths.points, "stale\n").unwrap();

        export(&square_diagram(), dir.path()).unwrap();
        assert!(fs::read_to_string(&paths.points).unwrap().starts_with("0.00000000"));
        assert!(!backup_sibling(&paths.points).exists());
    }
}
