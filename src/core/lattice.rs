//! Near-hexagonal lattice point generation.
//!
//! Columns are spaced `width` apart along x. Even columns hold points at integer
//! multiples of `height`; odd columns hold one extra point and are shifted up by half a
//! row, so each interior point has six nearly equidistant neighbours. Each column is
//! mirrored across both axes, which produces duplicates on the axes. The generator sorts
//! the raw points, removes the duplicates, and finally keeps only the points strictly
//! inside the square `(-region_radius, region_radius)²`.
//!
//! # Examples
//!
//! ```rust
//! use voronoi_lattice::core::lattice::{LatticeConfig, generate_lattice_points};
//!
//! let points = generate_lattice_points(&LatticeConfig::default()).unwrap();
//! assert_eq!(points.len(), 67);
//! assert!(points.iter().all(|p| p.max_abs_coordinate() < 4.0));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::util::{clip_to_open_box, dedup_points_epsilon, dedup_points_exact, sort_points};
use crate::geometry::point::Point;

/// Default column spacing, `√3 / 2`.
pub const DEFAULT_WIDTH: f64 = 0.866_025_403_784_438_6;

/// Default distance below which two generated points are treated as one.
pub const DEFAULT_DEDUP_TOLERANCE: f64 = 1e-12;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised for lattice parameters that cannot produce a meaningful point set.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum LatticeConfigError {
    /// A geometric parameter is NaN or infinite.
    #[error("Lattice parameter `{name}` must be finite, got {value}")]
    NonFiniteParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The deduplication tolerance is negative or not finite.
    #[error("Deduplication tolerance must be finite and non-negative, got {tolerance}")]
    InvalidDedupTolerance {
        /// The rejected tolerance.
        tolerance: f64,
    },
    /// The raw point count would overflow `usize`.
    #[error("Lattice of {point_num_x} x {point_num_y} columns overflows the point count")]
    TooManyPoints {
        /// Requested column count.
        point_num_x: usize,
        /// Requested rows per even column.
        point_num_y: usize,
    },
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Parameters of the near-hexagonal lattice.
///
/// `Default` reproduces the reference run: a 5 × 5 lattice with `√3/2` column spacing,
/// unit row spacing, clipped to `(-4, 4)²`.
///
/// # Examples
///
/// ```rust
/// use voronoi_lattice::core::lattice::LatticeConfigBuilder;
///
/// let config = LatticeConfigBuilder::default()
///     .point_num_x(3)
///     .region_radius(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.point_num_x, 3);
/// assert_eq!(config.point_num_y, 5);
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct LatticeConfig {
    /// Number of columns on each side of the y axis (including the axis column).
    ///
    /// The count is unsigned, so a negative value in a JSON config or on the command
    /// line is rejected while parsing, before any lattice is generated.
    pub point_num_x: usize,
    /// Number of rows in an even column on each side of the x axis. Negative values
    /// are rejected while parsing, like [`point_num_x`](Self::point_num_x).
    pub point_num_y: usize,
    /// Horizontal spacing between columns.
    pub width: f64,
    /// Vertical spacing between rows.
    pub height: f64,
    /// Half-width of the open square that retained points must lie in.
    pub region_radius: f64,
    /// Distance below which two generated points are merged.
    pub dedup_tolerance: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            point_num_x: 5,
            point_num_y: 5,
            width: DEFAULT_WIDTH,
            height: 1.0,
            region_radius: 4.0,
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
        }
    }
}

impl LatticeConfig {
    /// Creates a configuration from the five lattice parameters with the default
    /// deduplication tolerance.
    #[must_use]
    pub const fn new(
        point_num_x: usize,
        point_num_y: usize,
        width: f64,
        height: f64,
        region_radius: f64,
    ) -> Self {
        Self {
            point_num_x,
            point_num_y,
            width,
            height,
            region_radius,
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
        }
    }

    /// Checks that every parameter can be used for generation.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeConfigError::NonFiniteParameter`] for a NaN or infinite
    /// `width`, `height` or `region_radius`, and
    /// [`LatticeConfigError::InvalidDedupTolerance`] for a negative or non-finite
    /// tolerance.
    pub fn validate(&self) -> Result<(), LatticeConfigError> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("region_radius", self.region_radius),
        ] {
            if !value.is_finite() {
                return Err(LatticeConfigError::NonFiniteParameter { name, value });
            }
        }
        if !self.dedup_tolerance.is_finite() || self.dedup_tolerance < 0.0 {
            return Err(LatticeConfigError::InvalidDedupTolerance {
                tolerance: self.dedup_tolerance,
            });
        }
        Ok(())
    }

    /// Number of raw points emitted before deduplication and clipping.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeConfigError::TooManyPoints`] if the count overflows `usize`.
    pub fn raw_point_count(&self) -> Result<usize, LatticeConfigError> {
        let overflow = || LatticeConfigError::TooManyPoints {
            point_num_x: self.point_num_x,
            point_num_y: self.point_num_y,
        };
        if self.point_num_x == 0 || self.point_num_y == 0 {
            return Ok(0);
        }
        let odd_columns = self.point_num_x / 2;
        let per_side = self
            .point_num_x
            .checked_mul(self.point_num_y)
            .and_then(|n| n.checked_add(odd_columns))
            .ok_or_else(overflow)?;
        per_side.checked_mul(4).ok_or_else(overflow)
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Generates the deduplicated, clipped lattice described by `config`.
///
/// The result is sorted lexicographically by `(x, y)` and contains no `-0.0`
/// coordinates. An empty vector is returned when either count is zero or when the
/// clip region excludes every point.
///
/// # Errors
///
/// Returns a [`LatticeConfigError`] if `config` fails [`LatticeConfig::validate`] or
/// the raw point count overflows.
pub fn generate_lattice_points(config: &LatticeConfig) -> Result<Vec<Point>, LatticeConfigError> {
    config.validate()?;
    let raw_count = config.raw_point_count()?;
    if raw_count == 0 {
        tracing::debug!(
            point_num_x = config.point_num_x,
            point_num_y = config.point_num_y,
            "empty lattice requested"
        );
        return Ok(Vec::new());
    }

    let mut points = Vec::with_capacity(raw_count);
    for i in 0..config.point_num_x {
        let parity = i % 2;
        let column = usize_to_f64(i);
        let offset = usize_to_f64(parity) / 2.0;
        for x_sign in [1.0, -1.0] {
            for j in 0..config.point_num_y + parity {
                let row = usize_to_f64(j);
                for y_sign in [1.0, -1.0] {
                    points.push(Point::new([
                        x_sign * config.width * column,
                        (y_sign * config.height).mul_add(row, offset),
                    ]));
                }
            }
        }
    }

    sort_points(&mut points);
    let mut unique = dedup_points_exact(points);
    if config.dedup_tolerance > 0.0 {
        unique = dedup_points_epsilon(unique, config.dedup_tolerance);
    }
    let unique_count = unique.len();
    let retained = clip_to_open_box(unique, config.region_radius);

    tracing::debug!(
        raw = raw_count,
        unique = unique_count,
        retained = retained.len(),
        region_radius = config.region_radius,
        "generated lattice points"
    );
    Ok(retained)
}

/// Positional form of [`generate_lattice_points`] with the default tolerance.
///
/// # Errors
///
/// See [`generate_lattice_points`].
///
/// # Examples
///
/// ```rust
/// use voronoi_lattice::core::lattice::generate_lattice;
///
/// assert!(generate_lattice(0, 5, 1.0, 1.0, 4.0).unwrap().is_empty());
/// assert_eq!(generate_lattice(1, 1, 1.0, 1.0, 4.0).unwrap().len(), 1);
/// ```
pub fn generate_lattice(
    point_num_x: usize,
    point_num_y: usize,
    width: f64,
    height: f64,
    region_radius: f64,
) -> Result<Vec<Point>, LatticeConfigError> {
    generate_lattice_points(&LatticeConfig::new(
        point_num_x,
        point_num_y,
        width,
        height,
        region_radius,
    ))
}

#[expect(
    clippy::cast_precision_loss,
    reason = "lattice indices are far below 2^52"
)]
fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_matches_reference_parameters() {
        let config = LatticeConfig::default();
        assert_eq!(config.point_num_x, 5);
        assert_eq!(config.point_num_y, 5);
        assert_relative_eq!(config.width, 3.0_f64.sqrt() / 2.0, epsilon = 1e-15);
        assert_relative_eq!(config.height, 1.0);
        assert_relative_eq!(config.region_radius, 4.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_single_column_is_symmetric_about_origin() {
        let points = generate_lattice(1, 2, 1.0, 1.0, 10.0).unwrap();
        assert_eq!(
            points,
            vec![
                Point::new([0.0, -1.0]),
                Point::new([0.0, 0.0]),
                Point::new([0.0, 1.0]),
            ]
        );
    }

    #[test]
    fn test_odd_column_is_shifted_by_half_row() {
        let points = generate_lattice(2, 1, 1.0, 1.0, 10.0).unwrap();
        // Column 0: y = 0. Column ±1: j in 0..2 with offset 0.5 gives -0.5, 0.5, 1.5.
        assert_eq!(points.len(), 1 + 2 * 3);
        assert!(points.contains(&Point::new([1.0, 1.5])));
        assert!(points.contains(&Point::new([-1.0, -0.5])));
        assert!(!points.contains(&Point::new([1.0, -1.5])));
    }

    #[test]
    fn test_output_is_sorted_and_has_no_negative_zero() {
        let points = generate_lattice_points(&LatticeConfig::default()).unwrap();
        assert!(points.windows(2).all(|w| w[0] < w[1]));
        for p in &points {
            for c in p.coords() {
                assert!(*c != 0.0 || c.is_sign_positive(), "found -0.0 in {p}");
            }
        }
    }

    #[test]
    fn test_zero_counts_yield_empty_lattice() {
        assert!(generate_lattice(0, 0, 1.0, 1.0, 4.0).unwrap().is_empty());
        assert!(generate_lattice(5, 0, 1.0, 1.0, 4.0).unwrap().is_empty());
    }

    #[test]
    fn test_clip_can_remove_everything() {
        assert!(generate_lattice(3, 3, 1.0, 1.0, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let err = generate_lattice(2, 2, f64::NAN, 1.0, 4.0).unwrap_err();
        assert!(matches!(
            err,
            LatticeConfigError::NonFiniteParameter { name: "width", .. }
        ));

        let config = LatticeConfig {
            dedup_tolerance: -1.0,
            ..LatticeConfig::default()
        };
        assert!(matches!(
            generate_lattice_points(&config),
            Err(LatticeConfigError::InvalidDedupTolerance { .. })
        ));
    }

    #[test]
    fn test_raw_point_count() {
        assert_eq!(LatticeConfig::default().raw_point_count().unwrap(), 4 * (25 + 2));
        let huge = LatticeConfig::new(usize::MAX, 2, 1.0, 1.0, 1.0);
        assert!(matches!(
            huge.raw_point_count(),
            Err(LatticeConfigError::TooManyPoints { .. })
        ));
    }

    #[test]
    fn test_builder_and_serde_defaults() {
        let config = LatticeConfigBuilder::default()
            .point_num_y(7)
            .build()
            .unwrap();
        assert_eq!(config.point_num_y, 7);
        assert_eq!(config.point_num_x, 5);

        let parsed: LatticeConfig = serde_json::from_str(r#"{"region_radius": 2.5}"#).unwrap();
        assert_relative_eq!(parsed.region_radius, 2.5);
        assert_eq!(parsed.point_num_x, 5);
    }
}
