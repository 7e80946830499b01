//! Error types for shape construction.

use std::error::Error;
use std::fmt;

/// A shape could not be built from the supplied parameters.
///
/// These are recoverable input errors. Contract violations (such as
/// freeing a shape through the wrong allocator) panic instead.
#[derive(Clone, Debug, PartialEq)]
pub enum GeomError {
    /// A circle radius was zero, negative, or not finite.
    InvalidRadius {
        /// The rejected radius.
        radius: f32,
    },
    /// Box half-extents were zero, negative, or not finite.
    InvalidExtents {
        /// Requested half-width.
        half_width: f32,
        /// Requested half-height.
        half_height: f32,
    },
    /// The point set produced an empty hull (too few points, collinear,
    /// near-duplicate, non-finite, or more than the vertex limit).
    DegenerateHull {
        /// Number of input points.
        points: usize,
    },
    /// A hull was accepted but encloses no measurable area.
    DegeneratePolygon {
        /// The computed signed area.
        area: f32,
    },
    /// A position or angle was not finite.
    NonFinite {
        /// Name of the offending parameter.
        parameter: &'static str,
    },
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRadius { radius } => {
                write!(f, "circle radius must be positive and finite, got {radius}")
            }
            Self::InvalidExtents {
                half_width,
                half_height,
            } => write!(
                f,
                "box half-extents must be positive and finite, got {half_width} x {half_height}"
            ),
            Self::DegenerateHull { points } => {
                write!(f, "no valid convex hull for {points} input point(s)")
            }
            Self::DegeneratePolygon { area } => {
                write!(f, "polygon area {area} is too small")
            }
            Self::NonFinite { parameter } => write!(f, "{parameter} must be finite"),
        }
    }
}

impl Error for GeomError {}
