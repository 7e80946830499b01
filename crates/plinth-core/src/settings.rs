//! Global tolerances and capacity limits.
//!
//! These are compile-time constants shared by hull construction, polygon
//! building, and contact generation. They assume meter-scale geometry.

/// Collision and constraint tolerance in length units.
pub const LINEAR_SLOP: f32 = 0.005;

/// Skin radius carried by every polygon. Contacts are generated when
/// polygons are within this distance, so a resting stack stays in
/// contact without visible overlap.
pub const POLYGON_RADIUS: f32 = 2.0 * LINEAR_SLOP;

/// Maximum number of vertices on a convex polygon (and on a hull).
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Maximum number of points in a contact manifold.
pub const MAX_MANIFOLD_POINTS: usize = 2;
