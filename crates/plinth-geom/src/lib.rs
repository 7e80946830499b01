//! Shape geometry for the Plinth collision kernel.
//!
//! Two geometry values exist: [`Circle`] and [`Polygon`] (boxes are
//! polygons built by [`make_box`] and [`make_offset_box`]). Polygons come
//! from a convex [`Hull`], produced by the quickhull routine
//! [`compute_hull`].
//!
//! Collision code never sees loose geometry values. It sees a [`Shape`],
//! which only a [`ShapeFactory`] can create: the factory validates the
//! input, places the shape in memory served by its allocator, and hands
//! out a [`ShapeHandle`]. The handle dereferences to `&Shape` and returns
//! the memory to the same allocator when released or dropped.
//!
//! # Degenerate input
//!
//! Near-duplicate or collinear point sets yield an empty hull, and
//! building a polygon from an empty hull fails with
//! [`GeomError::DegenerateHull`]. Nothing here panics on bad geometry.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod circle;
pub mod error;
pub mod factory;
pub mod hull;
pub mod mass;
pub mod polygon;
mod raw;
pub mod shape;

pub use circle::Circle;
pub use error::GeomError;
pub use factory::{ShapeFactory, ShapeHandle};
pub use hull::{compute_hull, validate_hull, Hull, HULL_EPSILON_SCALE};
pub use mass::MassData;
pub use polygon::{make_box, make_offset_box, make_polygon, make_polygon_from_points, Polygon};
pub use shape::Shape;
