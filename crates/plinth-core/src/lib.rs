//! Core types for the Plinth 2D collision kernel.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! small vector algebra every other crate speaks ([`Vec2`], [`Rot`],
//! [`Transform`], [`Aabb`]), the numeric tolerances shared by hull
//! construction and contact generation, the [`ShapeType`] tag used by
//! the dispatch table, and the configuration error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod aabb;
pub mod error;
pub mod math;
pub mod settings;
pub mod shape_type;

pub use aabb::Aabb;
pub use error::ConfigError;
pub use math::{cross, cross_sv, cross_vs, Rot, Transform, Vec2};
pub use settings::{LINEAR_SLOP, MAX_MANIFOLD_POINTS, MAX_POLYGON_VERTICES, POLYGON_RADIUS};
pub use shape_type::ShapeType;
