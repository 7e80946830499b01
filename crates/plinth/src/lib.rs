//! Plinth: a 2D collision kernel.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Plinth sub-crates. For most users, adding `plinth` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use plinth::prelude::*;
//!
//! let factory = ShapeFactory::default();
//! let floor = factory.box_shape(5.0, 0.5).unwrap();
//! let ball = factory.circle(Vec2::ZERO, 0.5).unwrap();
//!
//! let narrow_phase = NarrowPhase::new();
//! let mut pair = PairEntry::new(
//!     &floor,
//!     Transform::IDENTITY,
//!     &ball,
//!     Transform::from_position(Vec2::new(1.0, 0.9)),
//! );
//! let manifold = narrow_phase.execute(&mut pair);
//! assert!(pair.is_colliding());
//!
//! let world = WorldManifold::new(
//!     &manifold,
//!     pair.xf_a(),
//!     floor.radius(),
//!     pair.xf_b(),
//!     ball.radius(),
//! );
//! assert_eq!(world.points().len(), 1);
//! assert!(world.separations()[0] < 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `plinth-core` | Vectors, transforms, bounding boxes, tuning constants |
//! | [`alloc`] | `plinth-alloc` | `Allocator` trait, system, arena and free-list allocators |
//! | [`geom`] | `plinth-geom` | Shapes, the shape factory, quickhull, mass properties |
//! | [`collide`] | `plinth-collide` | Dispatch, the three narrow-phase algorithms, manifolds |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Math and shared types (`plinth-core`).
///
/// [`types::Vec2`], [`types::Rot`], [`types::Transform`],
/// [`types::Aabb`], [`types::ShapeType`], and the tolerances every
/// algorithm agrees on.
pub use plinth_core as types;

/// Allocation substrate (`plinth-alloc`).
///
/// The [`alloc::Allocator`] trait and its three strategies:
/// [`alloc::SystemAllocator`], [`alloc::ArenaAllocator`] and
/// [`alloc::FreeListAllocator`].
pub use plinth_alloc as alloc;

/// Shapes and hulls (`plinth-geom`).
///
/// Build shapes with [`geom::ShapeFactory`]; compute hulls with
/// [`geom::compute_hull`].
pub use plinth_geom as geom;

/// Narrow-phase collision (`plinth-collide`).
///
/// [`collide::NarrowPhase`] runs batches of [`collide::PairEntry`]
/// through the [`collide::Dispatcher`].
pub use plinth_collide as collide;

/// Common imports for typical Plinth usage.
///
/// ```rust
/// use plinth::prelude::*;
/// ```
pub mod prelude {
    // Math
    pub use plinth_core::{Aabb, Rot, ShapeType, Transform, Vec2};

    // Allocators
    pub use plinth_alloc::{Allocator, ArenaAllocator, FreeListAllocator, SystemAllocator};

    // Geometry
    pub use plinth_geom::{compute_hull, Circle, Hull, Polygon, Shape, ShapeFactory, ShapeHandle};

    // Narrow phase
    pub use plinth_collide::{
        CollisionAlgorithm, ContactKey, Dispatcher, LocalManifold, ManifoldKind, NarrowPhase,
        PairEntry, WorldManifold,
    };

    // Errors
    pub use plinth_collide::DispatchError;
    pub use plinth_core::ConfigError;
    pub use plinth_geom::GeomError;
}
