//! Narrow-phase collision for the Plinth kernel.
//!
//! A broad-phase collaborator supplies candidate [`PairEntry`] values.
//! The [`Dispatcher`] looks up the algorithm for the pair's shape types in
//! a symmetric [`DispatchTable`] and runs it; the algorithm writes the
//! pair's `is_colliding` flag and returns a [`LocalManifold`]. A solver
//! collaborator turns that into a [`WorldManifold`] and tracks contacts
//! across steps by their [`ContactKey`]s.
//!
//! ```text
//! NarrowPhase
//! └── Dispatcher
//!     ├── DispatchTable   [ShapeType][ShapeType] -> AlgorithmId
//!     ├── CircleCircle
//!     ├── CirclePolygon
//!     └── PolygonPolygon
//! ```
//!
//! Pairs share no mutable state, so [`NarrowPhase::execute_parallel`]
//! splits a batch across scoped worker threads and returns manifolds in
//! input order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod algorithm;
pub mod algorithms;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod manifold;
pub mod narrow_phase;
pub mod pair;

pub use algorithm::{AlgorithmId, CollisionAlgorithm};
pub use algorithms::{CircleCircle, CirclePolygon, PolygonPolygon};
pub use config::NarrowPhaseConfig;
pub use dispatch::{DispatchTable, Dispatcher};
pub use error::DispatchError;
pub use manifold::{
    ContactFeature, ContactKey, FeatureType, LocalManifold, ManifoldKind, ManifoldPoint,
    WorldManifold,
};
pub use narrow_phase::NarrowPhase;
pub use pair::PairEntry;
