//! The [`CollisionAlgorithm`] trait and algorithm identifiers.

use std::fmt;

use plinth_core::{ShapeType, Transform};
use plinth_geom::Shape;

use crate::manifold::LocalManifold;
use crate::pair::PairEntry;

/// Identifies one of the narrow-phase algorithms in a dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// [`CircleCircle`](crate::CircleCircle).
    CircleCircle,
    /// [`CirclePolygon`](crate::CirclePolygon), either order.
    CirclePolygon,
    /// [`PolygonPolygon`](crate::PolygonPolygon).
    PolygonPolygon,
}

impl AlgorithmId {
    /// Every algorithm id.
    pub const ALL: [AlgorithmId; 3] = [
        AlgorithmId::CircleCircle,
        AlgorithmId::CirclePolygon,
        AlgorithmId::PolygonPolygon,
    ];

    /// This algorithm accepts the unordered pair `{a, b}`.
    pub fn handles(self, a: ShapeType, b: ShapeType) -> bool {
        use ShapeType::{Circle, Polygon};
        matches!(
            (self, a, b),
            (Self::CircleCircle, Circle, Circle)
                | (Self::CirclePolygon, Circle, Polygon)
                | (Self::CirclePolygon, Polygon, Circle)
                | (Self::PolygonPolygon, Polygon, Polygon)
        )
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircleCircle => write!(f, "circle-circle"),
            Self::CirclePolygon => write!(f, "circle-polygon"),
            Self::PolygonPolygon => write!(f, "polygon-polygon"),
        }
    }
}

/// A narrow-phase procedure for one unordered pair of shape types.
///
/// Implementations are stateless and shared for the dispatcher's
/// lifetime; they must be safe to call from several threads at once.
pub trait CollisionAlgorithm: Send + Sync {
    /// This algorithm's id.
    fn id(&self) -> AlgorithmId;

    /// Compute the contact manifold of two placed shapes.
    ///
    /// Returns an empty manifold when the shapes do not touch.
    ///
    /// # Panics
    ///
    /// Panics if the shapes are not of the types this algorithm handles.
    fn collide(
        &self,
        shape_a: &Shape,
        xf_a: &Transform,
        shape_b: &Shape,
        xf_b: &Transform,
    ) -> LocalManifold;

    /// Run the algorithm on a pair and record the outcome in its flag.
    ///
    /// # Panics
    ///
    /// Panics if `pair.is_colliding()` is already true: a pair is
    /// processed at most once per step.
    fn execute(&self, pair: &mut PairEntry<'_>) -> LocalManifold {
        assert!(
            !pair.is_colliding(),
            "{} re-entered a pair that is already colliding (contract violation)",
            self.id()
        );
        let manifold = self.collide(pair.shape_a(), pair.xf_a(), pair.shape_b(), pair.xf_b());
        pair.set_colliding(!manifold.is_empty());
        manifold
    }
}
