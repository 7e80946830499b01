//! The per-pair input record supplied by the broad phase.

use plinth_core::Transform;
use plinth_geom::Shape;

/// A candidate shape pair for one step.
///
/// Owned by the broad-phase collaborator. The narrow phase reads the
/// shapes and transforms and writes only the `is_colliding` flag.
#[derive(Clone, Debug)]
pub struct PairEntry<'a> {
    shape_a: &'a Shape,
    xf_a: Transform,
    shape_b: &'a Shape,
    xf_b: Transform,
    is_colliding: bool,
}

impl<'a> PairEntry<'a> {
    /// A fresh, not-yet-colliding pair.
    pub fn new(shape_a: &'a Shape, xf_a: Transform, shape_b: &'a Shape, xf_b: Transform) -> Self {
        Self {
            shape_a,
            xf_a,
            shape_b,
            xf_b,
            is_colliding: false,
        }
    }

    /// First shape.
    pub fn shape_a(&self) -> &'a Shape {
        self.shape_a
    }

    /// Second shape.
    pub fn shape_b(&self) -> &'a Shape {
        self.shape_b
    }

    /// World transform of the first shape.
    pub fn xf_a(&self) -> &Transform {
        &self.xf_a
    }

    /// World transform of the second shape.
    pub fn xf_b(&self) -> &Transform {
        &self.xf_b
    }

    /// Set by the narrow phase when the shapes touch.
    pub fn is_colliding(&self) -> bool {
        self.is_colliding
    }

    /// Clear the flag before the pair is submitted again next step.
    pub fn clear_colliding(&mut self) {
        self.is_colliding = false;
    }

    pub(crate) fn set_colliding(&mut self, colliding: bool) {
        self.is_colliding = colliding;
    }
}
