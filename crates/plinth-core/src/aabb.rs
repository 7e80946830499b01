//! Axis-aligned bounding boxes.
//!
//! Shapes report an [`Aabb`] for a given transform; the broad phase
//! (outside this workspace) consumes them to produce candidate pairs.

use crate::math::Vec2;

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Lower corner.
    pub lower: Vec2,
    /// Upper corner.
    pub upper: Vec2,
}

impl Aabb {
    /// Construct from corners. `lower` must be component-wise `<= upper`.
    pub fn new(lower: Vec2, upper: Vec2) -> Self {
        debug_assert!(lower.x <= upper.x && lower.y <= upper.y);
        Self { lower, upper }
    }

    /// Smallest box containing every point. Returns `None` for an empty
    /// iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (lower, upper) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { lower, upper })
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        (self.lower + self.upper) * 0.5
    }

    /// Half extents.
    pub fn extents(&self) -> Vec2 {
        (self.upper - self.lower) * 0.5
    }

    /// Perimeter length, the usual cost metric for tree insertion.
    pub fn perimeter(&self) -> f32 {
        let d = self.upper - self.lower;
        2.0 * (d.x + d.y)
    }

    /// Box grown by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Aabb {
        let m = Vec2::new(margin, margin);
        Aabb {
            lower: self.lower - m,
            upper: self.upper + m,
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Boxes overlap (touching counts).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(other.lower.x > self.upper.x
            || other.lower.y > self.upper.y
            || self.lower.x > other.upper.x
            || self.lower.y > other.upper.y)
    }

    /// Point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.lower.x && p.x <= self.upper.x && p.y >= self.lower.y && p.y <= self.upper.y
    }
}
