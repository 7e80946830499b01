//! The [`Shape`] entity referenced by colliders and narrow-phase pairs.

use plinth_core::{Aabb, ShapeType, Transform, Vec2};

use crate::circle::Circle;
use crate::mass::MassData;
use crate::polygon::Polygon;

#[derive(Clone, Copy, Debug, PartialEq)]
enum ShapeKind {
    Circle(Circle),
    Polygon(Polygon),
}

/// A collision shape: a circle or a convex polygon.
///
/// Shapes can only be created by a [`ShapeFactory`](crate::ShapeFactory),
/// which places them in allocator memory. Everything else holds a
/// `&Shape` borrowed from a [`ShapeHandle`](crate::ShapeHandle).
#[derive(Debug, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
}

impl Shape {
    pub(crate) fn circle(circle: Circle) -> Self {
        Self {
            kind: ShapeKind::Circle(circle),
        }
    }

    pub(crate) fn polygon(polygon: Polygon) -> Self {
        Self {
            kind: ShapeKind::Polygon(polygon),
        }
    }

    /// The dispatch tag. Boxes report [`ShapeType::Polygon`].
    pub fn shape_type(&self) -> ShapeType {
        match self.kind {
            ShapeKind::Circle(_) => ShapeType::Circle,
            ShapeKind::Polygon(_) => ShapeType::Polygon,
        }
    }

    /// Circle geometry, if this is a circle.
    pub fn as_circle(&self) -> Option<&Circle> {
        match &self.kind {
            ShapeKind::Circle(c) => Some(c),
            ShapeKind::Polygon(_) => None,
        }
    }

    /// Polygon geometry, if this is a polygon.
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match &self.kind {
            ShapeKind::Polygon(p) => Some(p),
            ShapeKind::Circle(_) => None,
        }
    }

    /// Circle radius, or the polygon skin radius.
    pub fn radius(&self) -> f32 {
        match &self.kind {
            ShapeKind::Circle(c) => c.radius(),
            ShapeKind::Polygon(p) => p.radius(),
        }
    }

    /// Enclosed area.
    pub fn area(&self) -> f32 {
        match &self.kind {
            ShapeKind::Circle(c) => c.area(),
            ShapeKind::Polygon(p) => p.area(),
        }
    }

    /// Local centroid.
    pub fn centroid(&self) -> Vec2 {
        match &self.kind {
            ShapeKind::Circle(c) => c.center(),
            ShapeKind::Polygon(p) => p.centroid(),
        }
    }

    /// Rotational inertia about the centroid for the given mass.
    pub fn inertia(&self, mass: f32) -> f32 {
        match &self.kind {
            ShapeKind::Circle(c) => c.inertia(mass),
            ShapeKind::Polygon(p) => p.inertia(mass),
        }
    }

    /// Mass properties at `density`.
    pub fn mass_data(&self, density: f32) -> MassData {
        match &self.kind {
            ShapeKind::Circle(c) => c.mass_data(density),
            ShapeKind::Polygon(p) => p.mass_data(density),
        }
    }

    /// World point `p` lies inside the shape placed at `xf`.
    pub fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        match &self.kind {
            ShapeKind::Circle(c) => c.test_point(xf, p),
            ShapeKind::Polygon(poly) => poly.test_point(xf, p),
        }
    }

    /// World-space bounding box of the shape placed at `xf`.
    pub fn compute_aabb(&self, xf: &Transform) -> Aabb {
        match &self.kind {
            ShapeKind::Circle(c) => c.compute_aabb(xf),
            ShapeKind::Polygon(p) => p.compute_aabb(xf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::make_box;

    #[test]
    fn tags_follow_geometry() {
        let c = Shape::circle(Circle::new(Vec2::ZERO, 1.0).unwrap());
        let b = Shape::polygon(make_box(1.0, 1.0).unwrap());
        assert_eq!(c.shape_type(), ShapeType::Circle);
        assert_eq!(b.shape_type(), ShapeType::Polygon);
        assert!(c.as_polygon().is_none());
        assert!(b.as_circle().is_none());
        assert_eq!(c.radius(), 1.0);
        assert_eq!(b.centroid(), Vec2::ZERO);
    }
}
