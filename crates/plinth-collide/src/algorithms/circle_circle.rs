//! Two circles: a single contact point along the center line.

use plinth_core::{Transform, Vec2};
use plinth_geom::Shape;
use smallvec::smallvec;

use super::expect_circle;
use crate::algorithm::{AlgorithmId, CollisionAlgorithm};
use crate::manifold::{ContactKey, LocalManifold, ManifoldKind, ManifoldPoint};

/// Circle versus circle.
///
/// Rejects on squared distance, so the common miss path takes no square
/// root. A hit yields exactly one point with key 0 and a zero local
/// normal; the world normal comes from the centers (see
/// [`WorldManifold`](crate::WorldManifold)).
#[derive(Clone, Copy, Debug, Default)]
pub struct CircleCircle;

impl CollisionAlgorithm for CircleCircle {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::CircleCircle
    }

    fn collide(
        &self,
        shape_a: &Shape,
        xf_a: &Transform,
        shape_b: &Shape,
        xf_b: &Transform,
    ) -> LocalManifold {
        let a = expect_circle(shape_a, "circle-circle");
        let b = expect_circle(shape_b, "circle-circle");

        let p_a = xf_a.apply(a.center());
        let p_b = xf_b.apply(b.center());
        let radius = a.radius() + b.radius();
        if p_a.distance_squared(p_b) > radius * radius {
            return LocalManifold::empty();
        }

        LocalManifold {
            kind: ManifoldKind::Circles,
            local_point: a.center(),
            local_normal: Vec2::ZERO,
            points: smallvec![ManifoldPoint {
                local_point: b.center(),
                key: ContactKey::ZERO,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_geom::ShapeFactory;

    #[test]
    fn overlapping_circles_touch_once() {
        let factory = ShapeFactory::default();
        let a = factory.circle(Vec2::ZERO, 1.0).unwrap();
        let b = factory.circle(Vec2::ZERO, 1.0).unwrap();
        let m = CircleCircle.collide(
            &a,
            &Transform::IDENTITY,
            &b,
            &Transform::from_position(Vec2::new(1.5, 0.0)),
        );
        assert_eq!(m.point_count(), 1);
        assert_eq!(m.kind, ManifoldKind::Circles);
        assert_eq!(m.points[0].key, ContactKey::ZERO);
        assert_eq!(m.local_normal, Vec2::ZERO);
    }

    #[test]
    fn distant_circles_miss() {
        let factory = ShapeFactory::default();
        let a = factory.circle(Vec2::ZERO, 1.0).unwrap();
        let b = factory.circle(Vec2::ZERO, 1.0).unwrap();
        let m = CircleCircle.collide(
            &a,
            &Transform::IDENTITY,
            &b,
            &Transform::from_position(Vec2::new(3.0, 0.0)),
        );
        assert!(m.is_empty());
    }

    #[test]
    fn touching_exactly_counts_as_contact() {
        let factory = ShapeFactory::default();
        let a = factory.circle(Vec2::ZERO, 1.0).unwrap();
        let b = factory.circle(Vec2::new(2.0, 0.0), 1.0).unwrap();
        let m = CircleCircle.collide(&a, &Transform::IDENTITY, &b, &Transform::IDENTITY);
        assert_eq!(m.point_count(), 1);
        assert_eq!(m.points[0].local_point, Vec2::new(2.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "where a circle was expected")]
    fn polygon_input_is_a_contract_violation() {
        let factory = ShapeFactory::default();
        let a = factory.circle(Vec2::ZERO, 1.0).unwrap();
        let b = factory.box_shape(1.0, 1.0).unwrap();
        CircleCircle.collide(&a, &Transform::IDENTITY, &b, &Transform::IDENTITY);
    }
}
