//! Circle against a convex polygon, resolved by the Voronoi region of the
//! polygon the circle center falls in. Either argument order is accepted;
//! the polygon is always the reference shape.

use plinth_core::{Transform, Vec2};
use plinth_geom::{Circle, Polygon, Shape};
use smallvec::smallvec;

use super::{expect_circle, expect_polygon};
use crate::algorithm::{AlgorithmId, CollisionAlgorithm};
use crate::manifold::{ContactKey, LocalManifold, ManifoldKind, ManifoldPoint};

/// Circle versus convex polygon, in either order.
///
/// The polygon is always the reference shape. The circle center is
/// classified against the polygon's Voronoi regions: the edge of maximum
/// separation is found first, then the center's projections onto that
/// edge decide between its two vertex regions and its face region. The
/// face region wins whenever the projection falls within the edge span.
#[derive(Clone, Copy, Debug, Default)]
pub struct CirclePolygon;

/// Reference data in the polygon frame, or `None` for no contact.
fn polygon_reference(
    polygon: &Polygon,
    xf_polygon: &Transform,
    circle: &Circle,
    xf_circle: &Transform,
) -> Option<(Vec2, Vec2)> {
    let center = xf_polygon.apply_inverse(xf_circle.apply(circle.center()));
    let radius = polygon.radius() + circle.radius();
    let vertices = polygon.vertices();
    let normals = polygon.normals();

    // Edge of maximum separation.
    let mut separation = f32::MIN;
    let mut face = 0;
    for (i, (&v, &n)) in vertices.iter().zip(normals).enumerate() {
        let s = n.dot(center - v);
        if s > radius {
            return None;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let v1 = vertices[face];
    let v2 = vertices[(face + 1) % vertices.len()];

    // Center inside the polygon.
    if separation < f32::EPSILON {
        return Some(((v1 + v2) * 0.5, normals[face]));
    }

    let u1 = (center - v1).dot(v2 - v1);
    let u2 = (center - v2).dot(v1 - v2);
    if u1 <= 0.0 {
        if center.distance_squared(v1) > radius * radius {
            return None;
        }
        Some((v1, (center - v1).normalize_or_zero()))
    } else if u2 <= 0.0 {
        if center.distance_squared(v2) > radius * radius {
            return None;
        }
        Some((v2, (center - v2).normalize_or_zero()))
    } else {
        let mid = (v1 + v2) * 0.5;
        if (center - mid).dot(normals[face]) > radius {
            return None;
        }
        Some((mid, normals[face]))
    }
}

impl CollisionAlgorithm for CirclePolygon {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::CirclePolygon
    }

    fn collide(
        &self,
        shape_a: &Shape,
        xf_a: &Transform,
        shape_b: &Shape,
        xf_b: &Transform,
    ) -> LocalManifold {
        // The polygon is the reference shape whichever side it arrived on.
        let (polygon, xf_p, circle, xf_c, kind) = match shape_a.as_polygon() {
            Some(polygon) => (
                polygon,
                xf_a,
                expect_circle(shape_b, "circle-polygon"),
                xf_b,
                ManifoldKind::FaceA,
            ),
            None => (
                expect_polygon(shape_b, "circle-polygon"),
                xf_b,
                expect_circle(shape_a, "circle-polygon"),
                xf_a,
                ManifoldKind::FaceB,
            ),
        };

        match polygon_reference(polygon, xf_p, circle, xf_c) {
            None => LocalManifold::empty(),
            Some((local_point, local_normal)) => LocalManifold {
                kind,
                local_point,
                local_normal,
                points: smallvec![ManifoldPoint {
                    local_point: circle.center(),
                    key: ContactKey::ZERO,
                }],
            },
        }
    }
}
