//! Convex polygon pairs: separating-axis search for the reference face,
//! then clipping of the incident edge against its side planes.

use plinth_core::{Transform, Vec2, LINEAR_SLOP};
use plinth_geom::{Polygon, Shape};
use smallvec::SmallVec;

use super::expect_polygon;
use crate::algorithm::{AlgorithmId, CollisionAlgorithm};
use crate::manifold::{ContactFeature, FeatureType, LocalManifold, ManifoldKind, ManifoldPoint};

/// Convex polygon versus convex polygon (boxes included).
///
/// Separating-axis search over both polygons' edge normals, then
/// reference/incident edge clipping:
///
/// 1. The face of maximum separation is found on each polygon. Either
///    exceeding the combined skin radius means no contact.
/// 2. A's face is the reference unless B's separation is larger by more
///    than `0.1 * LINEAR_SLOP`. The bias keeps the choice stable from step
///    to step when both are nearly equal.
/// 3. The incident edge is the other polygon's edge whose normal is most
///    anti-parallel to the reference normal.
/// 4. The incident edge is clipped against the reference edge's two side
///    planes; clipped points within the skin radius become contacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolygonPolygon;

const FLIP_TOLERANCE: f32 = 0.1 * LINEAR_SLOP;

/// A world-space point on the incident edge, tagged with its features.
#[derive(Clone, Copy, Debug)]
struct ClipVertex {
    v: Vec2,
    feature: ContactFeature,
}

fn next(i: usize, count: usize) -> usize {
    if i + 1 < count {
        i + 1
    } else {
        0
    }
}

/// Face of `poly1` with the largest separation from `poly2`, and that
/// separation. Works in `poly2`'s frame.
fn find_max_separation(
    poly1: &Polygon,
    xf1: &Transform,
    poly2: &Polygon,
    xf2: &Transform,
) -> (usize, f32) {
    let xf = xf2.inv_mul(xf1);
    let mut best = 0;
    let mut max_separation = f32::MIN;
    for (i, (&v1, &n1)) in poly1.vertices().iter().zip(poly1.normals()).enumerate() {
        let n = xf.q.rotate(n1);
        let v = xf.apply(v1);
        let si = poly2
            .vertices()
            .iter()
            .map(|&v2| n.dot(v2 - v))
            .fold(f32::MAX, f32::min);
        if si > max_separation {
            max_separation = si;
            best = i;
        }
    }
    (best, max_separation)
}

/// The edge of `poly2` most anti-parallel to `poly1`'s face `edge1`, as two
/// world-space clip vertices.
fn find_incident_edge(
    poly1: &Polygon,
    xf1: &Transform,
    edge1: usize,
    poly2: &Polygon,
    xf2: &Transform,
) -> [ClipVertex; 2] {
    let normal1 = xf2.q.inv_rotate(xf1.q.rotate(poly1.normals()[edge1]));

    let mut index = 0;
    let mut min_dot = f32::MAX;
    for (i, &n2) in poly2.normals().iter().enumerate() {
        let dot = normal1.dot(n2);
        if dot < min_dot {
            min_dot = dot;
            index = i;
        }
    }

    let i1 = index;
    let i2 = next(i1, poly2.count());
    let vertex = |i: usize| ClipVertex {
        v: xf2.apply(poly2.vertices()[i]),
        feature: ContactFeature {
            index_a: edge1 as u8,
            index_b: i as u8,
            type_a: FeatureType::Face,
            type_b: FeatureType::Vertex,
        },
    };
    [vertex(i1), vertex(i2)]
}

/// Sutherland-Hodgman clip of a segment against the half-plane
/// `dot(normal, v) <= offset`. A point created by the clip is tagged with
/// the reference vertex `vertex_a` it was clipped against.
fn clip_segment_to_line(
    input: &[ClipVertex; 2],
    normal: Vec2,
    offset: f32,
    vertex_a: usize,
) -> SmallVec<[ClipVertex; 2]> {
    let mut out = SmallVec::new();
    let d0 = normal.dot(input[0].v) - offset;
    let d1 = normal.dot(input[1].v) - offset;

    if d0 <= 0.0 {
        out.push(input[0]);
    }
    if d1 <= 0.0 {
        out.push(input[1]);
    }
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out.push(ClipVertex {
            v: input[0].v + t * (input[1].v - input[0].v),
            feature: ContactFeature {
                index_a: vertex_a as u8,
                index_b: input[0].feature.index_b,
                type_a: FeatureType::Vertex,
                type_b: FeatureType::Face,
            },
        });
    }
    out
}

fn collide_polygons(
    poly_a: &Polygon,
    xf_a: &Transform,
    poly_b: &Polygon,
    xf_b: &Transform,
) -> LocalManifold {
    let total_radius = poly_a.radius() + poly_b.radius();

    let (edge_a, separation_a) = find_max_separation(poly_a, xf_a, poly_b, xf_b);
    if separation_a > total_radius {
        return LocalManifold::empty();
    }
    let (edge_b, separation_b) = find_max_separation(poly_b, xf_b, poly_a, xf_a);
    if separation_b > total_radius {
        return LocalManifold::empty();
    }

    let flip = separation_b > separation_a + FLIP_TOLERANCE;
    let (poly1, xf1, poly2, xf2, edge1, kind) = if flip {
        (poly_b, xf_b, poly_a, xf_a, edge_b, ManifoldKind::FaceB)
    } else {
        (poly_a, xf_a, poly_b, xf_b, edge_a, ManifoldKind::FaceA)
    };

    let incident = find_incident_edge(poly1, xf1, edge1, poly2, xf2);

    let iv1 = edge1;
    let iv2 = next(edge1, poly1.count());
    let local_v11 = poly1.vertices()[iv1];
    let local_v12 = poly1.vertices()[iv2];

    let Some(local_tangent) = (local_v12 - local_v11).try_normalize() else {
        return LocalManifold::empty();
    };
    let local_normal = local_tangent.right_perp();
    let plane_point = (local_v11 + local_v12) * 0.5;

    let tangent = xf1.q.rotate(local_tangent);
    let normal = tangent.right_perp();
    let v11 = xf1.apply(local_v11);
    let v12 = xf1.apply(local_v12);

    let front_offset = normal.dot(v11);
    let side_offset1 = -tangent.dot(v11) + total_radius;
    let side_offset2 = tangent.dot(v12) + total_radius;

    let clip1 = clip_segment_to_line(&incident, -tangent, side_offset1, iv1);
    let [c0, c1] = clip1.as_slice() else {
        return LocalManifold::empty();
    };
    let clip2 = clip_segment_to_line(&[*c0, *c1], tangent, side_offset2, iv2);
    if clip2.len() < 2 {
        return LocalManifold::empty();
    }

    let mut manifold = LocalManifold {
        kind,
        local_point: plane_point,
        local_normal,
        points: SmallVec::new(),
    };
    for cv in &clip2 {
        let separation = normal.dot(cv.v) - front_offset;
        if separation <= total_radius {
            let feature = if flip { cv.feature.swapped() } else { cv.feature };
            manifold.points.push(ManifoldPoint {
                local_point: xf2.apply_inverse(cv.v),
                key: feature.key(),
            });
        }
    }
    manifold
}

impl CollisionAlgorithm for PolygonPolygon {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::PolygonPolygon
    }

    fn collide(
        &self,
        shape_a: &Shape,
        xf_a: &Transform,
        shape_b: &Shape,
        xf_b: &Transform,
    ) -> LocalManifold {
        let poly_a = expect_polygon(shape_a, "polygon-polygon");
        let poly_b = expect_polygon(shape_b, "polygon-polygon");
        collide_polygons(poly_a, xf_a, poly_b, xf_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::WorldManifold;
    use approx::assert_relative_eq;
    use plinth_geom::ShapeFactory;

    fn at(x: f32, y: f32) -> Transform {
        Transform::from_position(Vec2::new(x, y))
    }

    // ── Axis-aligned boxes ────────────────────────────────────

    #[test]
    fn overlapping_unit_boxes_give_two_points_along_x() {
        let factory = ShapeFactory::default();
        let a = factory.box_shape(0.5, 0.5).unwrap();
        let b = factory.box_shape(0.5, 0.5).unwrap();
        let m = PolygonPolygon.collide(&a, &at(0.0, 0.0), &b, &at(0.9, 0.0));
        assert_eq!(m.point_count(), 2);
        assert_eq!(m.kind, ManifoldKind::FaceA);
        assert_eq!(m.local_normal, Vec2::X);

        let world = WorldManifold::new(&m, &at(0.0, 0.0), a.radius(), &at(0.9, 0.0), b.radius());
        assert_relative_eq!(world.normal.x, 1.0);
        for &s in world.separations() {
            assert!(s < 0.0);
        }
    }

    #[test]
    fn overlapping_unit_boxes_along_y() {
        let factory = ShapeFactory::default();
        let a = factory.box_shape(0.5, 0.5).unwrap();
        let b = factory.box_shape(0.5, 0.5).unwrap();
        let m = PolygonPolygon.collide(&a, &at(0.0, 0.0), &b, &at(0.0, 0.9));
        assert_eq!(m.point_count(), 2);
        assert_eq!(m.local_normal, Vec2::Y);
    }

    #[test]
    fn separated_boxes_do_not_collide() {
        let factory = ShapeFactory::default();
        let a = factory.box_shape(0.5, 0.5).unwrap();
        let b = factory.box_shape(0.5, 0.5).unwrap();
        let m = PolygonPolygon.collide(&a, &at(0.0, 0.0), &b, &at(1.5, 0.0));
        assert!(m.is_empty());
    }

    #[test]
    fn keys_are_distinct_and_reference_a_face() {
        let factory = ShapeFactory::default();
        let a = factory.box_shape(0.5, 0.5).unwrap();
        let b = factory.box_shape(0.5, 0.5).unwrap();
        let m = PolygonPolygon.collide(&a, &at(0.0, 0.0), &b, &at(0.9, 0.1));
        assert_eq!(m.point_count(), 2);
        assert_ne!(m.points[0].key, m.points[1].key);
        for p in &m.points {
            let f = p.key.feature();
            assert!(f.type_a == FeatureType::Face || f.type_b == FeatureType::Face);
        }
    }

    fn diamond_over_floor() -> Transform {
        // A half-unit box turned 45 degrees, its lowest corner 0.05 below
        // the top of a floor whose top face is at y = 0.5.
        let half_diag = 0.5 * std::f32::consts::SQRT_2;
        Transform::new(
            Vec2::new(0.0, 0.5 + half_diag - 0.05),
            std::f32::consts::FRAC_PI_4,
        )
    }

    #[test]
    fn larger_separation_on_b_flips_reference() {
        let factory = ShapeFactory::default();
        // Along the diamond's diagonal normals the wide floor reaches far
        // past it, so the floor's top face separates best and becomes the
        // reference.
        let diamond = factory.box_shape(0.5, 0.5).unwrap();
        let floor = factory.box_shape(2.0, 0.5).unwrap();
        let m = PolygonPolygon.collide(&diamond, &diamond_over_floor(), &floor, &Transform::IDENTITY);
        assert_eq!(m.kind, ManifoldKind::FaceB);
        assert_eq!(m.local_normal, Vec2::Y);
        assert_eq!(m.point_count(), 1);
        let feature = m.points[0].key.feature();
        assert_eq!(feature.type_a, FeatureType::Vertex);
        assert_eq!(feature.type_b, FeatureType::Face);
        assert_eq!(feature.index_b, 2, "floor's top edge");
    }

    #[test]
    fn keys_persist_across_small_motion() {
        let factory = ShapeFactory::default();
        let a = factory.box_shape(0.5, 0.5).unwrap();
        let b = factory.box_shape(0.5, 0.5).unwrap();
        let first = PolygonPolygon.collide(&a, &at(0.0, 0.0), &b, &at(0.0, 0.95));
        let second = PolygonPolygon.collide(&a, &at(0.0, 0.0), &b, &at(0.01, 0.96));
        let keys = |m: &LocalManifold| m.points.iter().map(|p| p.key).collect::<Vec<_>>();
        assert_eq!(keys(&first), keys(&second));
    }

    #[test]
    fn corner_into_face_without_flip() {
        let factory = ShapeFactory::default();
        let floor = factory.box_shape(2.0, 0.5).unwrap();
        let diamond = factory.box_shape(0.5, 0.5).unwrap();
        let m = PolygonPolygon.collide(&floor, &Transform::IDENTITY, &diamond, &diamond_over_floor());
        assert_eq!(m.kind, ManifoldKind::FaceA);
        assert_eq!(m.point_count(), 1);
        let world = WorldManifold::new(
            &m,
            &Transform::IDENTITY,
            floor.radius(),
            &diamond_over_floor(),
            diamond.radius(),
        );
        assert_relative_eq!(world.normal.y, 1.0);
        assert_relative_eq!(world.points()[0].x, 0.0, epsilon = 1e-5);
    }
}
