//! Convex polygon geometry and builders.

use plinth_core::{Aabb, Transform, Vec2, MAX_POLYGON_VERTICES, POLYGON_RADIUS};

use crate::error::GeomError;
use crate::hull::{compute_hull, Hull};
use crate::mass::{polygon_integrals, MassData};

/// A convex polygon with counter-clockwise vertices.
///
/// Every edge `i` (from vertex `i` to vertex `i + 1`) carries a unit
/// outward normal. The polygon carries a small skin `radius`
/// ([`POLYGON_RADIUS`]) that contact generation adds to the separation
/// tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polygon {
    vertices: [Vec2; MAX_POLYGON_VERTICES],
    normals: [Vec2; MAX_POLYGON_VERTICES],
    count: usize,
    centroid: Vec2,
    radius: f32,
}

impl Polygon {
    /// Vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices[..self.count]
    }

    /// Outward edge normals; `normals()[i]` belongs to the edge leaving
    /// vertex `i`.
    pub fn normals(&self) -> &[Vec2] {
        &self.normals[..self.count]
    }

    /// Number of vertices.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Local centroid.
    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Skin radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Enclosed area (the skin is not included).
    pub fn area(&self) -> f32 {
        polygon_integrals(self.vertices()).0
    }

    /// Rotational inertia about the centroid for the given mass.
    pub fn inertia(&self, mass: f32) -> f32 {
        let (area, _, unit_inertia) = polygon_integrals(self.vertices());
        if area <= 0.0 {
            return 0.0;
        }
        mass * unit_inertia / area
    }

    /// Mass properties at `density`.
    pub fn mass_data(&self, density: f32) -> MassData {
        let (area, center, unit_inertia) = polygon_integrals(self.vertices());
        MassData {
            mass: density * area,
            center,
            rotational_inertia: density * unit_inertia,
        }
    }

    /// World point `p` lies inside the polygon placed at `xf`.
    pub fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        let local = xf.apply_inverse(p);
        self.vertices()
            .iter()
            .zip(self.normals())
            .all(|(&v, &n)| n.dot(local - v) <= 0.0)
    }

    /// Bounding box of the polygon placed at `xf`, inflated by the skin.
    pub fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let mut lower = xf.apply(self.vertices[0]);
        let mut upper = lower;
        for &v in &self.vertices()[1..] {
            let w = xf.apply(v);
            lower = lower.min(w);
            upper = upper.max(w);
        }
        Aabb::new(lower, upper).inflate(self.radius)
    }

    /// Build from vertices already known to be convex and CCW.
    fn from_ccw(points: &[Vec2], radius: f32) -> Result<Self, GeomError> {
        let count = points.len();
        debug_assert!((3..=MAX_POLYGON_VERTICES).contains(&count));

        let mut vertices = [Vec2::ZERO; MAX_POLYGON_VERTICES];
        let mut normals = [Vec2::ZERO; MAX_POLYGON_VERTICES];
        vertices[..count].copy_from_slice(points);
        for i in 0..count {
            let edge = vertices[(i + 1) % count] - vertices[i];
            normals[i] = edge
                .right_perp()
                .try_normalize()
                .ok_or(GeomError::DegenerateHull { points: count })?;
        }

        let (area, centroid, _) = polygon_integrals(points);
        if area <= f32::EPSILON {
            return Err(GeomError::DegeneratePolygon { area });
        }
        Ok(Self {
            vertices,
            normals,
            count,
            centroid,
            radius,
        })
    }
}

/// Build a polygon from a convex hull.
///
/// Fails with [`GeomError::DegenerateHull`] for an empty hull.
pub fn make_polygon(hull: &Hull) -> Result<Polygon, GeomError> {
    if hull.is_empty() {
        return Err(GeomError::DegenerateHull { points: 0 });
    }
    Polygon::from_ccw(hull.points(), POLYGON_RADIUS)
}

/// Build a polygon from an unordered point cloud via [`compute_hull`].
pub fn make_polygon_from_points(points: &[Vec2]) -> Result<Polygon, GeomError> {
    let hull = compute_hull(points);
    if hull.is_empty() {
        return Err(GeomError::DegenerateHull {
            points: points.len(),
        });
    }
    make_polygon(&hull)
}

fn check_extents(half_width: f32, half_height: f32) -> Result<(), GeomError> {
    let valid = |h: f32| h.is_finite() && h > 0.0;
    if valid(half_width) && valid(half_height) {
        Ok(())
    } else {
        Err(GeomError::InvalidExtents {
            half_width,
            half_height,
        })
    }
}

/// Axis-aligned box centered on the local origin.
pub fn make_box(half_width: f32, half_height: f32) -> Result<Polygon, GeomError> {
    check_extents(half_width, half_height)?;
    let (hx, hy) = (half_width, half_height);
    let mut vertices = [Vec2::ZERO; MAX_POLYGON_VERTICES];
    let mut normals = [Vec2::ZERO; MAX_POLYGON_VERTICES];
    vertices[..4].copy_from_slice(&[
        Vec2::new(-hx, -hy),
        Vec2::new(hx, -hy),
        Vec2::new(hx, hy),
        Vec2::new(-hx, hy),
    ]);
    normals[..4].copy_from_slice(&[-Vec2::Y, Vec2::X, Vec2::Y, -Vec2::X]);
    Ok(Polygon {
        vertices,
        normals,
        count: 4,
        centroid: Vec2::ZERO,
        radius: POLYGON_RADIUS,
    })
}

/// Box centered at `center` and rotated by `angle` radians in the local
/// frame.
pub fn make_offset_box(
    half_width: f32,
    half_height: f32,
    center: Vec2,
    angle: f32,
) -> Result<Polygon, GeomError> {
    if !center.is_finite() {
        return Err(GeomError::NonFinite {
            parameter: "center",
        });
    }
    if !angle.is_finite() {
        return Err(GeomError::NonFinite { parameter: "angle" });
    }
    let mut polygon = make_box(half_width, half_height)?;
    let xf = Transform::new(center, angle);
    for i in 0..polygon.count {
        polygon.vertices[i] = xf.apply(polygon.vertices[i]);
        polygon.normals[i] = xf.q.rotate(polygon.normals[i]);
    }
    polygon.centroid = center;
    Ok(polygon)
}
