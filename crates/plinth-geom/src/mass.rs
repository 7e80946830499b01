//! Mass properties derived from shape geometry and density.

use plinth_core::Vec2;

/// Mass, center of mass, and rotational inertia of a shape.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassData {
    /// Mass in kilograms.
    pub mass: f32,
    /// Center of mass in the shape's local frame.
    pub center: Vec2,
    /// Rotational inertia about `center`, in kg·m².
    pub rotational_inertia: f32,
}

/// Area, centroid, and unit-density inertia about the centroid of a
/// convex polygon. Triangles are fanned out from the first vertex to keep
/// the products small.
pub(crate) fn polygon_integrals(vertices: &[Vec2]) -> (f32, Vec2, f32) {
    const INV3: f32 = 1.0 / 3.0;
    let origin = vertices[0];
    let mut area = 0.0;
    let mut center = Vec2::ZERO;
    let mut inertia = 0.0;

    for i in 1..vertices.len().saturating_sub(1) {
        let e1 = vertices[i] - origin;
        let e2 = vertices[i + 1] - origin;
        let d = e1.cross(e2);
        let tri_area = 0.5 * d;
        area += tri_area;
        center += tri_area * INV3 * (e1 + e2);

        let int_x2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
        let int_y2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
        inertia += (0.25 * INV3 * d) * (int_x2 + int_y2);
    }

    if area <= f32::EPSILON {
        return (area, origin, 0.0);
    }
    center = center / area;
    // Shift the inertia from `origin` to the centroid.
    let inertia = inertia - area * center.dot(center);
    (area, origin + center, inertia)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_square_integrals() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let (area, centroid, inertia) = polygon_integrals(&square);
        assert_relative_eq!(area, 1.0);
        assert_relative_eq!(centroid.x, 0.5);
        assert_relative_eq!(centroid.y, 0.5);
        // (w^2 + h^2) / 12 for unit density.
        assert_relative_eq!(inertia, 1.0 / 6.0, epsilon = 1e-6);
    }

    #[test]
    fn right_triangle_centroid() {
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(0.0, 3.0)];
        let (area, centroid, _) = polygon_integrals(&tri);
        assert_relative_eq!(area, 4.5);
        assert_relative_eq!(centroid.x, 1.0);
        assert_relative_eq!(centroid.y, 1.0);
    }
}
