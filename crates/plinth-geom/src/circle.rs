//! Circle geometry.

use std::f32::consts::PI;

use plinth_core::{Aabb, Transform, Vec2};

use crate::error::GeomError;
use crate::mass::MassData;

/// A solid circle: local center and radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    center: Vec2,
    radius: f32,
}

impl Circle {
    /// Circle centered at `center` in the shape's local frame.
    pub fn new(center: Vec2, radius: f32) -> Result<Self, GeomError> {
        if !center.is_finite() {
            return Err(GeomError::NonFinite {
                parameter: "center",
            });
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeomError::InvalidRadius { radius });
        }
        Ok(Self { center, radius })
    }

    /// Local center.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Enclosed area.
    pub fn area(&self) -> f32 {
        PI * self.radius * self.radius
    }

    /// Rotational inertia about the center for the given mass.
    pub fn inertia(&self, mass: f32) -> f32 {
        0.5 * mass * self.radius * self.radius
    }

    /// Mass properties at `density`.
    pub fn mass_data(&self, density: f32) -> MassData {
        let mass = density * self.area();
        MassData {
            mass,
            center: self.center,
            rotational_inertia: self.inertia(mass),
        }
    }

    /// World point `p` lies inside the circle placed at `xf`.
    pub fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        xf.apply(self.center).distance_squared(p) <= self.radius * self.radius
    }

    /// Bounding box of the circle placed at `xf`.
    pub fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let c = xf.apply(self.center);
        let r = Vec2::new(self.radius, self.radius);
        Aabb::new(c - r, c + r)
    }
}
