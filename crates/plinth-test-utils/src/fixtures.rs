//! Reusable shape scenes.
//!
//! A [`Scene`] is a list of shape descriptions with world transforms.
//! Building it through a [`ShapeFactory`] yields real shapes;
//! [`Scene::candidate_pairs`] plays the part of a broad phase by
//! returning every pair whose bounding boxes overlap.

use plinth_alloc::Allocator;
use plinth_core::{Transform, Vec2};
use plinth_geom::{GeomError, Shape, ShapeFactory, ShapeHandle};
use rand::Rng;

use crate::{ring_points, rng};

/// Geometry of one scene body, before it is placed in memory.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeSpec {
    Circle { radius: f32 },
    Box { half_width: f32, half_height: f32 },
    /// Regular polygon with `sides` vertices on a circle of `radius`.
    Regular { sides: usize, radius: f32 },
}

impl ShapeSpec {
    pub fn build<'f, A: Allocator>(
        &self,
        factory: &'f ShapeFactory<A>,
    ) -> Result<ShapeHandle<'f, A>, GeomError> {
        match *self {
            ShapeSpec::Circle { radius } => factory.circle(Vec2::ZERO, radius),
            ShapeSpec::Box {
                half_width,
                half_height,
            } => factory.box_shape(half_width, half_height),
            ShapeSpec::Regular { sides, radius } => {
                factory.polygon(&ring_points(sides, Vec2::ZERO, radius, 0.0))
            }
        }
    }
}

/// Shapes with world transforms.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub bodies: Vec<(ShapeSpec, Transform)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, spec: ShapeSpec, xf: Transform) -> Self {
        self.bodies.push((spec, xf));
        self
    }

    /// `count` random circles, boxes and regular polygons scattered over
    /// `[-half_extent, half_extent]^2` with random orientations. Dense
    /// enough at `half_extent ~ sqrt(count)` to produce plenty of contacts.
    pub fn scatter(seed: u64, count: usize, half_extent: f32) -> Self {
        let mut rng = rng(seed);
        let bodies = (0..count)
            .map(|_| {
                let spec = match rng.random_range(0..3) {
                    0 => ShapeSpec::Circle {
                        radius: rng.random_range(0.2..0.8),
                    },
                    1 => ShapeSpec::Box {
                        half_width: rng.random_range(0.2..0.8),
                        half_height: rng.random_range(0.2..0.8),
                    },
                    _ => ShapeSpec::Regular {
                        sides: rng.random_range(3..=8),
                        radius: rng.random_range(0.3..0.9),
                    },
                };
                let p = Vec2::new(
                    rng.random_range(-half_extent..=half_extent),
                    rng.random_range(-half_extent..=half_extent),
                );
                let angle = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
                (spec, Transform::new(p, angle))
            })
            .collect();
        Self { bodies }
    }

    /// A row of `count` unit boxes resting on a wide floor, each sunk
    /// `depth` into it. Body 0 is the floor.
    pub fn box_row(count: usize, depth: f32) -> Self {
        let floor = ShapeSpec::Box {
            half_width: count as f32 + 1.0,
            half_height: 0.5,
        };
        let mut scene = Self::new().with(floor, Transform::IDENTITY);
        for i in 0..count {
            let x = 2.0 * i as f32 - (count as f32 - 1.0);
            let xf = Transform::from_position(Vec2::new(x, 1.0 - depth));
            scene = scene.with(
                ShapeSpec::Box {
                    half_width: 0.5,
                    half_height: 0.5,
                },
                xf,
            );
        }
        scene
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Place every body through `factory`, in scene order.
    pub fn build<'f, A: Allocator>(
        &self,
        factory: &'f ShapeFactory<A>,
    ) -> Result<Vec<ShapeHandle<'f, A>>, GeomError> {
        self.bodies.iter().map(|(spec, _)| spec.build(factory)).collect()
    }

    pub fn transform(&self, index: usize) -> Transform {
        self.bodies[index].1
    }

    /// Index pairs `(i, j)`, `i < j`, whose world bounding boxes overlap.
    pub fn candidate_pairs(&self, shapes: &[&Shape]) -> Vec<(usize, usize)> {
        assert_eq!(shapes.len(), self.len(), "one shape per scene body");
        let boxes: Vec<_> = shapes
            .iter()
            .zip(&self.bodies)
            .map(|(shape, (_, xf))| shape.compute_aabb(xf))
            .collect();
        let mut pairs = Vec::new();
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                if boxes[i].overlaps(&boxes[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
