//! Test fixtures and scene generators for Plinth development.
//!
//! Point generators for hull tests live at the crate root; reusable
//! shape scenes for narrow-phase tests and benches live in [`fixtures`].
//! Everything random is driven by a seeded [`ChaCha8Rng`], so a given
//! seed always produces the same input.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::f32::consts::TAU;

use plinth_core::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use fixtures::{Scene, ShapeSpec};

/// Deterministic RNG for `seed`.
pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `count` points uniformly distributed in `[-half_extent, half_extent]^2`.
pub fn point_cloud(seed: u64, count: usize, half_extent: f32) -> Vec<Vec2> {
    let mut rng = rng(seed);
    (0..count)
        .map(|_| {
            Vec2::new(
                rng.random_range(-half_extent..=half_extent),
                rng.random_range(-half_extent..=half_extent),
            )
        })
        .collect()
}

/// `count` points uniformly distributed inside the disk of `radius`
/// around `center`.
pub fn disk_points(seed: u64, count: usize, center: Vec2, radius: f32) -> Vec<Vec2> {
    let mut rng = rng(seed);
    (0..count)
        .map(|_| {
            let r = radius * rng.random::<f32>().sqrt();
            let theta = rng.random_range(0.0..TAU);
            center + Vec2::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}

/// Vertices of a regular `count`-gon of `radius` around `center`, in
/// counter-clockwise order starting at angle `phase`.
pub fn ring_points(count: usize, center: Vec2, radius: f32, phase: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let theta = phase + TAU * i as f32 / count as f32;
            center + Vec2::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// The four corners of an axis-aligned box, counter-clockwise from the
/// lower left.
pub fn box_corners(half_width: f32, half_height: f32) -> [Vec2; 4] {
    [
        Vec2::new(-half_width, -half_height),
        Vec2::new(half_width, -half_height),
        Vec2::new(half_width, half_height),
        Vec2::new(-half_width, half_height),
    ]
}

/// Shuffle `points` in place with the RNG for `seed`.
pub fn shuffled(seed: u64, mut points: Vec<Vec2>) -> Vec<Vec2> {
    let mut rng = rng(seed);
    for i in (1..points.len()).rev() {
        let j = rng.random_range(0..=i);
        points.swap(i, j);
    }
    points
}
