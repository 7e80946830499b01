//! Benchmark scenes for the Plinth collision kernel.
//!
//! - [`reference_scene`]: 1,000 mixed bodies, a few thousand candidate pairs
//! - [`stress_scene`]: 10,000 mixed bodies at the same density
//! - [`build_pairs`]: brute-force candidate pairs for a built scene

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use plinth_collide::PairEntry;
use plinth_geom::Shape;
use plinth_test_utils::Scene;

/// Bodies per unit of area in both profiles.
const DENSITY: f32 = 1.25;

fn scene_of(seed: u64, bodies: usize) -> Scene {
    let half_extent = 0.5 * (bodies as f32 / DENSITY).sqrt();
    Scene::scatter(seed, bodies, half_extent)
}

/// 1,000 circles, boxes and regular polygons.
pub fn reference_scene(seed: u64) -> Scene {
    scene_of(seed, 1_000)
}

/// 10,000 bodies at the density of [`reference_scene`].
pub fn stress_scene(seed: u64) -> Scene {
    scene_of(seed, 10_000)
}

/// Fresh pair entries for every overlapping-bounds pair of `scene`.
///
/// `shapes` must hold one shape per scene body, in scene order.
pub fn build_pairs<'s>(scene: &Scene, shapes: &[&'s Shape]) -> Vec<PairEntry<'s>> {
    scene
        .candidate_pairs(shapes)
        .into_iter()
        .map(|(i, j)| PairEntry::new(shapes[i], scene.transform(i), shapes[j], scene.transform(j)))
        .collect()
}
