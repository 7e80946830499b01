//! End-to-end narrow-phase behavior over factory-built shapes.

use approx::assert_relative_eq;
use plinth_alloc::{ArenaAllocator, ArenaConfig, FreeListAllocator, SystemAllocator};
use plinth_collide::{
    ContactKey, LocalManifold, ManifoldKind, NarrowPhase, NarrowPhaseConfig, PairEntry,
    WorldManifold,
};
use plinth_core::{Transform, Vec2};
use plinth_geom::{Shape, ShapeFactory};
use plinth_test_utils::Scene;
use proptest::prelude::*;

fn at(x: f32, y: f32) -> Transform {
    Transform::from_position(Vec2::new(x, y))
}

/// Every overlapping-bounds pair of `scene`, in broad-phase order.
fn pairs<'s>(scene: &Scene, shapes: &[&'s Shape]) -> Vec<PairEntry<'s>> {
    scene
        .candidate_pairs(shapes)
        .into_iter()
        .map(|(i, j)| PairEntry::new(shapes[i], scene.transform(i), shapes[j], scene.transform(j)))
        .collect()
}

// ── Reference cases ─────────────────────────────────────────────

#[test]
fn unit_circles_overlapping_and_apart() {
    let factory = ShapeFactory::default();
    let a = factory.circle(Vec2::ZERO, 1.0).unwrap();
    let b = factory.circle(Vec2::ZERO, 1.0).unwrap();
    let phase = NarrowPhase::new();

    let mut touching = PairEntry::new(&a, at(0.0, 0.0), &b, at(1.5, 0.0));
    let m = phase.execute(&mut touching);
    assert!(touching.is_colliding());
    assert_eq!(m.kind, ManifoldKind::Circles);
    assert_eq!(m.point_count(), 1);
    assert_eq!(m.points[0].key, ContactKey::ZERO);

    let mut apart = PairEntry::new(&a, at(0.0, 0.0), &b, at(3.0, 0.0));
    let m = phase.execute(&mut apart);
    assert!(!apart.is_colliding());
    assert!(m.is_empty());
}

#[test]
fn unit_boxes_overlapping_and_apart() {
    let factory = ShapeFactory::default();
    let a = factory.box_shape(0.5, 0.5).unwrap();
    let b = factory.box_shape(0.5, 0.5).unwrap();
    let phase = NarrowPhase::new();

    let mut along_x = PairEntry::new(&a, at(0.0, 0.0), &b, at(0.9, 0.0));
    let m = phase.execute(&mut along_x);
    assert!(along_x.is_colliding());
    assert_eq!(m.point_count(), 2);
    assert_eq!(m.local_normal, Vec2::X);

    let mut along_y = PairEntry::new(&a, at(0.0, 0.0), &b, at(0.0, 0.9));
    let m = phase.execute(&mut along_y);
    assert_eq!(m.point_count(), 2);
    assert_eq!(m.local_normal, Vec2::Y);

    let mut gap = PairEntry::new(&a, at(0.0, 0.0), &b, at(0.0, 1.2));
    assert!(phase.execute(&mut gap).is_empty());
    assert!(!gap.is_colliding());
}

#[test]
fn boxes_resting_on_a_floor() {
    let scene = Scene::box_row(5, 0.05);
    let factory = ShapeFactory::default();
    let handles = scene.build(&factory).unwrap();
    let shapes: Vec<&Shape> = handles.iter().map(|h| h.shape()).collect();
    let mut batch = pairs(&scene, &shapes);
    assert_eq!(batch.len(), 5);

    let phase = NarrowPhase::new();
    let manifolds = phase.execute_all(&mut batch);
    for (pair, m) in batch.iter().zip(&manifolds) {
        assert!(pair.is_colliding());
        assert_eq!(m.kind, ManifoldKind::FaceA);
        assert_eq!(m.point_count(), 2);

        let world = WorldManifold::new(
            m,
            pair.xf_a(),
            pair.shape_a().radius(),
            pair.xf_b(),
            pair.shape_b().radius(),
        );
        assert_relative_eq!(world.normal.y, 1.0);
        for &s in world.separations() {
            // Penetration plus both skins.
            assert_relative_eq!(s, -0.07, epsilon = 1e-4);
        }
    }
}

#[test]
fn keys_survive_a_step_of_small_motion() {
    let factory = ShapeFactory::default();
    let floor = factory.box_shape(4.0, 0.5).unwrap();
    let crate_box = factory.box_shape(0.5, 0.5).unwrap();
    let phase = NarrowPhase::new();

    let mut pair = PairEntry::new(&floor, Transform::IDENTITY, &crate_box, at(0.3, 0.96));
    let first = phase.execute(&mut pair);
    let mut pair = PairEntry::new(&floor, Transform::IDENTITY, &crate_box, at(0.31, 0.955));
    let second = phase.execute(&mut pair);

    let keys = |m: &LocalManifold| m.points.iter().map(|p| p.key).collect::<Vec<_>>();
    assert_eq!(first.point_count(), 2);
    assert_eq!(keys(&first), keys(&second));
}

// ── Batches ─────────────────────────────────────────────────────

#[test]
fn parallel_batches_match_sequential() {
    let scene = Scene::scatter(42, 300, 14.0);
    let factory = ShapeFactory::default();
    let handles = scene.build(&factory).unwrap();
    let shapes: Vec<&Shape> = handles.iter().map(|h| h.shape()).collect();

    let phase = NarrowPhase::new();
    let mut reference = pairs(&scene, &shapes);
    let expected = phase.execute_all(&mut reference);
    assert!(expected.iter().any(|m| !m.is_empty()));

    for workers in [2, 3, 8, 64] {
        let mut batch = pairs(&scene, &shapes);
        let actual = phase.execute_parallel(&mut batch, workers);
        assert_eq!(actual, expected, "{workers} workers");
        let flags: Vec<_> = batch.iter().map(PairEntry::is_colliding).collect();
        let reference_flags: Vec<_> = reference.iter().map(PairEntry::is_colliding).collect();
        assert_eq!(flags, reference_flags);
    }
}

#[test]
fn step_uses_config_and_matches_sequential() {
    let scene = Scene::scatter(7, 200, 11.0);
    let factory = ShapeFactory::default();
    let handles = scene.build(&factory).unwrap();
    let shapes: Vec<&Shape> = handles.iter().map(|h| h.shape()).collect();

    let phase = NarrowPhase::with_config(NarrowPhaseConfig {
        worker_count: Some(4),
        min_pairs_per_worker: 8,
    })
    .unwrap();
    let mut a = pairs(&scene, &shapes);
    let mut b = pairs(&scene, &shapes);
    assert_eq!(phase.step(&mut a), phase.execute_all(&mut b));
}

#[test]
fn next_step_after_clearing_flags() {
    let scene = Scene::box_row(3, 0.02);
    let factory = ShapeFactory::default();
    let handles = scene.build(&factory).unwrap();
    let shapes: Vec<&Shape> = handles.iter().map(|h| h.shape()).collect();
    let mut batch = pairs(&scene, &shapes);

    let phase = NarrowPhase::new();
    let first = phase.execute_parallel(&mut batch, 2);
    batch.iter_mut().for_each(PairEntry::clear_colliding);
    let second = phase.execute_parallel(&mut batch, 2);
    assert_eq!(first, second);
}

#[test]
#[should_panic(expected = "already colliding")]
fn re_entered_pair_panics_through_workers() {
    let factory = ShapeFactory::default();
    let ball = factory.circle(Vec2::ZERO, 1.0).unwrap();
    let phase = NarrowPhase::new();
    let mut batch: Vec<_> = (0..8)
        .map(|i| PairEntry::new(&ball, at(0.0, 0.0), &ball, at(0.5 + i as f32 * 0.1, 0.0)))
        .collect();
    phase.execute(&mut batch[5]);
    phase.execute_parallel(&mut batch, 4);
}

// ── Allocator-backed shapes ─────────────────────────────────────

#[test]
fn shapes_from_any_allocator_collide_alike() {
    let scene = Scene::scatter(3, 120, 9.0);
    let phase = NarrowPhase::new();

    let system = ShapeFactory::new(SystemAllocator);
    let system_handles = scene.build(&system).unwrap();
    let system_shapes: Vec<&Shape> = system_handles.iter().map(|h| h.shape()).collect();
    let expected = phase.execute_all(&mut pairs(&scene, &system_shapes));

    let arena = ArenaAllocator::with_config(ArenaConfig::with_capacity(4096), SystemAllocator)
        .unwrap();
    let in_arena = ShapeFactory::new(&arena);
    let arena_handles = scene.build(&in_arena).unwrap();
    let arena_shapes: Vec<&Shape> = arena_handles.iter().map(|h| h.shape()).collect();
    assert_eq!(phase.execute_parallel(&mut pairs(&scene, &arena_shapes), 4), expected);

    let free_list = ShapeFactory::new(FreeListAllocator::new());
    let list_handles = scene.build(&free_list).unwrap();
    let list_shapes: Vec<&Shape> = list_handles.iter().map(|h| h.shape()).collect();
    assert_eq!(phase.execute_parallel(&mut pairs(&scene, &list_shapes), 4), expected);
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn circles_collide_iff_closer_than_radius_sum(
        ra in 0.1f32..2.0,
        rb in 0.1f32..2.0,
        x in -5.0f32..5.0,
        y in -5.0f32..5.0,
    ) {
        let sum = ra + rb;
        let d = (x * x + y * y).sqrt();
        prop_assume!((d - sum).abs() > 1e-3);

        let factory = ShapeFactory::default();
        let a = factory.circle(Vec2::ZERO, ra).unwrap();
        let b = factory.circle(Vec2::ZERO, rb).unwrap();
        let mut pair = PairEntry::new(&a, Transform::IDENTITY, &b, at(x, y));
        let m = NarrowPhase::new().execute(&mut pair);
        prop_assert_eq!(pair.is_colliding(), d < sum);
        prop_assert_eq!(m.point_count(), usize::from(d < sum));
    }

    #[test]
    fn circle_polygon_order_does_not_change_contact(
        x in -3.0f32..3.0,
        y in -3.0f32..3.0,
        angle in -3.1f32..3.1,
        radius in 0.1f32..1.5,
    ) {
        let factory = ShapeFactory::default();
        let ball = factory.circle(Vec2::ZERO, radius).unwrap();
        let square = factory.box_shape(1.0, 0.6).unwrap();
        let xf_square = Transform::new(Vec2::ZERO, angle);
        let xf_ball = at(x, y);
        let phase = NarrowPhase::new();

        let mut forward = PairEntry::new(&square, xf_square, &ball, xf_ball);
        let mut reverse = PairEntry::new(&ball, xf_ball, &square, xf_square);
        let m1 = phase.execute(&mut forward);
        let m2 = phase.execute(&mut reverse);
        prop_assert_eq!(forward.is_colliding(), reverse.is_colliding());
        prop_assert_eq!(m1.local_point, m2.local_point);
        prop_assert_eq!(m1.local_normal, m2.local_normal);
        if !m1.is_empty() {
            prop_assert_eq!(m1.kind, ManifoldKind::FaceA);
            prop_assert_eq!(m2.kind, ManifoldKind::FaceB);
        }
    }
}
