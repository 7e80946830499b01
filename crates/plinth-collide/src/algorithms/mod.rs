//! The three narrow-phase algorithms.
//!
//! Each one is a stateless unit struct implementing
//! [`CollisionAlgorithm`](crate::CollisionAlgorithm). They share one
//! output convention: the reference shape owns `local_point` and
//! `local_normal`, the other shape owns each point's `local_point`.

mod circle_circle;
mod circle_polygon;
mod polygon_polygon;

pub use circle_circle::CircleCircle;
pub use circle_polygon::CirclePolygon;
pub use polygon_polygon::PolygonPolygon;

use plinth_geom::{Circle, Polygon, Shape};

#[track_caller]
fn expect_circle<'s>(shape: &'s Shape, algorithm: &str) -> &'s Circle {
    match shape.as_circle() {
        Some(circle) => circle,
        None => panic!(
            "{algorithm} received a {} shape where a circle was expected",
            shape.shape_type()
        ),
    }
}

#[track_caller]
fn expect_polygon<'s>(shape: &'s Shape, algorithm: &str) -> &'s Polygon {
    match shape.as_polygon() {
        Some(polygon) => polygon,
        None => panic!(
            "{algorithm} received a {} shape where a polygon was expected",
            shape.shape_type()
        ),
    }
}
