//! Shape construction through an allocator.
//!
//! [`ShapeFactory`] is the only way to obtain a [`Shape`]. It validates
//! the geometry, places the shape in memory served by the factory's
//! allocator, and returns a [`ShapeHandle`] that owns that memory.

use std::fmt;
use std::ops::Deref;

use plinth_alloc::{Allocator, SystemAllocator};
use plinth_core::Vec2;

use crate::circle::Circle;
use crate::error::GeomError;
use crate::hull::Hull;
use crate::polygon::{make_box, make_offset_box, make_polygon, make_polygon_from_points, Polygon};
use crate::raw::AllocBox;
use crate::shape::Shape;

/// Builds shapes in memory served by an allocator.
///
/// Handles borrow the factory, so every shape is released before the
/// factory (and its allocator) goes away. A factory over `&ArenaAllocator`
/// also keeps the arena borrowed, so it cannot be reset under a live
/// shape:
///
/// ```compile_fail
/// use plinth_alloc::ArenaAllocator;
/// use plinth_core::Vec2;
/// use plinth_geom::ShapeFactory;
///
/// let mut arena = ArenaAllocator::new();
/// let factory = ShapeFactory::new(&arena);
/// let ball = factory.circle(Vec2::ZERO, 1.0).unwrap();
/// arena.reset();
/// assert_eq!(ball.radius(), 1.0);
/// ```
pub struct ShapeFactory<A: Allocator = SystemAllocator> {
    allocator: A,
}

impl<A: Allocator> ShapeFactory<A> {
    /// Factory placing shapes through `allocator`.
    pub fn new(allocator: A) -> Self {
        Self { allocator }
    }

    /// The allocator shapes are placed through.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    fn place(&self, shape: Shape) -> ShapeHandle<'_, A> {
        let boxed = AllocBox::new(&self.allocator, shape);
        log::trace!("placed {} shape at {:#x}", boxed.shape_type(), boxed.addr());
        ShapeHandle { boxed }
    }

    /// Circle of `radius` centered at `center` in the local frame.
    pub fn circle(&self, center: Vec2, radius: f32) -> Result<ShapeHandle<'_, A>, GeomError> {
        Ok(self.place(Shape::circle(Circle::new(center, radius)?)))
    }

    /// Place already-validated circle geometry.
    pub fn from_circle(&self, circle: Circle) -> ShapeHandle<'_, A> {
        self.place(Shape::circle(circle))
    }

    /// Convex polygon from an unordered point cloud.
    ///
    /// Fails with [`GeomError::DegenerateHull`] when the points have no
    /// usable hull.
    pub fn polygon(&self, points: &[Vec2]) -> Result<ShapeHandle<'_, A>, GeomError> {
        Ok(self.place(Shape::polygon(make_polygon_from_points(points)?)))
    }

    /// Convex polygon from a precomputed hull.
    pub fn polygon_from_hull(&self, hull: &Hull) -> Result<ShapeHandle<'_, A>, GeomError> {
        Ok(self.place(Shape::polygon(make_polygon(hull)?)))
    }

    /// Place already-validated polygon geometry.
    pub fn from_polygon(&self, polygon: Polygon) -> ShapeHandle<'_, A> {
        self.place(Shape::polygon(polygon))
    }

    /// Axis-aligned box centered on the local origin.
    pub fn box_shape(
        &self,
        half_width: f32,
        half_height: f32,
    ) -> Result<ShapeHandle<'_, A>, GeomError> {
        Ok(self.place(Shape::polygon(make_box(half_width, half_height)?)))
    }

    /// Box centered at `center` and rotated by `angle` in the local frame.
    pub fn offset_box(
        &self,
        half_width: f32,
        half_height: f32,
        center: Vec2,
        angle: f32,
    ) -> Result<ShapeHandle<'_, A>, GeomError> {
        let polygon = make_offset_box(half_width, half_height, center, angle)?;
        Ok(self.place(Shape::polygon(polygon)))
    }
}

impl Default for ShapeFactory<SystemAllocator> {
    fn default() -> Self {
        Self::new(SystemAllocator)
    }
}

/// Owning handle to a [`Shape`] placed by a [`ShapeFactory`].
///
/// Dereferences to `&Shape`; share the shape by handing out that
/// reference. Dropping the handle (or calling [`release`](Self::release))
/// ends the shape's lifetime and frees its memory through the allocator
/// that created it.
pub struct ShapeHandle<'a, A: Allocator = SystemAllocator> {
    boxed: AllocBox<'a, Shape, A>,
}

impl<'a, A: Allocator> ShapeHandle<'a, A> {
    /// Borrow the shape.
    pub fn shape(&self) -> &Shape {
        &self.boxed
    }

    /// The allocator holding this shape.
    pub fn allocator(&self) -> &'a A {
        self.boxed.allocator()
    }

    /// Release the shape now.
    pub fn release(self) {
        log::trace!("released shape at {:#x}", self.boxed.addr());
        drop(self);
    }
}

impl<A: Allocator> Deref for ShapeHandle<'_, A> {
    type Target = Shape;

    fn deref(&self) -> &Shape {
        &self.boxed
    }
}

impl<A: Allocator> AsRef<Shape> for ShapeHandle<'_, A> {
    fn as_ref(&self) -> &Shape {
        &self.boxed
    }
}

impl<A: Allocator> fmt::Debug for ShapeHandle<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeHandle")
            .field("addr", &format_args!("{:#x}", self.boxed.addr()))
            .field("shape", self.shape())
            .finish()
    }
}
