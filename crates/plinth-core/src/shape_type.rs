//! The [`ShapeType`] tag used to index the dispatch table.

use std::fmt;

/// Discriminant of a collision shape.
///
/// Boxes are polygons and share this tag. The numeric value is the
/// row/column index into the dispatch matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ShapeType {
    /// A circle (center + radius).
    Circle = 0,
    /// A convex polygon (including boxes).
    Polygon = 1,
}

impl ShapeType {
    /// Number of distinct shape types.
    pub const COUNT: usize = 2;

    /// All shape types in index order.
    pub const ALL: [ShapeType; Self::COUNT] = [ShapeType::Circle, ShapeType::Polygon];

    /// Index into per-type tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "circle"),
            Self::Polygon => write!(f, "polygon"),
        }
    }
}
