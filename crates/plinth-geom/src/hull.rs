//! Convex hull construction (quickhull).
//!
//! [`compute_hull`] turns an unordered point set into a counter-clockwise
//! convex boundary, or into an empty [`Hull`] when the input cannot
//! describe a usable polygon. Callers treat an empty hull as invalid
//! input, never as a polygon with fewer vertices.
//!
//! The divide-and-conquer step runs on an explicit work stack, so the
//! input size never affects call depth.

use plinth_core::{Vec2, MAX_POLYGON_VERTICES};
use smallvec::SmallVec;

/// Multiplier on `f32::EPSILON` used to derive the hull tolerance.
///
/// The tolerance is `HULL_EPSILON_SCALE * f32::EPSILON * extent`, where
/// `extent` is the largest coordinate magnitude in the input (at least 1).
/// Points closer than this to a candidate edge count as lying on it.
pub const HULL_EPSILON_SCALE: f32 = 16.0;

/// An ordered convex boundary of at most [`MAX_POLYGON_VERTICES`] points.
///
/// Vertices are counter-clockwise, starting at the input point with the
/// smallest x coordinate. An empty hull (`len() == 0`) marks degenerate
/// input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hull {
    points: [Vec2; MAX_POLYGON_VERTICES],
    count: usize,
}

impl Hull {
    /// The empty hull.
    pub const EMPTY: Hull = Hull {
        points: [Vec2::ZERO; MAX_POLYGON_VERTICES],
        count: 0,
    };

    /// Hull vertices in counter-clockwise order.
    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.count]
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when the input was degenerate.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn push(&mut self, p: Vec2) -> bool {
        if self.count == MAX_POLYGON_VERTICES {
            return false;
        }
        self.points[self.count] = p;
        self.count += 1;
        true
    }
}

impl Default for Hull {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Tolerance for a point set: scaled machine epsilon times the largest
/// coordinate magnitude, never below the unit-scale value.
fn tolerance(points: &[Vec2]) -> f32 {
    let extent = points
        .iter()
        .fold(1.0_f32, |acc, p| acc.max(p.x.abs()).max(p.y.abs()));
    HULL_EPSILON_SCALE * f32::EPSILON * extent
}

/// Signed distance of `p` to the right of the directed line `a -> b`.
/// `dir` is the unit direction of that line.
fn right_distance(a: Vec2, dir: Vec2, p: Vec2) -> f32 {
    (p - a).cross(dir)
}

/// One pending hull edge and the points still outside it.
struct Segment {
    a: Vec2,
    b: Vec2,
    outside: SmallVec<[Vec2; 16]>,
}

impl Segment {
    /// Edge `a -> b` with every point of `from` strictly right of it by
    /// more than `tol`.
    fn new(a: Vec2, b: Vec2, from: &[Vec2], tol: f32) -> Option<Self> {
        let dir = (b - a).try_normalize()?;
        let outside = from
            .iter()
            .copied()
            .filter(|&p| right_distance(a, dir, p) > tol)
            .collect();
        Some(Self { a, b, outside })
    }
}

/// Compute the convex hull of `points`.
///
/// Returns an empty hull when there are fewer than 3 points, any
/// coordinate is non-finite, all points are within tolerance of one line
/// or one point, or the hull would need more than
/// [`MAX_POLYGON_VERTICES`] vertices. The last case is logged at warn
/// level: the input is rejected rather than clipped to a subset.
pub fn compute_hull(points: &[Vec2]) -> Hull {
    if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
        return Hull::EMPTY;
    }
    let tol = tolerance(points);

    // Extremes: min x (ties -> min y) and max x (ties -> max y).
    let mut lo = points[0];
    let mut hi = points[0];
    for &p in &points[1..] {
        if p.x < lo.x || (p.x == lo.x && p.y < lo.y) {
            lo = p;
        }
        if p.x > hi.x || (p.x == hi.x && p.y > hi.y) {
            hi = p;
        }
    }
    if lo.distance(hi) <= tol {
        return Hull::EMPTY;
    }

    // Lower chain runs lo -> hi with outside points below; the upper chain
    // runs hi -> lo with outside points above. Pushed in reverse so the
    // lower chain is emitted first.
    let (Some(lower), Some(upper)) = (
        Segment::new(lo, hi, points, tol),
        Segment::new(hi, lo, points, tol),
    ) else {
        return Hull::EMPTY;
    };
    let mut stack: SmallVec<[Segment; 8]> = SmallVec::new();
    stack.push(upper);
    stack.push(lower);

    let mut hull = Hull::EMPTY;
    while let Some(segment) = stack.pop() {
        let Some(dir) = (segment.b - segment.a).try_normalize() else {
            continue;
        };
        let farthest = segment
            .outside
            .iter()
            .copied()
            .map(|p| (p, right_distance(segment.a, dir, p)))
            .fold(None, |best: Option<(Vec2, f32)>, (p, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((p, d)),
            });

        match farthest {
            None => {
                // Final edge: emit its start point.
                if !hull.push(segment.a) {
                    log::warn!(
                        "hull of {} points exceeds {MAX_POLYGON_VERTICES} vertices, rejected",
                        points.len()
                    );
                    return Hull::EMPTY;
                }
            }
            Some((c, _)) => {
                // Points inside triangle (a, c, b) fall in neither child.
                let right = Segment::new(c, segment.b, &segment.outside, tol);
                let left = Segment::new(segment.a, c, &segment.outside, tol);
                if let Some(right) = right {
                    stack.push(right);
                }
                if let Some(left) = left {
                    stack.push(left);
                }
            }
        }
    }

    if hull.len() < 3 {
        return Hull::EMPTY;
    }
    hull
}

/// Check that `hull` is a valid polygon boundary: 3 to
/// [`MAX_POLYGON_VERTICES`] finite vertices, counter-clockwise, strictly
/// convex at every vertex, and with every vertex on the inner side of
/// every edge (within the hull tolerance).
pub fn validate_hull(hull: &Hull) -> bool {
    let points = hull.points();
    let n = points.len();
    if !(3..=MAX_POLYGON_VERTICES).contains(&n) || points.iter().any(|p| !p.is_finite()) {
        return false;
    }
    let tol = tolerance(points);

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        if (b - a).cross(c - b) <= 0.0 {
            return false;
        }
        let Some(dir) = (b - a).try_normalize() else {
            return false;
        };
        for (j, &p) in points.iter().enumerate() {
            if j == i || j == (i + 1) % n {
                continue;
            }
            if right_distance(a, dir, p) > -tol {
                return false;
            }
        }
    }
    true
}
