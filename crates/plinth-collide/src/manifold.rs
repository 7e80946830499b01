//! Contact manifolds and persistent contact keys.
//!
//! A [`LocalManifold`] is what a narrow-phase algorithm produces: compact,
//! frame-relative, and cheap to copy. [`WorldManifold`] expands it into
//! world-space points, separations, and a normal for a given pair of
//! transforms.

use std::fmt;

use plinth_core::{Transform, Vec2, MAX_MANIFOLD_POINTS};
use smallvec::SmallVec;

/// Which frame the reference data of a [`LocalManifold`] lives in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ManifoldKind {
    /// Circle contact. The reference point is shape A's center; the
    /// normal is derived from the world positions.
    #[default]
    Circles,
    /// Reference face on shape A; points are in shape B's frame.
    FaceA,
    /// Reference face on shape B; points are in shape A's frame.
    FaceB,
}

/// Kind of feature a contact point touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FeatureType {
    /// A polygon vertex (or a circle).
    #[default]
    Vertex = 0,
    /// A polygon edge.
    Face = 1,
}

/// The features on each shape that generated a contact point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContactFeature {
    /// Feature index on shape A.
    pub index_a: u8,
    /// Feature index on shape B.
    pub index_b: u8,
    /// Feature type on shape A.
    pub type_a: FeatureType,
    /// Feature type on shape B.
    pub type_b: FeatureType,
}

impl ContactFeature {
    /// The same contact seen from the other shape.
    pub fn swapped(self) -> Self {
        Self {
            index_a: self.index_b,
            index_b: self.index_a,
            type_a: self.type_b,
            type_b: self.type_a,
        }
    }

    /// Pack into a [`ContactKey`].
    pub fn key(self) -> ContactKey {
        ContactKey(
            u32::from(self.index_a)
                | u32::from(self.index_b) << 8
                | u32::from(self.type_a as u8) << 16
                | u32::from(self.type_b as u8) << 24,
        )
    }
}

/// Persistent identity of a contact point.
///
/// Two manifolds computed on consecutive steps for the same pair report
/// the same key for "the same" contact, which lets a solver carry
/// accumulated impulses forward. Circle contacts always use key 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactKey(u32);

impl ContactKey {
    /// Key of every circle contact.
    pub const ZERO: ContactKey = ContactKey(0);

    /// Raw packed value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Unpack the feature pair.
    pub fn feature(self) -> ContactFeature {
        let ty = |bits: u32| {
            if bits & 0xff == FeatureType::Face as u32 {
                FeatureType::Face
            } else {
                FeatureType::Vertex
            }
        };
        ContactFeature {
            index_a: (self.0 & 0xff) as u8,
            index_b: (self.0 >> 8 & 0xff) as u8,
            type_a: ty(self.0 >> 16),
            type_b: ty(self.0 >> 24),
        }
    }
}

impl From<ContactFeature> for ContactKey {
    fn from(feature: ContactFeature) -> Self {
        feature.key()
    }
}

impl fmt::Display for ContactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// One contact point of a [`LocalManifold`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManifoldPoint {
    /// Point in the incident shape's local frame (see [`ManifoldKind`]).
    pub local_point: Vec2,
    /// Persistent identity.
    pub key: ContactKey,
}

/// Frame-relative contact description produced by one algorithm run.
///
/// An empty manifold (no points) means the shapes do not touch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalManifold {
    /// Which shape holds the reference data.
    pub kind: ManifoldKind,
    /// Reference point in the reference shape's frame.
    pub local_point: Vec2,
    /// Reference normal in the reference shape's frame. Zero for
    /// [`ManifoldKind::Circles`].
    pub local_normal: Vec2,
    /// Zero to [`MAX_MANIFOLD_POINTS`] contact points.
    pub points: SmallVec<[ManifoldPoint; MAX_MANIFOLD_POINTS]>,
}

impl LocalManifold {
    /// A manifold with no contact.
    pub fn empty() -> Self {
        Self::default()
    }

    /// No contact points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of contact points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

/// World-space view of a [`LocalManifold`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldManifold {
    /// Unit normal pointing from shape A to shape B.
    pub normal: Vec2,
    points: [Vec2; MAX_MANIFOLD_POINTS],
    separations: [f32; MAX_MANIFOLD_POINTS],
    count: usize,
}

impl WorldManifold {
    /// Evaluate `manifold` for shapes at `xf_a` and `xf_b` with the given
    /// collision radii (circle radius, or polygon skin radius).
    ///
    /// Each world point lies midway between the two surfaces; each
    /// separation is negative when the surfaces overlap.
    pub fn new(
        manifold: &LocalManifold,
        xf_a: &Transform,
        radius_a: f32,
        xf_b: &Transform,
        radius_b: f32,
    ) -> Self {
        let mut world = Self::default();
        if manifold.is_empty() {
            return world;
        }

        match manifold.kind {
            ManifoldKind::Circles => {
                let point_a = xf_a.apply(manifold.local_point);
                let point_b = xf_b.apply(manifold.points[0].local_point);
                let normal = (point_b - point_a).try_normalize().unwrap_or(Vec2::X);
                let c_a = point_a + radius_a * normal;
                let c_b = point_b - radius_b * normal;
                world.normal = normal;
                world.push((c_a + c_b) * 0.5, (c_b - c_a).dot(normal));
            }
            ManifoldKind::FaceA => {
                let normal = xf_a.q.rotate(manifold.local_normal);
                let plane = xf_a.apply(manifold.local_point);
                world.normal = normal;
                for mp in &manifold.points {
                    let clip = xf_b.apply(mp.local_point);
                    let c_a = clip + (radius_a - (clip - plane).dot(normal)) * normal;
                    let c_b = clip - radius_b * normal;
                    world.push((c_a + c_b) * 0.5, (c_b - c_a).dot(normal));
                }
            }
            ManifoldKind::FaceB => {
                let normal = xf_b.q.rotate(manifold.local_normal);
                let plane = xf_b.apply(manifold.local_point);
                for mp in &manifold.points {
                    let clip = xf_a.apply(mp.local_point);
                    let c_b = clip + (radius_b - (clip - plane).dot(normal)) * normal;
                    let c_a = clip - radius_a * normal;
                    world.push((c_a + c_b) * 0.5, (c_a - c_b).dot(normal));
                }
                // Keep the convention that the normal points from A to B.
                world.normal = -normal;
            }
        }
        world
    }

    fn push(&mut self, point: Vec2, separation: f32) {
        self.points[self.count] = point;
        self.separations[self.count] = separation;
        self.count += 1;
    }

    /// World contact points.
    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.count]
    }

    /// Signed separation per point; negative means overlap.
    pub fn separations(&self) -> &[f32] {
        &self.separations[..self.count]
    }
}
