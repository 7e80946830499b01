//! Shape-type dispatch.
//!
//! A [`DispatchTable`] maps every ordered pair of [`ShapeType`]s to an
//! [`AlgorithmId`]. Registration is symmetric, so `(Circle, Polygon)` and
//! `(Polygon, Circle)` always select the same algorithm; the algorithm
//! itself sorts out which shape is the reference.
//!
//! A [`Dispatcher`] resolves a complete table once, owns one instance of
//! each algorithm, and from then on dispatch is two array reads.

use plinth_core::ShapeType;

use crate::algorithm::{AlgorithmId, CollisionAlgorithm};
use crate::algorithms::{CircleCircle, CirclePolygon, PolygonPolygon};
use crate::error::DispatchError;
use crate::manifold::LocalManifold;
use crate::pair::PairEntry;

const N: usize = ShapeType::COUNT;

// ── DispatchTable ───────────────────────────────────────────────

/// Symmetric `[ShapeType][ShapeType] -> AlgorithmId` matrix under
/// construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchTable {
    cells: [[Option<AlgorithmId>; N]; N],
}

impl DispatchTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table every [`Dispatcher::new`] uses.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .register(ShapeType::Circle, ShapeType::Circle, AlgorithmId::CircleCircle)
            .register(ShapeType::Circle, ShapeType::Polygon, AlgorithmId::CirclePolygon)
            .register(ShapeType::Polygon, ShapeType::Polygon, AlgorithmId::PolygonPolygon);
        table
    }

    /// Select `id` for the unordered pair `{a, b}`. Writes both `[a][b]`
    /// and `[b][a]`; a later registration replaces an earlier one.
    pub fn register(&mut self, a: ShapeType, b: ShapeType, id: AlgorithmId) -> &mut Self {
        self.cells[a.index()][b.index()] = Some(id);
        self.cells[b.index()][a.index()] = Some(id);
        self
    }

    /// Algorithm registered for `(a, b)`, if any.
    pub fn get(&self, a: ShapeType, b: ShapeType) -> Option<AlgorithmId> {
        self.cells[a.index()][b.index()]
    }

    /// Every cell is filled.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// Freeze into a fully populated matrix, or report the first gap or
    /// mismatched algorithm in row-major order.
    pub fn resolve(&self) -> Result<[[AlgorithmId; N]; N], DispatchError> {
        let mut out = [[AlgorithmId::CircleCircle; N]; N];
        for a in ShapeType::ALL {
            for b in ShapeType::ALL {
                let id = self.get(a, b).ok_or(DispatchError::Unregistered { a, b })?;
                if !id.handles(a, b) {
                    return Err(DispatchError::Incompatible { a, b, id });
                }
                out[a.index()][b.index()] = id;
            }
        }
        Ok(out)
    }
}

// ── Dispatcher ──────────────────────────────────────────────────

/// Selects and runs the collision algorithm for a pair.
///
/// Holds the three algorithms for its whole lifetime. Immutable after
/// construction and shareable across threads.
#[derive(Debug)]
pub struct Dispatcher {
    table: [[AlgorithmId; N]; N],
    circle_circle: CircleCircle,
    circle_polygon: CirclePolygon,
    polygon_polygon: PolygonPolygon,
}

// Compile-time assertion: a Dispatcher can be shared by worker threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send_sync::<Dispatcher>();
    }
};

impl Dispatcher {
    /// Dispatcher over [`DispatchTable::standard`].
    pub fn new() -> Self {
        match Self::with_table(&DispatchTable::standard()) {
            Ok(dispatcher) => dispatcher,
            Err(e) => unreachable!("standard dispatch table resolves: {e}"),
        }
    }

    /// Dispatcher over a custom table.
    ///
    /// Fails with [`DispatchError::Unregistered`] if any cell is empty and
    /// with [`DispatchError::Incompatible`] if a cell names an algorithm
    /// that cannot handle its pair.
    pub fn with_table(table: &DispatchTable) -> Result<Self, DispatchError> {
        Ok(Self {
            table: table.resolve()?,
            circle_circle: CircleCircle,
            circle_polygon: CirclePolygon,
            polygon_polygon: PolygonPolygon,
        })
    }

    /// The algorithm instance for `id`.
    pub fn algorithm(&self, id: AlgorithmId) -> &dyn CollisionAlgorithm {
        match id {
            AlgorithmId::CircleCircle => &self.circle_circle,
            AlgorithmId::CirclePolygon => &self.circle_polygon,
            AlgorithmId::PolygonPolygon => &self.polygon_polygon,
        }
    }

    /// Id selected for `(a, b)`.
    pub fn algorithm_id(&self, a: ShapeType, b: ShapeType) -> AlgorithmId {
        self.table[a.index()][b.index()]
    }

    /// The algorithm selected for `(a, b)`.
    pub fn algorithm_for(&self, a: ShapeType, b: ShapeType) -> &dyn CollisionAlgorithm {
        self.algorithm(self.algorithm_id(a, b))
    }

    /// Run the selected algorithm on `pair`.
    ///
    /// # Panics
    ///
    /// Panics if the pair is already flagged as colliding.
    pub fn execute(&self, pair: &mut PairEntry<'_>) -> LocalManifold {
        let a = pair.shape_a().shape_type();
        let b = pair.shape_b().shape_type();
        self.algorithm_for(a, b).execute(pair)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
