//! Strategy traits for the interchangeable subdivision engines

use crate::aabb::Aabb;
use crate::config::{CoplanarPolicy, EngineKind};
use crate::errors::{ArrangementError, ArrangementResult};
use crate::float_types::within_filter_range;
use crate::kernel::Kernel;
use crate::mesh::{ArrangementInput, ConformingMesh, PreparedMesh};

/// Finds pairs of facets whose boxes intersect.
pub trait BroadPhase: Send + Sync {
    /// All pairs `(i, j)`, `i < j`, of intersecting boxes (closed intervals),
    /// sorted and without duplicates.
    fn candidate_pairs(&self, boxes: &[Aabb]) -> Vec<(usize, usize)>;
}

/// Options shared by every engine for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivisionOptions {
    pub coplanar_policy: CoplanarPolicy,
    pub delaunay: bool,
}

/// Given a prepared mesh, produce a conforming mesh with provenance.
///
/// Engines differ in their broad phase, in how orientation tests on input
/// vertices are evaluated, and in the coordinate range they accept. The
/// subdivision itself is shared.
pub trait SubdivisionEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    fn kernel(&self) -> Kernel;

    fn broad_phase(&self) -> &dyn BroadPhase;

    /// Policy used when the configuration does not choose one.
    fn default_coplanar_policy(&self) -> CoplanarPolicy;

    /// Rejects inputs the engine cannot resolve exactly.
    fn check_range(&self, _input: &ArrangementInput) -> ArrangementResult<()> {
        Ok(())
    }

    fn subdivide(&self, prepared: &PreparedMesh, options: &SubdivisionOptions) -> ArrangementResult<ConformingMesh> {
        super::subdivide_with(self.kernel(), self.broad_phase(), prepared, options)
    }
}

/// Range check shared by the engines that evaluate input predicates in `f64`.
pub(crate) fn check_filter_range(engine: EngineKind, input: &ArrangementInput) -> ArrangementResult<()> {
    for (vertex, p) in input.vertices.iter().enumerate() {
        if let Some(&value) = p.iter().find(|c| c.is_finite() && !within_filter_range(**c)) {
            return Err(ArrangementError::PrecisionExceeded { engine, vertex, value });
        }
    }
    Ok(())
}
