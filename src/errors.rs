//! Errors and warnings reported by arrangement construction

use crate::config::EngineKind;
use std::fmt::Display;
use std::time::Duration;

/// Pipeline stage an error or warning originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Input checks, vertex deduplication and degenerate facet removal
    Preparation,
    /// Pairwise intersection and re-triangulation
    Subdivision,
    /// Post-construction conformity check
    Validation,
    /// Grouping facets into patches
    Patches,
    /// Radial ordering, nesting and cell labelling
    Cells,
    /// Winding number propagation
    Winding,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Preparation => "preparation",
            Stage::Subdivision => "subdivision",
            Stage::Validation => "validation",
            Stage::Patches => "patch extraction",
            Stage::Cells => "cell extraction",
            Stage::Winding => "winding propagation",
        };
        f.write_str(name)
    }
}

/// Malformed input. Always fatal: the input cannot be interpreted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// (IndexOutOfRange) A facet references a vertex that does not exist
    #[error("(IndexOutOfRange) facet {facet} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        facet: usize,
        index: usize,
        vertex_count: usize,
    },
    /// (NonFiniteCoordinate) A vertex coordinate is NaN or infinite
    #[error("(NonFiniteCoordinate) vertex {vertex} has a NaN or infinite coordinate")]
    NonFiniteCoordinate { vertex: usize },
    /// (LabelMismatch) A per-facet label array has the wrong length
    #[error("(LabelMismatch) `{name}` has {actual} entries but there are {expected} facets")]
    LabelMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// All the ways an arrangement computation can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrangementError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// (PrecisionExceeded) The selected engine cannot resolve the input exactly.
    /// Recoverable by selecting [`EngineKind::Mesh`].
    #[error("(PrecisionExceeded) the {engine} engine cannot resolve coordinate {value:e} of vertex {vertex} exactly")]
    PrecisionExceeded {
        engine: EngineKind,
        vertex: usize,
        value: f64,
    },

    /// (NonConforming) An internal invariant was violated. This is an engine
    /// defect and is never produced for valid degenerate input.
    #[error("(NonConforming) during {stage}, facets {facets:?}: {details}")]
    NonConforming {
        stage: Stage,
        facets: Vec<usize>,
        details: String,
    },

    /// (EngineUnavailable) The engine was compiled out
    #[error("(EngineUnavailable) the {0} engine requires a crate feature that is not enabled")]
    EngineUnavailable(EngineKind),

    /// (InvalidCell) A query referenced a cell that does not exist
    #[error("(InvalidCell) cell {cell} does not exist, the arrangement has {count} cells")]
    InvalidCell { cell: usize, count: usize },

    /// (TimeLimitExceeded) The caller-imposed wall-clock guard fired
    #[error("(TimeLimitExceeded) {limit:?} exceeded after {stage}")]
    TimeLimitExceeded { stage: Stage, limit: Duration },
}

impl ArrangementError {
    pub(crate) fn non_conforming(stage: Stage, facets: Vec<usize>, details: impl Into<String>) -> Self {
        ArrangementError::NonConforming {
            stage,
            facets,
            details: details.into(),
        }
    }
}

/// Result type for arrangement operations.
pub type ArrangementResult<T> = Result<T, ArrangementError>;

/// Non-fatal conditions reported alongside a successful arrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrangementWarning {
    /// Zero-area or repeated-vertex input facets that were dropped
    DroppedDegenerateFacets { facets: Vec<usize> },
    /// Coplanar overlapping facets collapsed into shared output facets
    MergedCoplanarFacets { count: usize },
    /// A bounded cell with zero volume, bounded by coincident facets
    DegenerateCell { cell: usize },
    /// A cell whose winding vector could not be derived from the exterior
    UnreachableCell { cell: usize },
    /// Crossing `patch` disagrees with an already assigned winding number of `mesh`.
    /// Happens for open or inconsistently oriented inputs.
    InconsistentWinding { mesh: usize, patch: usize },
}

impl Display for ArrangementWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrangementWarning::DroppedDegenerateFacets { facets } => {
                write!(f, "(DroppedDegenerateFacets) {} degenerate facets dropped: {:?}", facets.len(), facets)
            },
            ArrangementWarning::MergedCoplanarFacets { count } => {
                write!(f, "(MergedCoplanarFacets) {} coincident facets merged", count)
            },
            ArrangementWarning::DegenerateCell { cell } => {
                write!(f, "(DegenerateCell) cell {} has zero volume", cell)
            },
            ArrangementWarning::UnreachableCell { cell } => {
                write!(f, "(UnreachableCell) cell {} is not reachable from the exterior", cell)
            },
            ArrangementWarning::InconsistentWinding { mesh, patch } => {
                write!(f, "(InconsistentWinding) mesh {} has no consistent winding across patch {}", mesh, patch)
            },
        }
    }
}
