//! The three engine implementations and engine selection.

use crate::config::{ArrangementConfig, CoplanarPolicy, EngineKind};
use crate::errors::ArrangementResult;
use crate::kernel::Kernel;
use crate::mesh::ArrangementInput;
use crate::subdivide::broad_phase::{BvhBroadPhase, SweepAndPrune};
use crate::subdivide::traits::{BroadPhase, SubdivisionEngine, check_filter_range};

#[cfg(feature = "parry")]
use crate::subdivide::broad_phase::QbvhBroadPhase;

/// Exact rational predicates on every point, BVH broad phase. Accepts any
/// finite coordinates.
#[derive(Debug, Clone, Copy)]
pub struct MeshEngine {
    broad_phase: BvhBroadPhase,
}

impl MeshEngine {
    pub const fn new(leaf_size: usize) -> Self {
        Self {
            broad_phase: BvhBroadPhase { leaf_size },
        }
    }
}

impl SubdivisionEngine for MeshEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Mesh
    }

    fn kernel(&self) -> Kernel {
        Kernel::Rational
    }

    fn broad_phase(&self) -> &dyn BroadPhase {
        &self.broad_phase
    }

    fn default_coplanar_policy(&self) -> CoplanarPolicy {
        CoplanarPolicy::KeepSeparate
    }
}

/// Adaptive `f64` predicates on input vertices and a sweep-and-prune broad
/// phase. Coincident facets are merged by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastEngine {
    broad_phase: SweepAndPrune,
}

impl SubdivisionEngine for FastEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Fast
    }

    fn kernel(&self) -> Kernel {
        Kernel::Adaptive
    }

    fn broad_phase(&self) -> &dyn BroadPhase {
        &self.broad_phase
    }

    fn default_coplanar_policy(&self) -> CoplanarPolicy {
        CoplanarPolicy::Merge
    }

    fn check_range(&self, input: &ArrangementInput) -> ArrangementResult<()> {
        check_filter_range(self.kind(), input)
    }
}

/// Broad phase delegated to parry's quaternary BVH.
#[cfg(feature = "parry")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendEngine {
    broad_phase: QbvhBroadPhase,
}

#[cfg(feature = "parry")]
impl SubdivisionEngine for BackendEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Backend
    }

    fn kernel(&self) -> Kernel {
        Kernel::Adaptive
    }

    fn broad_phase(&self) -> &dyn BroadPhase {
        &self.broad_phase
    }

    fn default_coplanar_policy(&self) -> CoplanarPolicy {
        CoplanarPolicy::KeepSeparate
    }

    fn check_range(&self, input: &ArrangementInput) -> ArrangementResult<()> {
        check_filter_range(self.kind(), input)
    }
}

/// The engine selected by `config`.
pub fn engine_for(config: &ArrangementConfig) -> ArrangementResult<Box<dyn SubdivisionEngine>> {
    match config.engine {
        EngineKind::Mesh => Ok(Box::new(MeshEngine::new(config.bvh_leaf_size))),
        EngineKind::Fast => Ok(Box::new(FastEngine::default())),
        #[cfg(feature = "parry")]
        EngineKind::Backend => Ok(Box::new(BackendEngine::default())),
        #[cfg(not(feature = "parry"))]
        EngineKind::Backend => Err(crate::errors::ArrangementError::EngineUnavailable(EngineKind::Backend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ArrangementError;

    #[test]
    fn selection_follows_config() {
        for kind in [EngineKind::Mesh, EngineKind::Fast] {
            let engine = engine_for(&ArrangementConfig::default().with_engine(kind)).unwrap();
            assert_eq!(engine.kind(), kind);
        }
        let backend = engine_for(&ArrangementConfig::backend());
        if cfg!(feature = "parry") {
            assert_eq!(backend.unwrap().default_coplanar_policy(), CoplanarPolicy::KeepSeparate);
        } else {
            assert!(matches!(backend, Err(ArrangementError::EngineUnavailable(EngineKind::Backend))));
        }
    }

    #[test]
    fn filtered_engines_reject_huge_coordinates() {
        let input = ArrangementInput::new(vec![[1e300, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1e-300]], vec![[0, 1, 2]]);
        assert!(MeshEngine::new(8).check_range(&input).is_ok());
        match FastEngine::default().check_range(&input) {
            Err(ArrangementError::PrecisionExceeded { engine, vertex, value }) => {
                assert_eq!(engine, EngineKind::Fast);
                assert_eq!(vertex, 0);
                assert_eq!(value, 1e300);
            },
            other => panic!("unexpected {other:?}"),
        }
    }
}
