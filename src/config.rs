//! Configuration and presets for arrangement construction.
//!
//! [`ArrangementConfig`] selects the subdivision engine and controls how
//! coplanar overlaps are represented, whether the output is validated, and
//! an optional wall-clock guard.
//!
//! # Example
//!
//! ```
//! use mesh_arrangement::{ArrangementConfig, CoplanarPolicy, EngineKind};
//!
//! let config = ArrangementConfig::fast()
//!     .with_coplanar_policy(CoplanarPolicy::KeepSeparate)
//!     .with_validation(false);
//! assert_eq!(config.engine, EngineKind::Fast);
//! ```

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Interchangeable subdivision engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineKind {
    /// Exact rational predicates everywhere, BVH broad phase.
    #[default]
    Mesh,
    /// Adaptive floating-point filters on input points, sweep-and-prune broad phase.
    Fast,
    /// Broad phase delegated to parry's `Qbvh`.
    Backend,
}

impl Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EngineKind::Mesh => "mesh",
            EngineKind::Fast => "fast",
            EngineKind::Backend => "backend",
        })
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mesh" => Ok(EngineKind::Mesh),
            "fast" => Ok(EngineKind::Fast),
            "backend" | "parry" => Ok(EngineKind::Backend),
            other => Err(format!("unknown engine: {other}")),
        }
    }
}

/// How coplanar facets with overlapping interiors are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoplanarPolicy {
    /// Every covering input facet keeps its own copy of the overlap region.
    /// The copies bound zero-volume cells, which are reported.
    KeepSeparate,
    /// The overlap region is emitted once; its winding jump accumulates the
    /// contribution of every covering facet.
    Merge,
}

/// Configuration for [`crate::build_arrangement`].
#[derive(Debug, Clone)]
pub struct ArrangementConfig {
    /// Subdivision engine.
    pub engine: EngineKind,

    /// Coplanar overlap policy. `None` uses the engine's default.
    pub coplanar_policy: Option<CoplanarPolicy>,

    /// Check the conforming mesh before building patches and cells. On by
    /// default in debug builds, except for the fast engine.
    pub validate: bool,

    /// Lawson-flip unconstrained edges of re-triangulated facets.
    pub delaunay: bool,

    /// Wall-clock guard checked between stages.
    pub time_limit: Option<Duration>,

    /// Maximum facets per BVH leaf for the mesh engine.
    pub bvh_leaf_size: usize,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            coplanar_policy: None,
            validate: cfg!(debug_assertions),
            delaunay: true,
            time_limit: None,
            bvh_leaf_size: 8,
        }
    }
}

impl ArrangementConfig {
    /// Exact robust construction.
    pub fn mesh() -> Self {
        Self::default()
    }

    /// Faster construction; merges coincident facets by default and skips
    /// validation.
    pub fn fast() -> Self {
        Self {
            engine: EngineKind::Fast,
            validate: false,
            ..Self::default()
        }
    }

    /// Construction with the broad phase delegated to parry.
    pub fn backend() -> Self {
        Self {
            engine: EngineKind::Backend,
            ..Self::default()
        }
    }

    pub const fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub const fn with_coplanar_policy(mut self, policy: CoplanarPolicy) -> Self {
        self.coplanar_policy = Some(policy);
        self
    }

    pub const fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub const fn with_delaunay(mut self, delaunay: bool) -> Self {
        self.delaunay = delaunay;
        self
    }

    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub const fn with_bvh_leaf_size(mut self, leaf_size: usize) -> Self {
        self.bvh_leaf_size = leaf_size;
        self
    }
}
