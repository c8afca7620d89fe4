//! Exact **mesh arrangements**: decompose space around one or more triangle
//! meshes into cells and label every cell with a winding number per mesh.
//!
//! The pipeline subdivides all facets along their mutual intersections into a
//! conforming mesh, groups the result into patches, finds the cells bounded by
//! those patches and propagates winding numbers outward from the exterior.
//! Boolean results (union, intersection, difference, xor) are read off the
//! labelled cells without any further geometry.
//!
//! Every decision is taken by exact predicates on rational coordinates;
//! floating-point values only appear in the output vertex positions.
//!
//! # Features
//! #### Default
//! - **parry**: the [`EngineKind::Backend`] engine, with its broad phase on
//!   `parry3d-f64`'s `Qbvh`
//!
//! #### Optional
//! - **parallel**: use rayon for the narrow phase, the facet triangulations,
//!   validation and component placement

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod aabb;
pub mod arrangement;
pub mod bvh;
pub mod cell;
pub mod config;
pub mod errors;
pub mod float_types;
pub mod kernel;
pub mod mesh;
pub mod patch;
pub mod subdivide;

mod union_find;
mod validate;
mod winding;

pub use arrangement::{Arrangement, build_arrangement};
pub use cell::Cell;
pub use config::{ArrangementConfig, CoplanarPolicy, EngineKind};
pub use errors::{ArrangementError, ArrangementResult, ArrangementWarning, InputError, Stage};
pub use mesh::{ArrangementInput, OutputFacet};
pub use patch::Patch;
