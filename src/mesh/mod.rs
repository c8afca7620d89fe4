//! Mesh data flowing through the pipeline: the combined input, its prepared
//! form and the conforming mesh produced by subdivision.

pub mod conforming;
pub mod input;

pub use conforming::{ConformingMesh, Jump, OutputFacet};
pub use input::{ArrangementInput, InputFacet, PreparedMesh};
