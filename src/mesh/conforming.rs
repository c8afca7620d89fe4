//! The conforming mesh produced by subdivision.

use crate::kernel::KernelPoint;

/// Signed change of one mesh's winding number.
pub type Jump = (usize, i32);

/// A facet of the conforming mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFacet {
    /// Indices into [`ConformingMesh::points`], counter-clockwise seen from the positive side.
    pub vertices: [usize; 3],
    /// Facet id within the source mesh.
    pub source_facet: usize,
    pub mesh: usize,
    /// Position of the parent facet in the combined input facet array.
    pub input_facet: usize,
    /// Winding changes when crossing from the positive to the negative side,
    /// sorted by mesh, without zero entries.
    pub jumps: Vec<Jump>,
}

impl OutputFacet {
    /// Directed edges in facet order.
    pub const fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// The corner opposite to the undirected edge `{u, v}`.
    pub fn opposite(&self, u: usize, v: usize) -> Option<usize> {
        self.vertices.iter().copied().find(|&w| w != u && w != v)
    }

    /// `true` if the facet traverses `u -> v` in its own orientation.
    pub fn has_directed_edge(&self, u: usize, v: usize) -> bool {
        self.edges().contains(&(u, v))
    }
}

/// A mesh in which no two facets' interiors intersect.
#[derive(Debug, Clone, Default)]
pub struct ConformingMesh {
    pub points: Vec<KernelPoint>,
    pub facets: Vec<OutputFacet>,
    /// Output facets that stand for more than one input facet.
    pub merged: usize,
}
