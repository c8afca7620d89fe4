//! Grouping output facets into patches.
//!
//! A patch is a maximal edge-connected set of facets that can be crossed as
//! one sheet: neighbouring facets meet at a manifold edge, traverse it in
//! opposite directions and carry the same winding jumps.

use crate::float_types::Real;
use crate::mesh::{ConformingMesh, Jump};
use crate::union_find::UnionFind;
use nalgebra::Vector3;
use std::collections::BTreeMap;

/// Undirected edge `(low, high)` to the facets containing it, in facet order.
pub(crate) type EdgeMap = BTreeMap<(usize, usize), Vec<usize>>;

/// A connected sheet of output facets.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Output facets, ascending.
    pub facets: Vec<usize>,
    /// Winding change when crossing from the positive to the negative side.
    pub jumps: Vec<Jump>,
    /// Total area, from rounded vertex positions.
    pub area: Real,
    /// Sum of the facets' area vectors. Zero for a closed patch.
    pub orientation: Vector3<Real>,
    /// Cell on the positive (normal) side and on the negative side.
    pub cells: [usize; 2],
    /// `true` if the patch borders a zero-volume cell.
    pub degenerate: bool,
}

impl Patch {
    pub const fn positive_cell(&self) -> usize {
        self.cells[0]
    }

    pub const fn negative_cell(&self) -> usize {
        self.cells[1]
    }

    /// `true` if the same cell lies on both sides.
    pub const fn is_sheet(&self) -> bool {
        self.cells[0] == self.cells[1]
    }
}

pub(crate) fn edge_map(mesh: &ConformingMesh) -> EdgeMap {
    let mut edges = EdgeMap::new();
    for (f, facet) in mesh.facets.iter().enumerate() {
        for (u, v) in facet.edges() {
            edges.entry((u.min(v), u.max(v))).or_default().push(f);
        }
    }
    edges
}

/// `true` if the two facets of a manifold edge belong to the same patch.
pub(crate) fn joins(mesh: &ConformingMesh, (u, v): (usize, usize), incident: &[usize]) -> bool {
    let [f, g] = incident else {
        return false;
    };
    let (f, g) = (&mesh.facets[*f], &mesh.facets[*g]);
    f.has_directed_edge(u, v) != g.has_directed_edge(u, v) && f.jumps == g.jumps
}

/// Patch id per facet and the patches, numbered by their lowest facet.
/// Cells are filled in by cell extraction.
pub(crate) fn build_patches(mesh: &ConformingMesh, edges: &EdgeMap) -> (Vec<usize>, Vec<Patch>) {
    let mut sets = UnionFind::new(mesh.facets.len());
    for (&edge, incident) in edges {
        if joins(mesh, edge, incident) {
            sets.union(incident[0], incident[1]);
        }
    }
    let (facet_patch, count) = sets.labels();

    let mut patches: Vec<Patch> = (0..count)
        .map(|_| Patch {
            facets: Vec::new(),
            jumps: Vec::new(),
            area: 0.0,
            orientation: Vector3::zeros(),
            cells: [0, 0],
            degenerate: false,
        })
        .collect();

    for (f, facet) in mesh.facets.iter().enumerate() {
        let patch = &mut patches[facet_patch[f]];
        if patch.facets.is_empty() {
            patch.jumps = facet.jumps.clone();
        }
        patch.facets.push(f);

        let [a, b, c] = facet.vertices.map(|v| mesh.points[v].exact.to_point());
        let normal = (b - a).cross(&(c - a)) * 0.5;
        patch.area += normal.norm();
        patch.orientation += normal;
    }
    (facet_patch, patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelPoint;
    use crate::mesh::OutputFacet;

    fn mesh(points: &[[f64; 3]], facets: &[([usize; 3], i32)]) -> ConformingMesh {
        ConformingMesh {
            points: points.iter().map(|p| KernelPoint::from_input(*p).unwrap()).collect(),
            facets: facets
                .iter()
                .enumerate()
                .map(|(i, (f, jump))| OutputFacet {
                    vertices: *f,
                    source_facet: i,
                    mesh: 0,
                    input_facet: i,
                    jumps: vec![(0, *jump)],
                })
                .collect(),
            merged: 0,
        }
    }

    const TET: [[f64; 3]; 4] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    #[test]
    fn closed_surface_is_one_patch() {
        let m = mesh(&TET, &[([0, 2, 1], 1), ([0, 3, 2], 1), ([0, 1, 3], 1), ([1, 2, 3], 1)]);
        let edges = edge_map(&m);
        assert_eq!(edges.len(), 6);
        let (facet_patch, patches) = build_patches(&m, &edges);
        assert_eq!(facet_patch, vec![0; 4]);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].jumps, vec![(0, 1)]);
        assert!(patches[0].orientation.norm() < 1e-12);
        assert!((patches[0].area - (1.5 + 0.75f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn inconsistent_orientation_or_jumps_split_patches() {
        // both facets traverse 2 -> 0
        let flipped = mesh(&TET, &[([0, 1, 2], 1), ([2, 0, 3], 1)]);
        let (_, patches) = build_patches(&flipped, &edge_map(&flipped));
        assert_eq!(patches.len(), 2);

        let jumps = mesh(&TET, &[([0, 1, 2], 1), ([0, 3, 1], 2)]);
        let (_, patches) = build_patches(&jumps, &edge_map(&jumps));
        assert_eq!(patches.len(), 2);

        let joined = mesh(&TET, &[([0, 1, 2], 1), ([0, 3, 1], 1)]);
        let (facet_patch, patches) = build_patches(&joined, &edge_map(&joined));
        assert_eq!(facet_patch, vec![0, 0]);
        assert_eq!(patches.len(), 1);
    }

    #[test]
    fn non_manifold_edges_separate_patches() {
        let pts = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]];
        let m = mesh(&pts, &[([0, 1, 2], 1), ([1, 0, 3], 1), ([1, 0, 4], 1)]);
        let (facet_patch, patches) = build_patches(&m, &edge_map(&m));
        assert_eq!(facet_patch, vec![0, 1, 2]);
        assert_eq!(patches.len(), 3);
    }
}
