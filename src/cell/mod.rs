//! Cell extraction.
//!
//! Every patch has two sides. Sides that face the same region of space are
//! merged with a union-find over side slots: around each non-manifold or
//! non-joining edge, neighbouring facets in radial order bound a common
//! wedge. Surface components that share no edge are placed relative to each
//! other by shooting exact segments from a point outside the bounding box.
//! Cell `0` is the unbounded exterior.

pub(crate) mod radial;
pub(crate) mod ray;

use crate::errors::{ArrangementError, ArrangementResult, ArrangementWarning, Stage};
use crate::float_types::Real;
use crate::kernel::exact::{integer, to_real};
use crate::kernel::predicates::orient3d_value;
use crate::kernel::{ExactPoint, Orientation, Rational};
use crate::mesh::ConformingMesh;
use crate::patch::{EdgeMap, Patch, joins};
use crate::union_find::UnionFind;
use num_traits::Zero;
use radial::{Rank, radial_order};
use ray::{FAR_OFFSETS, Shot, TARGET_WEIGHTS, shoot};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Ray targets tried per component before giving up.
const MAX_TARGET_FACETS: usize = 16;

/// A connected region of space bounded by patches. Cell `0` is the exterior.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Patches on the cell boundary, ascending.
    pub patches: Vec<usize>,
    /// Enclosed volume; infinite for the exterior.
    pub volume: Real,
    /// A bounded cell of zero volume, squeezed between coincident facets.
    pub degenerate: bool,
    /// Winding number per mesh. `None` if it could not be derived.
    pub winding: Option<Vec<i32>>,
}

/// Slot of one side of a patch.
const fn slot(patch: usize, side: Orientation) -> usize {
    2 * patch + matches!(side, Orientation::Negative) as usize
}

struct Layout<'a> {
    mesh: &'a ConformingMesh,
    facet_patch: &'a [usize],
    components: Vec<Vec<usize>>,
    facet_component: Vec<usize>,
    far_corner: ExactPoint,
}

impl Layout<'_> {
    fn rank(&self, f: usize) -> Rank {
        (self.facet_patch[f], f)
    }

    fn far_point(&self, offset: [i64; 3]) -> ExactPoint {
        let [x, y, z] = offset.map(integer);
        ExactPoint::new(&self.far_corner.x + x, &self.far_corner.y + y, &self.far_corner.z + z)
    }

    /// Slot on the outer side of `component` and the slot of the region
    /// containing it.
    fn enclosure(&self, component: usize, exterior: usize) -> ArrangementResult<(usize, usize)> {
        let own = &self.components[component];
        let others = || (0..self.mesh.facets.len()).filter(move |&f| self.facet_component[f] != component);
        let rank = |f: usize| self.rank(f);

        for &target in own.iter().take(MAX_TARGET_FACETS) {
            let [a, b, c] = self.mesh.facets[target].vertices.map(|v| &self.mesh.points[v].exact);
            for weights in TARGET_WEIGHTS {
                let q = ExactPoint::barycentric(a, b, c, weights);
                for offset in FAR_OFFSETS {
                    let far = self.far_point(offset);
                    let beyond = q.add(&q.sub(&far));
                    let Shot::Hit(outer) = shoot(self.mesh, rank, own.iter().copied(), &far, &beyond) else {
                        continue;
                    };
                    let entry = far.lerp(&beyond, &outer.t);
                    let outer_slot = slot(self.facet_patch[outer.facet], outer.side);
                    match shoot(self.mesh, rank, others(), &entry, &far) {
                        Shot::Degenerate => continue,
                        Shot::Miss => return Ok((outer_slot, exterior)),
                        Shot::Hit(container) => {
                            return Ok((outer_slot, slot(self.facet_patch[container.facet], container.side)));
                        },
                    }
                }
            }
        }
        Err(ArrangementError::non_conforming(
            Stage::Cells,
            own.iter().take(MAX_TARGET_FACETS).map(|&f| self.mesh.facets[f].input_facet).collect(),
            "every ray towards the component grazes a facet boundary",
        ))
    }
}

/// Maximum corner of the bounding box of all vertices.
pub(crate) fn far_corner(mesh: &ConformingMesh) -> ExactPoint {
    let max = |axis: usize| {
        mesh.points
            .iter()
            .map(|p| p.exact.coord(axis))
            .max()
            .cloned()
            .unwrap_or_else(Rational::zero)
    };
    ExactPoint::new(max(0), max(1), max(2))
}

/// Assigns cells to both sides of every patch and returns the cells, with
/// warnings for degenerate ones.
pub(crate) fn build_cells(
    mesh: &ConformingMesh,
    edges: &EdgeMap,
    facet_patch: &[usize],
    patches: &mut [Patch],
) -> ArrangementResult<(Vec<Cell>, Vec<ArrangementWarning>)> {
    let exterior = 2 * patches.len();
    let mut slots = UnionFind::new(exterior + 1);
    let mut connected = UnionFind::new(patches.len());
    let rank = |f: usize| (facet_patch[f], f);

    for (&(u, v), incident) in edges {
        for pair in incident.windows(2) {
            connected.union(facet_patch[pair[0]], facet_patch[pair[1]]);
        }
        if joins(mesh, (u, v), incident) {
            continue;
        }
        let order = radial_order(mesh, rank, (u, v), incident);
        let ccw_side = |f: usize| {
            if mesh.facets[f].has_directed_edge(u, v) { Orientation::Positive } else { Orientation::Negative }
        };
        for (i, &f) in order.iter().enumerate() {
            let g = order[(i + 1) % order.len()];
            slots.union(slot(facet_patch[f], ccw_side(f)), slot(facet_patch[g], ccw_side(g).reversed()));
        }
    }

    let (patch_component, component_count) = connected.labels();
    let mut components = vec![Vec::new(); component_count];
    let facet_component: Vec<usize> = facet_patch.iter().map(|&p| patch_component[p]).collect();
    for (f, &c) in facet_component.iter().enumerate() {
        components[c].push(f);
    }
    debug!(components = component_count, "placing surface components");

    let layout = Layout {
        mesh,
        facet_patch,
        components,
        facet_component,
        far_corner: far_corner(mesh),
    };
    let place = |component: usize| layout.enclosure(component, exterior);
    #[cfg(feature = "parallel")]
    let placements: Vec<(usize, usize)> = (0..component_count).into_par_iter().map(place).collect::<ArrangementResult<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let placements: Vec<(usize, usize)> = (0..component_count).map(place).collect::<ArrangementResult<_>>()?;
    for (outer, container) in placements {
        slots.union(outer, container);
    }

    // exterior first, then by first slot
    let mut cell_of_root = vec![usize::MAX; exterior + 1];
    let exterior_root = slots.find(exterior);
    cell_of_root[exterior_root] = 0;
    let mut count = 1;
    let mut slot_cell = vec![0; exterior];
    for (s, cell) in slot_cell.iter_mut().enumerate() {
        let root = slots.find(s);
        if cell_of_root[root] == usize::MAX {
            cell_of_root[root] = count;
            count += 1;
        }
        *cell = cell_of_root[root];
    }

    let origin = ExactPoint::origin();
    let mut sixfold: Vec<Rational> = vec![Rational::zero(); count];
    let mut cells: Vec<Cell> = (0..count)
        .map(|_| Cell {
            patches: Vec::new(),
            volume: 0.0,
            degenerate: false,
            winding: None,
        })
        .collect();
    for (p, patch) in patches.iter_mut().enumerate() {
        patch.cells = [slot_cell[2 * p], slot_cell[2 * p + 1]];
        let enclosed: Rational = patch
            .facets
            .iter()
            .map(|&f| {
                let [a, b, c] = mesh.facets[f].vertices.map(|v| &mesh.points[v].exact);
                orient3d_value(&origin, a, b, c)
            })
            .sum();
        // the positive side sees the facets' normals pointing at it
        sixfold[patch.cells[0]] -= &enclosed;
        sixfold[patch.cells[1]] += &enclosed;
        cells[patch.cells[0]].patches.push(p);
        if !patch.is_sheet() {
            cells[patch.cells[1]].patches.push(p);
        }
    }

    let mut warnings = Vec::new();
    for (id, (cell, volume)) in cells.iter_mut().zip(&sixfold).enumerate() {
        cell.patches.sort_unstable();
        if id == 0 {
            cell.volume = Real::INFINITY;
            continue;
        }
        cell.volume = to_real(volume) / 6.0;
        if volume.is_zero() {
            cell.degenerate = true;
            warnings.push(ArrangementWarning::DegenerateCell { cell: id });
        }
    }
    for patch in patches.iter_mut() {
        patch.degenerate = patch.cells.iter().any(|&c| cells[c].degenerate);
    }
    Ok((cells, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelPoint;
    use crate::mesh::OutputFacet;
    use crate::patch::{build_patches, edge_map};

    const TET: [[usize; 3]; 4] = [[0, 2, 1], [0, 3, 2], [0, 1, 3], [1, 2, 3]];

    fn tet_points(offset: f64, scale: f64) -> Vec<[f64; 3]> {
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
            .iter()
            .map(|p| p.map(|c| c * scale + offset))
            .collect()
    }

    fn mesh(points: Vec<[f64; 3]>, facets: Vec<[usize; 3]>) -> ConformingMesh {
        ConformingMesh {
            points: points.iter().map(|p| KernelPoint::from_input(*p).unwrap()).collect(),
            facets: facets
                .into_iter()
                .enumerate()
                .map(|(i, f)| OutputFacet {
                    vertices: f,
                    source_facet: i,
                    mesh: 0,
                    input_facet: i,
                    jumps: vec![(0, 1)],
                })
                .collect(),
            merged: 0,
        }
    }

    fn run(m: &ConformingMesh) -> (Vec<Patch>, Vec<Cell>, Vec<ArrangementWarning>) {
        let edges = edge_map(m);
        let (facet_patch, mut patches) = build_patches(m, &edges);
        let (cells, warnings) = build_cells(m, &edges, &facet_patch, &mut patches).unwrap();
        (patches, cells, warnings)
    }

    #[test]
    fn tetrahedron_has_inside_and_outside() {
        let (patches, cells, warnings) = run(&mesh(tet_points(0.0, 1.0), TET.to_vec()));
        assert_eq!(cells.len(), 2);
        assert_eq!(patches[0].cells, [0, 1]);
        assert!((cells[1].volume - 1.0 / 6.0).abs() < 1e-15);
        assert!(cells[0].volume.is_infinite());
        assert!(warnings.is_empty());
    }

    #[test]
    fn nested_tetrahedra() {
        let mut points = tet_points(0.0, 8.0);
        points.extend(tet_points(1.0, 1.0));
        let mut facets = TET.to_vec();
        facets.extend(TET.iter().map(|f| f.map(|v| v + 4)));
        let (patches, cells, _) = run(&mesh(points, facets));
        assert_eq!(cells.len(), 3);
        // the inner surface's outside is the outer surface's inside
        assert_eq!(patches[1].cells[0], patches[0].cells[1]);
        assert_eq!(patches[0].cells[0], 0);
        let shell = patches[0].cells[1];
        assert!((cells[shell].volume - (512.0 - 1.0) / 6.0).abs() < 1e-9);
    }

    #[test]
    fn separate_tetrahedra_share_the_exterior() {
        let mut points = tet_points(0.0, 1.0);
        points.extend(tet_points(10.0, 1.0));
        let mut facets = TET.to_vec();
        facets.extend(TET.iter().map(|f| f.map(|v| v + 4)));
        let (patches, cells, _) = run(&mesh(points, facets));
        assert_eq!(cells.len(), 3);
        assert_eq!(patches[0].cells, [0, 1]);
        assert_eq!(patches[1].cells, [0, 2]);
    }

    #[test]
    fn duplicated_face_bounds_a_degenerate_cell() {
        let mut facets = TET.to_vec();
        facets.push([0, 1, 2]);
        let (patches, cells, warnings) = run(&mesh(tet_points(0.0, 1.0), facets));
        assert_eq!(patches.len(), 3);
        assert_eq!(cells.len(), 3);
        assert_eq!(warnings, vec![ArrangementWarning::DegenerateCell { cell: 1 }]);
        assert_eq!(cells.iter().filter(|c| c.degenerate).count(), 1);
        assert!(patches[0].degenerate && patches[2].degenerate && !patches[1].degenerate);
    }
}
