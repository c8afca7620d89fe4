//! Input meshes and their preparation for subdivision.

use crate::errors::{ArrangementResult, InputError};
use crate::float_types::Real;
use crate::kernel::{ExactPoint, Kernel, KernelPoint};
use hashbrown::HashMap;

/// The union of all input meshes as flat arrays.
///
/// Every facet carries the id it had in its own mesh before combination
/// (`source_facet_ids`) and the mesh it came from (`source_mesh_ids`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrangementInput {
    pub vertices: Vec<[Real; 3]>,
    pub facets: Vec<[usize; 3]>,
    pub source_facet_ids: Vec<usize>,
    pub source_mesh_ids: Vec<usize>,
}

impl ArrangementInput {
    /// A single mesh; facet ids are `0..facets.len()`, all facets belong to mesh `0`.
    pub fn new(vertices: Vec<[Real; 3]>, facets: Vec<[usize; 3]>) -> Self {
        let n = facets.len();
        Self {
            vertices,
            facets,
            source_facet_ids: (0..n).collect(),
            source_mesh_ids: vec![0; n],
        }
    }

    /// Pre-combined meshes with explicit per-facet labels.
    pub fn with_labels(
        vertices: Vec<[Real; 3]>,
        facets: Vec<[usize; 3]>,
        source_facet_ids: Vec<usize>,
        source_mesh_ids: Vec<usize>,
    ) -> Result<Self, InputError> {
        let input = Self {
            vertices,
            facets,
            source_facet_ids,
            source_mesh_ids,
        };
        input.check_labels()?;
        Ok(input)
    }

    /// Appends one mesh and returns its mesh id.
    ///
    /// Facet indices are offset into the combined vertex array; facets are
    /// tagged with their position in `facets`.
    pub fn add_mesh(&mut self, vertices: &[[Real; 3]], facets: &[[usize; 3]]) -> usize {
        let mesh = self.num_meshes();
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(vertices);
        for (i, f) in facets.iter().enumerate() {
            self.facets.push(f.map(|v| v + offset));
            self.source_facet_ids.push(i);
            self.source_mesh_ids.push(mesh);
        }
        mesh
    }

    /// Number of input meshes: one more than the largest mesh id.
    pub fn num_meshes(&self) -> usize {
        self.source_mesh_ids.iter().max().map_or(0, |m| m + 1)
    }

    pub fn check_labels(&self) -> Result<(), InputError> {
        let expected = self.facets.len();
        for (name, actual) in [
            ("source_facet_ids", self.source_facet_ids.len()),
            ("source_mesh_ids", self.source_mesh_ids.len()),
        ] {
            if actual != expected {
                return Err(InputError::LabelMismatch { name, expected, actual });
            }
        }
        Ok(())
    }
}

/// An input facet that survived preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFacet {
    /// Indices into [`PreparedMesh::points`].
    pub vertices: [usize; 3],
    pub source_facet: usize,
    pub mesh: usize,
    /// Position in the combined input facet array.
    pub input_index: usize,
}

/// Deduplicated, validated input.
#[derive(Debug, Clone)]
pub struct PreparedMesh {
    pub points: Vec<KernelPoint>,
    pub facets: Vec<InputFacet>,
    /// Input vertex index to index in `points`.
    pub input_vertex_map: Vec<usize>,
    /// Input facets dropped as degenerate.
    pub dropped: Vec<usize>,
    pub num_meshes: usize,
}

impl PreparedMesh {
    /// Validates the input, merges vertices with identical coordinates and
    /// drops facets that have repeated or collinear corners.
    pub fn prepare(input: &ArrangementInput, kernel: Kernel) -> ArrangementResult<Self> {
        input.check_labels()?;

        let vertex_count = input.vertices.len();
        for (facet, f) in input.facets.iter().enumerate() {
            if let Some(&index) = f.iter().find(|&&v| v >= vertex_count) {
                return Err(InputError::IndexOutOfRange { facet, index, vertex_count }.into());
            }
        }

        let mut points: Vec<KernelPoint> = Vec::with_capacity(vertex_count);
        let mut lookup: HashMap<ExactPoint, usize> = HashMap::with_capacity(vertex_count);
        let mut input_vertex_map = Vec::with_capacity(vertex_count);
        for (vertex, &p) in input.vertices.iter().enumerate() {
            let point = KernelPoint::from_input(p).ok_or(InputError::NonFiniteCoordinate { vertex })?;
            let next = points.len();
            let index = *lookup.entry(point.exact.clone()).or_insert(next);
            if index == next {
                points.push(point);
            }
            input_vertex_map.push(index);
        }

        let mut facets = Vec::with_capacity(input.facets.len());
        let mut dropped = Vec::new();
        for (input_index, f) in input.facets.iter().enumerate() {
            let [a, b, c] = f.map(|v| input_vertex_map[v]);
            if a == b || b == c || a == c || kernel.collinear(&points[a], &points[b], &points[c]) {
                dropped.push(input_index);
                continue;
            }
            facets.push(InputFacet {
                vertices: [a, b, c],
                source_facet: input.source_facet_ids[input_index],
                mesh: input.source_mesh_ids[input_index],
                input_index,
            });
        }

        Ok(Self {
            points,
            facets,
            input_vertex_map,
            dropped,
            num_meshes: input.num_meshes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ArrangementError;

    #[test]
    fn add_mesh_offsets_and_tags() {
        let mut input = ArrangementInput::default();
        let tri = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(input.add_mesh(&tri, &[[0, 1, 2]]), 0);
        assert_eq!(input.add_mesh(&tri, &[[0, 1, 2], [2, 1, 0]]), 1);
        assert_eq!(input.facets[1], [3, 4, 5]);
        assert_eq!(input.source_facet_ids, vec![0, 0, 1]);
        assert_eq!(input.source_mesh_ids, vec![0, 1, 1]);
        assert_eq!(input.num_meshes(), 2);
    }

    #[test]
    fn label_lengths_are_checked() {
        let err = ArrangementInput::with_labels(vec![], vec![[0, 1, 2]], vec![0], vec![]).unwrap_err();
        assert!(matches!(err, InputError::LabelMismatch { name: "source_mesh_ids", .. }));
    }

    #[test]
    fn preparation_merges_and_drops() {
        let input = ArrangementInput::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
            ],
            vec![[0, 1, 2], [1, 3, 2], [0, 1, 4]],
        );
        let prepared = PreparedMesh::prepare(&input, Kernel::Rational).unwrap();
        assert_eq!(prepared.points.len(), 4);
        assert_eq!(prepared.input_vertex_map, vec![0, 1, 2, 1, 3]);
        assert_eq!(prepared.facets.len(), 1);
        assert_eq!(prepared.dropped, vec![1, 2]);
    }

    #[test]
    fn malformed_input_is_fatal() {
        let bad_index = ArrangementInput::new(vec![[0.0; 3]; 3], vec![[0, 1, 3]]);
        assert!(matches!(
            PreparedMesh::prepare(&bad_index, Kernel::Rational),
            Err(ArrangementError::Input(InputError::IndexOutOfRange { facet: 0, index: 3, .. }))
        ));

        let nan = ArrangementInput::new(vec![[0.0, f64::NAN, 0.0]], vec![]);
        assert!(matches!(
            PreparedMesh::prepare(&nan, Kernel::Adaptive),
            Err(ArrangementError::Input(InputError::NonFiniteCoordinate { vertex: 0 }))
        ));
    }
}
