//! Test support library
//! Fixtures and helpers shared by the integration tests.
#![allow(dead_code)]

use mesh_arrangement::{Arrangement, ArrangementInput, float_types::Real};
use std::collections::HashMap;

/// Unit corner tetrahedron, facets oriented outward.
pub const TET_VERTICES: [[Real; 3]; 4] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
pub const TET_FACETS: [[usize; 3]; 4] = [[0, 2, 1], [0, 3, 2], [0, 1, 3], [1, 2, 3]];

/// Cube corners are numbered `x + 2y + 4z`; facets oriented outward.
pub const CUBE_FACETS: [[usize; 3]; 12] = [
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
];

/// Unit tetrahedron translated by `offset` along every axis.
pub fn tet(offset: Real) -> Vec<[Real; 3]> {
    TET_VERTICES.iter().map(|p| p.map(|c| c + offset)).collect()
}

/// Axis-aligned box from `min` to `max`.
pub fn cube(min: [Real; 3], max: [Real; 3]) -> Vec<[Real; 3]> {
    (0..8)
        .map(|i| {
            let pick = |axis: usize, bit: usize| if i & bit == 0 { min[axis] } else { max[axis] };
            [pick(0, 1), pick(1, 2), pick(2, 4)]
        })
        .collect()
}

/// One mesh per translated unit tetrahedron.
pub fn tets(offsets: &[Real]) -> ArrangementInput {
    let mut input = ArrangementInput::default();
    for &offset in offsets {
        input.add_mesh(&tet(offset), &TET_FACETS);
    }
    input
}

/// Winding vectors of all cells with a known winding, sorted.
pub fn sorted_windings(arrangement: &Arrangement) -> Vec<Vec<i32>> {
    let mut windings: Vec<Vec<i32>> = (0..arrangement.cell_count())
        .filter_map(|c| arrangement.cell(c)?.winding.clone())
        .collect();
    windings.sort();
    windings
}

/// Signed volume enclosed by outward-oriented faces.
pub fn signed_volume(vertices: &[nalgebra::Point3<Real>], faces: &[[usize; 3]]) -> Real {
    faces
        .iter()
        .map(|&[a, b, c]| vertices[a].coords.dot(&vertices[b].coords.cross(&vertices[c].coords)))
        .sum::<Real>()
        / 6.0
}

/// `true` if every directed edge of `faces` is matched by its reverse.
pub fn is_closed(faces: &[[usize; 3]]) -> bool {
    let mut balance: HashMap<(usize, usize), i32> = HashMap::new();
    for &[a, b, c] in faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            *balance.entry((u.min(v), u.max(v))).or_default() += if u < v { 1 } else { -1 };
        }
    }
    balance.values().all(|&b| b == 0)
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}
