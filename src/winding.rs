//! Winding number propagation from the exterior.

use crate::cell::Cell;
use crate::errors::ArrangementWarning;
use crate::patch::Patch;
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

/// `winding + sign * jumps`
fn crossed(winding: &[i32], patch: &Patch, sign: i32) -> Vec<i32> {
    let mut next = winding.to_vec();
    for &(mesh, jump) in &patch.jumps {
        next[mesh] += sign * jump;
    }
    next
}

/// Breadth-first search over the cell adjacency, starting with all zeros in
/// the exterior. Crossing a patch from its positive to its negative side adds
/// its jumps. The first value reached wins; disagreements are reported.
pub(crate) fn propagate(num_meshes: usize, cells: &mut [Cell], patches: &[Patch]) -> Vec<ArrangementWarning> {
    let mut adjacent: Vec<Vec<(usize, usize, i32)>> = vec![Vec::new(); cells.len()];
    for (p, patch) in patches.iter().enumerate() {
        let [pos, neg] = patch.cells;
        adjacent[pos].push((p, neg, 1));
        adjacent[neg].push((p, pos, -1));
    }

    let mut conflicts: BTreeSet<(usize, usize)> = BTreeSet::new();
    if let Some(exterior) = cells.first_mut() {
        exterior.winding = Some(vec![0; num_meshes]);
    }
    let mut queue: VecDeque<usize> = VecDeque::from([0]);
    while let Some(cell) = queue.pop_front() {
        let Some(winding) = cells.get(cell).and_then(|c| c.winding.clone()) else {
            continue;
        };
        for &(p, next, sign) in &adjacent[cell] {
            let expected = crossed(&winding, &patches[p], sign);
            match &cells[next].winding {
                None => {
                    cells[next].winding = Some(expected);
                    queue.push_back(next);
                },
                Some(known) => {
                    for mesh in (0..num_meshes).filter(|&m| known[m] != expected[m]) {
                        conflicts.insert((mesh, p));
                    }
                },
            }
        }
    }

    let mut warnings: Vec<ArrangementWarning> = conflicts
        .into_iter()
        .map(|(mesh, patch)| ArrangementWarning::InconsistentWinding { mesh, patch })
        .collect();
    warnings.extend(
        cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.winding.is_none())
            .map(|(cell, _)| ArrangementWarning::UnreachableCell { cell }),
    );
    debug!(warnings = warnings.len(), "winding numbers propagated");
    warnings
}
