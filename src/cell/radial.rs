//! Angular order of the facets around an edge.

use crate::kernel::exact::sign;
use crate::kernel::predicates::orient3d;
use crate::kernel::{ExactPoint, ExactVector, Orientation};
use crate::mesh::ConformingMesh;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

/// Tie-break order of coincident facets: `(patch, facet)`. Coincident facets
/// behave as if facet `r` were lifted by `r * eps` along the canonical normal
/// of their common plane.
pub(crate) type Rank = (usize, usize);

/// `true` if `v` already points along the canonical direction of its line.
pub(crate) fn is_canonical(v: &ExactVector) -> bool {
    [&v.x, &v.y, &v.z]
        .into_iter()
        .find(|c| !c.is_zero())
        .is_some_and(|c| sign(c) > 0)
}

/// Angular half-plane class relative to the reference facet:
/// `0` same half-plane, `1` strictly counter-clockwise within a half-turn,
/// `2` the opposite half-plane, `3` the rest.
fn class(u: &ExactPoint, v: &ExactPoint, reference: &ExactPoint, w: &ExactPoint) -> u8 {
    match orient3d(u, v, reference, w) {
        Orientation::Positive => 1,
        Orientation::Negative => 3,
        Orientation::Zero => {
            // w lies in the reference plane; same or opposite side of the edge line
            let d = v.sub(u);
            let a = reference.sub(u);
            let b = w.sub(u);
            let along = a.dot(&b) * d.dot(&d) - a.dot(&d) * b.dot(&d);
            if along.is_positive() { 0 } else { 2 }
        },
    }
}

/// Facets around the edge `u -> v`, counter-clockwise when looking down
/// `v - u`, starting near `incident[0]`. The order is cyclic.
pub(crate) fn radial_order(
    mesh: &ConformingMesh,
    rank: impl Fn(usize) -> Rank,
    (u, v): (usize, usize),
    incident: &[usize],
) -> Vec<usize> {
    let apex = |f: usize| mesh.facets[f].opposite(u, v).map(|w| &mesh.points[w].exact);
    let (pu, pv) = (&mesh.points[u].exact, &mesh.points[v].exact);

    let around: Vec<(usize, &ExactPoint)> = incident.iter().filter_map(|&f| Some((f, apex(f)?))).collect();
    let Some(&(_, reference)) = around.first() else {
        return Vec::new();
    };
    let d = pv.sub(pu);

    let stacked = |(f, w): (usize, &ExactPoint), (g, _): (usize, &ExactPoint)| {
        let ascending = is_canonical(&d.cross(&w.sub(pu)));
        let order = rank(f).cmp(&rank(g));
        if ascending { order } else { order.reverse() }
    };

    let classes: Vec<u8> = around.iter().map(|&(_, w)| class(pu, pv, reference, w)).collect();
    let mut order: Vec<usize> = (0..around.len()).collect();
    order.sort_by(|&i, &j| {
        classes[i].cmp(&classes[j]).then_with(|| {
            if classes[i] % 2 == 1 {
                match orient3d(pu, pv, around[i].1, around[j].1) {
                    Orientation::Positive => return Ordering::Less,
                    Orientation::Negative => return Ordering::Greater,
                    Orientation::Zero => {},
                }
            }
            stacked(around[i], around[j])
        })
    });

    order.into_iter().map(|i| around[i].0).collect()
}
