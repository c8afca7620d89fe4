//! Exact segment shooting, used to place components inside each other and
//! to locate query points.

use crate::cell::radial::{Rank, is_canonical};
use crate::kernel::predicates::{crossing_parameter, orient3d_value, segment_triangle};
use crate::kernel::{ExactPoint, Orientation, Rational, SegmentTriangle};
use crate::mesh::ConformingMesh;
use std::cmp::Ordering;

/// Points used as ray origins outside the mesh, as offsets from the
/// maximum corner of its bounding box.
pub(crate) const FAR_OFFSETS: [[i64; 3]; 7] = [
    [1, 2, 3],
    [3, 1, 2],
    [2, 3, 1],
    [5, 7, 11],
    [7, 11, 5],
    [11, 5, 7],
    [13, 17, 19],
];

/// Barycentric weights of the ray targets on a facet.
pub(crate) const TARGET_WEIGHTS: [[i64; 3]; 5] = [[1, 1, 1], [3, 5, 7], [11, 2, 5], [2, 13, 3], [17, 7, 19]];

#[derive(Debug, Clone)]
pub(crate) struct RayHit {
    pub facet: usize,
    /// Segment parameter of the crossing, in `(0, 1)`.
    pub t: Rational,
    /// Side of the facet the segment starts on.
    pub side: Orientation,
}

#[derive(Debug, Clone)]
pub(crate) enum Shot {
    Miss,
    Hit(RayHit),
    /// The segment touches a facet boundary or runs inside a facet plane.
    Degenerate,
}

/// The first facet crossed by the segment `from -> to`.
pub(crate) fn shoot(
    mesh: &ConformingMesh,
    rank: impl Fn(usize) -> Rank,
    candidates: impl IntoIterator<Item = usize>,
    from: &ExactPoint,
    to: &ExactPoint,
) -> Shot {
    let corners = |f: usize| mesh.facets[f].vertices.map(|v| &mesh.points[v].exact);
    let mut nearest: Vec<RayHit> = Vec::new();

    for f in candidates {
        let tri = corners(f);
        match segment_triangle(from, to, tri) {
            SegmentTriangle::Disjoint => {},
            SegmentTriangle::Touches => return Shot::Degenerate,
            SegmentTriangle::Intersects => {
                let [a, b, c] = tri;
                let start = orient3d_value(a, b, c, from);
                let end = orient3d_value(a, b, c, to);
                let hit = RayHit {
                    facet: f,
                    t: crossing_parameter(&start, &end),
                    side: Orientation::of(&start),
                };
                match nearest.first().map(|h| hit.t.cmp(&h.t)) {
                    None | Some(Ordering::Equal) => nearest.push(hit),
                    Some(Ordering::Less) => {
                        nearest.clear();
                        nearest.push(hit);
                    },
                    Some(Ordering::Greater) => {},
                }
            },
        }
    }

    let Some(first) = nearest.first() else {
        return Shot::Miss;
    };
    // equal parameters only happen for coincident facets; the nearest one is
    // lifted furthest towards `from`
    let [a, b, c] = corners(first.facet);
    let above = is_canonical(&b.sub(a).cross(&c.sub(a))) == (first.side == Orientation::Positive);
    let pick = if above {
        nearest.into_iter().max_by_key(|h| rank(h.facet))
    } else {
        nearest.into_iter().min_by_key(|h| rank(h.facet))
    };
    pick.map_or(Shot::Miss, Shot::Hit)
}
