//! Exact triangle-triangle contact.
//!
//! The result describes the full intersection of two closed triangles. For
//! non-coplanar triangles it is a point or a segment; its extreme points are
//! always among the crossings of one triangle's edges with the other
//! triangle, so those are collected and the lexicographic extremes kept.
//! Coplanar triangles either overlap in area (the pair is re-triangulated
//! jointly) or touch along their boundaries.

use crate::kernel::predicates::{self, Orientation, Projection, crossing_parameter, orient2d, orient2d_value, point_in_triangle};
use crate::kernel::{ExactPoint, Kernel, KernelPoint};

/// Intersection of two closed triangles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    Disjoint,
    Point(ExactPoint),
    Segment(ExactPoint, ExactPoint),
    /// Coplanar with overlapping interiors.
    CoplanarOverlap,
    /// Coplanar with disjoint interiors; the closures meet at these points
    /// (their convex hull is the contact).
    CoplanarTouch(Vec<ExactPoint>),
}

fn same_nonzero_sign(s: &[Orientation; 3]) -> bool {
    s.iter().all(|o| *o == Orientation::Positive) || s.iter().all(|o| *o == Orientation::Negative)
}

/// Contact between triangles `a` and `b`, both non-degenerate.
pub fn triangle_contact(kernel: Kernel, a: [&KernelPoint; 3], b: [&KernelPoint; 3]) -> Contact {
    let s = a.map(|p| kernel.orient3d(b[0], b[1], b[2], p));
    if same_nonzero_sign(&s) {
        return Contact::Disjoint;
    }
    if s.iter().all(|o| o.is_zero()) {
        return coplanar_contact(a.map(|p| &p.exact), b.map(|p| &p.exact));
    }
    let t = b.map(|p| kernel.orient3d(a[0], a[1], a[2], p));
    if same_nonzero_sign(&t) {
        return Contact::Disjoint;
    }

    let ea = a.map(|p| &p.exact);
    let eb = b.map(|p| &p.exact);
    let mut points = Vec::new();
    edge_crossings(ea, &s, eb, &mut points);
    edge_crossings(eb, &t, ea, &mut points);

    let Some(lo) = points.iter().min().cloned() else {
        return Contact::Disjoint;
    };
    let hi = points.iter().max().cloned().unwrap_or_else(|| lo.clone());
    if lo == hi { Contact::Point(lo) } else { Contact::Segment(lo, hi) }
}

/// Points where the edges of `tri` meet the closed triangle `other`, given
/// the sides of `tri`'s corners relative to `other`'s plane.
fn edge_crossings(tri: [&ExactPoint; 3], sides: &[Orientation; 3], other: [&ExactPoint; 3], out: &mut Vec<ExactPoint>) {
    let projection = Projection::for_triangle(other[0], other[1], other[2]);
    for i in 0..3 {
        if sides[i].is_zero() && point_in_triangle(&projection, tri[i], other) {
            out.push(tri[i].clone());
        }
    }
    for (i, j) in [(0, 1), (1, 2), (2, 0)] {
        if sides[i].opposes(sides[j]) {
            let vi = predicates::orient3d_value(other[0], other[1], other[2], tri[i]);
            let vj = predicates::orient3d_value(other[0], other[1], other[2], tri[j]);
            let x = tri[i].lerp(tri[j], &crossing_parameter(&vi, &vj));
            if point_in_triangle(&projection, &x, other) {
                out.push(x);
            }
        } else if sides[i].is_zero() && sides[j].is_zero() {
            // the edge lies in `other`'s plane; its endpoints were handled above
            // and `other`'s corners on it are found from the other side
            for (u, v) in [(0, 1), (1, 2), (2, 0)] {
                if let Some(x) = planar_crossing(&projection, tri[i], tri[j], other[u], other[v]) {
                    out.push(x);
                }
            }
        }
    }
}

/// Proper crossing of two coplanar segments.
fn planar_crossing(projection: &Projection, p: &ExactPoint, q: &ExactPoint, u: &ExactPoint, v: &ExactPoint) -> Option<ExactPoint> {
    let [p2, q2, u2, v2] = [p, q, u, v].map(|x| projection.project(x));
    let crosses = orient2d(&p2, &q2, &u2).opposes(orient2d(&p2, &q2, &v2))
        && orient2d(&u2, &v2, &p2).opposes(orient2d(&u2, &v2, &q2));
    if !crosses {
        return None;
    }
    let vp = orient2d_value(&u2, &v2, &p2);
    let vq = orient2d_value(&u2, &v2, &q2);
    Some(p.lerp(q, &crossing_parameter(&vp, &vq)))
}

fn coplanar_contact(a: [&ExactPoint; 3], b: [&ExactPoint; 3]) -> Contact {
    let projection = Projection::for_triangle(a[0], a[1], a[2]);
    let pa = a.map(|p| projection.project(p));
    let pb = b.map(|p| projection.project(p));

    let separated_by = |tri: &[crate::kernel::Point2; 3], others: &[crate::kernel::Point2; 3]| {
        let o = orient2d(&tri[0], &tri[1], &tri[2]);
        [(0, 1), (1, 2), (2, 0)].iter().any(|&(i, j)| {
            others.iter().all(|q| orient2d(&tri[i], &tri[j], q) != o)
        })
    };
    if !separated_by(&pa, &pb) && !separated_by(&pb, &pa) {
        return Contact::CoplanarOverlap;
    }

    let mut points: Vec<ExactPoint> = Vec::new();
    for (tri, other) in [(a, b), (b, a)] {
        for p in tri {
            if point_in_triangle(&projection, p, other) && !points.contains(p) {
                points.push(p.clone());
            }
        }
    }
    if points.is_empty() {
        Contact::Disjoint
    } else {
        points.sort();
        Contact::CoplanarTouch(points)
    }
}
