//! Exact post-construction conformity check.
//!
//! Two output facets may only meet in the vertices or the edge they share.
//! Exact duplicates are allowed when coplanar facets are kept separate.
//! Predicates run on the engine's kernel, so pairs of input facets use the
//! filtered tests under the fast engines.

use crate::aabb::Aabb;
use crate::bvh::Bvh;
use crate::config::CoplanarPolicy;
use crate::errors::{ArrangementError, ArrangementResult, Stage};
use crate::kernel::{ExactPoint, Kernel};
use crate::mesh::{ConformingMesh, OutputFacet};
use crate::subdivide::{Contact, triangle_contact};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn describe(contact: &Contact) -> &'static str {
    match contact {
        Contact::Disjoint => "no contact",
        Contact::Point(_) => "a point that is not a shared vertex",
        Contact::Segment(..) => "a segment that is not a shared edge",
        Contact::CoplanarOverlap => "overlapping interiors",
        Contact::CoplanarTouch(_) => "boundary points that are not shared vertices",
    }
}

/// Why facets `a` and `b` do not conform, if they don't.
pub(crate) fn violation(
    mesh: &ConformingMesh,
    kernel: Kernel,
    a: &OutputFacet,
    b: &OutputFacet,
    policy: CoplanarPolicy,
) -> Option<&'static str> {
    let shared: Vec<usize> = a.vertices.iter().copied().filter(|v| b.vertices.contains(v)).collect();
    let corners = |f: &OutputFacet| f.vertices.map(|v| &mesh.points[v]);

    match shared.len() {
        3 if policy == CoplanarPolicy::KeepSeparate => None,
        3 => Some("duplicate facets"),
        2 => {
            // non-coplanar neighbours can only meet along their edge
            let apex = a.vertices.iter().find(|v| !b.vertices.contains(v)).map(|&v| &mesh.points[v])?;
            let [b0, b1, b2] = corners(b);
            if !kernel.orient3d(b0, b1, b2, apex).is_zero() {
                return None;
            }
            match triangle_contact(kernel, corners(a), corners(b)) {
                Contact::CoplanarOverlap => Some("facets folded onto each other across their shared edge"),
                _ => None,
            }
        },
        _ => {
            let allowed: Vec<&ExactPoint> = shared.iter().map(|&v| &mesh.points[v].exact).collect();
            let contact = triangle_contact(kernel, corners(a), corners(b));
            let fine = match &contact {
                Contact::Disjoint => true,
                Contact::Point(p) => allowed.contains(&p),
                Contact::CoplanarTouch(points) => points.iter().all(|p| allowed.contains(&p)),
                Contact::Segment(..) | Contact::CoplanarOverlap => false,
            };
            if fine { None } else { Some(describe(&contact)) }
        },
    }
}

/// Fails with [`ArrangementError::NonConforming`] on the first offending pair.
pub(crate) fn validate(
    mesh: &ConformingMesh,
    kernel: Kernel,
    policy: CoplanarPolicy,
    leaf_size: usize,
) -> ArrangementResult<()> {
    let boxes: Vec<Aabb> = mesh
        .facets
        .iter()
        .map(|f| Aabb::from_exact(f.vertices.iter().map(|&v| &mesh.points[v].exact)))
        .collect();
    let pairs = Bvh::build(&boxes, leaf_size).self_pairs(&boxes);

    let check = |&(i, j): &(usize, usize)| violation(mesh, kernel, &mesh.facets[i], &mesh.facets[j], policy).map(|why| (i, j, why));
    #[cfg(feature = "parallel")]
    let found = pairs.par_iter().find_map_first(check);
    #[cfg(not(feature = "parallel"))]
    let found = pairs.iter().find_map(check);

    match found {
        None => Ok(()),
        Some((i, j, why)) => Err(ArrangementError::non_conforming(
            Stage::Validation,
            vec![mesh.facets[i].input_facet, mesh.facets[j].input_facet],
            format!("output facets {i} and {j} meet in {why}"),
        )),
    }
}
