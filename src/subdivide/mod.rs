//! Intersection and subdivision
//!
//! Turns the prepared input into a conforming mesh:
//! 1. candidate facet pairs from the engine's broad phase,
//! 2. exact contact for every candidate pair,
//! 3. per-facet constraint points and segments, with coplanar overlapping
//!    facets clustered into groups,
//! 4. constrained triangulation of every group,
//! 5. emission of output facets with exact vertex sharing.
//!
//! Steps 2 and 4 run on rayon with the `parallel` feature.

pub mod broad_phase;
pub(crate) mod cdt;
pub mod engines;
pub mod intersect;
pub mod traits;

pub use engines::{MeshEngine, FastEngine, engine_for};
#[cfg(feature = "parry")]
pub use engines::BackendEngine;
pub use intersect::{Contact, triangle_contact};
pub use traits::{BroadPhase, SubdivisionEngine, SubdivisionOptions};

use crate::aabb::Aabb;
use crate::config::CoplanarPolicy;
use crate::errors::{ArrangementError, ArrangementResult, Stage};
use crate::float_types::Real;
use crate::kernel::predicates::Orientation;
use crate::kernel::{ExactPoint, Kernel, KernelPoint, Projection};
use crate::mesh::{ConformingMesh, InputFacet, OutputFacet, PreparedMesh};
use crate::union_find::UnionFind;
use cdt::{Piece, PlanarProblem, projected_orientation, triangulate};
use hashbrown::HashMap;
use nalgebra::Point3;
use std::collections::BTreeMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Points and segments a facet must be subdivided along.
#[derive(Debug, Clone, Default)]
struct Constraints {
    points: Vec<ExactPoint>,
    segments: Vec<(ExactPoint, ExactPoint)>,
}

impl Constraints {
    fn add_point(&mut self, facet: &InputFacet, points: &[KernelPoint], p: &ExactPoint) {
        if !is_corner(facet, points, p) {
            self.points.push(p.clone());
        }
    }

    fn add_segment(&mut self, facet: &InputFacet, points: &[KernelPoint], p: &ExactPoint, q: &ExactPoint) {
        if is_corner(facet, points, p) && is_corner(facet, points, q) {
            return;
        }
        self.segments.push((p.clone(), q.clone()));
    }
}

fn is_corner(facet: &InputFacet, points: &[KernelPoint], p: &ExactPoint) -> bool {
    facet.vertices.iter().any(|&v| points[v].exact == *p)
}

/// Exact contact between two prepared facets.
///
/// Facets sharing an edge without being coplanar can only meet along that
/// edge, so they are reported as disjoint.
fn facet_contact(kernel: Kernel, prepared: &PreparedMesh, fa: &InputFacet, fb: &InputFacet) -> Contact {
    let shared = fa.vertices.iter().filter(|v| fb.vertices.contains(v)).count();
    let pts = &prepared.points;
    let corners = |f: &InputFacet| f.vertices.map(|v| &pts[v]);
    match shared {
        3 => Contact::CoplanarOverlap,
        2 => {
            let [b0, b1, b2] = corners(fb);
            let apex = fa.vertices.iter().find(|v| !fb.vertices.contains(v)).map(|&v| &pts[v]);
            match apex {
                Some(apex) if kernel.orient3d(b0, b1, b2, apex).is_zero() => triangle_contact(kernel, corners(fa), corners(fb)),
                _ => Contact::Disjoint,
            }
        },
        _ => triangle_contact(kernel, corners(fa), corners(fb)),
    }
}

/// Shared subdivision pipeline; engines only choose the kernel and the broad phase.
pub fn subdivide_with(
    kernel: Kernel,
    broad_phase: &dyn BroadPhase,
    prepared: &PreparedMesh,
    options: &SubdivisionOptions,
) -> ArrangementResult<ConformingMesh> {
    let facets = &prepared.facets;
    let boxes: Vec<Aabb> = facets
        .iter()
        .map(|f| {
            let corners: Vec<Point3<Real>> = f.vertices.iter().map(|&v| prepared.points[v].exact.to_point()).collect();
            Aabb::from_points(&corners)
        })
        .collect();

    let pairs = broad_phase.candidate_pairs(&boxes);
    debug!(facets = facets.len(), candidates = pairs.len(), "broad phase done");

    let contact_of = |&(i, j): &(usize, usize)| match facet_contact(kernel, prepared, &facets[i], &facets[j]) {
        Contact::Disjoint => None,
        contact => Some((i, j, contact)),
    };
    #[cfg(feature = "parallel")]
    let contacts: Vec<(usize, usize, Contact)> = pairs.par_iter().filter_map(contact_of).collect();
    #[cfg(not(feature = "parallel"))]
    let contacts: Vec<(usize, usize, Contact)> = pairs.iter().filter_map(contact_of).collect();

    let mut constraints = vec![Constraints::default(); facets.len()];
    let mut clusters = UnionFind::new(facets.len());
    for (i, j, contact) in &contacts {
        let (fi, fj) = (&facets[*i], &facets[*j]);
        match contact {
            Contact::Disjoint => {},
            Contact::Point(p) => {
                constraints[*i].add_point(fi, &prepared.points, p);
                constraints[*j].add_point(fj, &prepared.points, p);
            },
            Contact::Segment(p, q) => {
                constraints[*i].add_segment(fi, &prepared.points, p, q);
                constraints[*j].add_segment(fj, &prepared.points, p, q);
            },
            Contact::CoplanarTouch(points) => {
                for p in points {
                    constraints[*i].add_point(fi, &prepared.points, p);
                    constraints[*j].add_point(fj, &prepared.points, p);
                }
            },
            Contact::CoplanarOverlap => {
                clusters.union(*i, *j);
            },
        }
    }

    let (labels, group_count) = clusters.labels();
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); group_count];
    for (facet, &label) in labels.iter().enumerate() {
        groups[label].push(facet);
    }
    debug!(
        contacts = contacts.len(),
        groups = group_count,
        clustered = groups.iter().filter(|g| g.len() > 1).count(),
        "narrow phase done"
    );

    let triangulate_group = |members: &Vec<usize>| -> ArrangementResult<Vec<Piece>> {
        let corners = |f: usize| facets[f].vertices.map(|v| &prepared.points[v].exact);
        let [a, b, c] = corners(members[0]);
        let mut problem = PlanarProblem {
            projection: Projection::for_triangle(a, b, c),
            members: members.iter().map(|&f| corners(f)).collect(),
            points: Vec::new(),
            segments: Vec::new(),
        };
        for &f in members {
            problem.points.extend(constraints[f].points.iter().cloned());
            problem.segments.extend(constraints[f].segments.iter().cloned());
        }
        triangulate(&problem, options.delaunay).map_err(|details| {
            let ids = members.iter().map(|&f| facets[f].input_index).collect();
            ArrangementError::non_conforming(Stage::Subdivision, ids, details)
        })
    };
    #[cfg(feature = "parallel")]
    let pieces: Vec<Vec<Piece>> = groups.par_iter().map(triangulate_group).collect::<ArrangementResult<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let pieces: Vec<Vec<Piece>> = groups.iter().map(triangulate_group).collect::<ArrangementResult<_>>()?;

    let mut out = Emitter::new(prepared);
    for (members, group_pieces) in groups.iter().zip(pieces) {
        out.emit_group(members, group_pieces, options.coplanar_policy);
    }
    debug!(vertices = out.mesh.points.len(), facets = out.mesh.facets.len(), merged = out.mesh.merged, "subdivision done");
    Ok(out.mesh)
}

/// Collects output facets and assigns vertex ids by exact coordinates.
struct Emitter<'a> {
    prepared: &'a PreparedMesh,
    lookup: HashMap<ExactPoint, usize>,
    mesh: ConformingMesh,
}

impl<'a> Emitter<'a> {
    fn new(prepared: &'a PreparedMesh) -> Self {
        let lookup = prepared
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.exact.clone(), i))
            .collect();
        Self {
            prepared,
            lookup,
            mesh: ConformingMesh {
                points: prepared.points.clone(),
                facets: Vec::new(),
                merged: 0,
            },
        }
    }

    fn vertex(&mut self, p: ExactPoint) -> usize {
        if let Some(&i) = self.lookup.get(&p) {
            return i;
        }
        let i = self.mesh.points.len();
        self.lookup.insert(p.clone(), i);
        self.mesh.points.push(KernelPoint::constructed(p));
        i
    }

    fn emit_group(&mut self, members: &[usize], pieces: Vec<Piece>, policy: CoplanarPolicy) {
        let prepared = self.prepared;
        let facets = &prepared.facets;
        let points = &prepared.points;
        let [a, b, c] = facets[members[0]].vertices.map(|v| &points[v].exact);
        let projection = Projection::for_triangle(a, b, c);
        let counter_clockwise: Vec<bool> = members
            .iter()
            .map(|&f| {
                let corners = facets[f].vertices.map(|v| &points[v].exact);
                projected_orientation(&projection, corners) == Orientation::Positive
            })
            .collect();

        for piece in pieces {
            let [p, q, r] = piece.corners.map(|x| self.vertex(x));
            let oriented = |ccw: bool| if ccw { [p, q, r] } else { [p, r, q] };
            let facet_for = |member: usize, jumps: Vec<(usize, i32)>| {
                let source = &facets[members[member]];
                OutputFacet {
                    vertices: oriented(counter_clockwise[member]),
                    source_facet: source.source_facet,
                    mesh: source.mesh,
                    input_facet: source.input_index,
                    jumps,
                }
            };

            if piece.covers.len() == 1 || policy == CoplanarPolicy::KeepSeparate {
                for &m in &piece.covers {
                    let mesh = facets[members[m]].mesh;
                    self.mesh.facets.push(facet_for(m, vec![(mesh, 1)]));
                }
                continue;
            }

            let lead = piece.covers[0];
            let mut jumps: BTreeMap<usize, i32> = BTreeMap::new();
            for &m in &piece.covers {
                let delta = if counter_clockwise[m] == counter_clockwise[lead] { 1 } else { -1 };
                *jumps.entry(facets[members[m]].mesh).or_insert(0) += delta;
            }
            let jumps = jumps.into_iter().filter(|&(_, d)| d != 0).collect();
            self.mesh.facets.push(facet_for(lead, jumps));
            self.mesh.merged += 1;
        }
    }
}
