//! Constrained triangulation of planar facet groups.
//!
//! A group is one input facet, or several coplanar facets whose interiors
//! overlap. The group's domain (the facet itself, or a super-triangle around
//! all members) is refined by incremental point insertion, constraint edges
//! are recovered by flipping the edges that cross them, and unconstrained
//! edges are optionally made locally Delaunay. All tests run on exact
//! rational coordinates in the projection that drops the plane's dominant
//! axis.

use crate::kernel::exact::{ExactPoint, Point2, Rational, cmp2, integer};
use crate::kernel::predicates::{Orientation, Projection, incircle, orient2d, orient2d_value, within_box};
use hashbrown::{HashMap, HashSet};
use std::collections::VecDeque;

/// Triangulation input: coplanar member triangles plus the points and
/// segments that must appear in the result.
#[derive(Debug, Clone)]
pub(crate) struct PlanarProblem<'a> {
    pub projection: Projection,
    pub members: Vec<[&'a ExactPoint; 3]>,
    pub points: Vec<ExactPoint>,
    pub segments: Vec<(ExactPoint, ExactPoint)>,
}

/// One output triangle, counter-clockwise in the projection, with the
/// members whose interior contains it.
#[derive(Debug, Clone)]
pub(crate) struct Piece {
    pub corners: [ExactPoint; 3],
    pub covers: Vec<usize>,
}

/// Orientation of a triangle in a projection.
pub(crate) fn projected_orientation(projection: &Projection, tri: [&ExactPoint; 3]) -> Orientation {
    let [a, b, c] = tri.map(|p| projection.project(p));
    orient2d(&a, &b, &c)
}

/// Deduplicated point store in exact and projected form.
#[derive(Debug, Default)]
struct PointSet {
    exact: Vec<ExactPoint>,
    planar: Vec<Point2>,
    lookup: HashMap<ExactPoint, usize>,
}

impl PointSet {
    fn insert(&mut self, p: ExactPoint, projection: &Projection) -> usize {
        if let Some(&i) = self.lookup.get(&p) {
            return i;
        }
        let i = self.exact.len();
        self.planar.push(projection.project(&p));
        self.lookup.insert(p.clone(), i);
        self.exact.push(p);
        i
    }
}

const fn undirected(u: usize, v: usize) -> (usize, usize) {
    if u < v { (u, v) } else { (v, u) }
}

const fn directed_edges(t: [usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

fn third(t: [usize; 3], u: usize, v: usize) -> usize {
    t.into_iter().find(|&w| w != u && w != v).unwrap_or(u)
}

/// Both segments' interiors cross at a single point.
fn crosses(pts: &[Point2], a: usize, b: usize, c: usize, d: usize) -> bool {
    orient2d(&pts[a], &pts[b], &pts[c]).opposes(orient2d(&pts[a], &pts[b], &pts[d]))
        && orient2d(&pts[c], &pts[d], &pts[a]).opposes(orient2d(&pts[c], &pts[d], &pts[b]))
}

enum Location {
    Inside(usize),
    OnEdge(usize, usize),
    Vertex,
}

/// Triangle soup with a directed-edge index; triangles are counter-clockwise.
struct Triangulation<'p> {
    pts: &'p [Point2],
    tris: Vec<Option<[usize; 3]>>,
    edges: HashMap<(usize, usize), usize>,
    constrained: HashSet<(usize, usize)>,
}

impl<'p> Triangulation<'p> {
    fn new(pts: &'p [Point2], domain: [usize; 3]) -> Self {
        let mut tri = Self {
            pts,
            tris: Vec::new(),
            edges: HashMap::new(),
            constrained: HashSet::new(),
        };
        tri.add(domain);
        tri
    }

    fn add(&mut self, t: [usize; 3]) {
        let id = self.tris.len();
        self.tris.push(Some(t));
        for e in directed_edges(t) {
            self.edges.insert(e, id);
        }
    }

    fn remove(&mut self, id: usize) {
        if let Some(t) = self.tris[id].take() {
            for e in directed_edges(t) {
                self.edges.remove(&e);
            }
        }
    }

    fn has_edge(&self, u: usize, v: usize) -> bool {
        self.edges.contains_key(&(u, v)) || self.edges.contains_key(&(v, u))
    }

    fn live(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.tris.iter().flatten().copied()
    }

    fn locate(&self, v: usize) -> Option<Location> {
        let p = &self.pts[v];
        for (id, t) in self.tris.iter().enumerate() {
            let Some([a, b, c]) = *t else {
                continue;
            };
            let o = [
                orient2d(&self.pts[b], &self.pts[c], p),
                orient2d(&self.pts[c], &self.pts[a], p),
                orient2d(&self.pts[a], &self.pts[b], p),
            ];
            if o.contains(&Orientation::Negative) {
                continue;
            }
            let zeros: Vec<usize> = (0..3).filter(|&i| o[i].is_zero()).collect();
            return Some(match zeros.as_slice() {
                [] => Location::Inside(id),
                [0] => Location::OnEdge(b, c),
                [1] => Location::OnEdge(c, a),
                [2] => Location::OnEdge(a, b),
                _ => Location::Vertex,
            });
        }
        None
    }

    fn insert(&mut self, v: usize) -> Result<(), String> {
        match self.locate(v) {
            Some(Location::Inside(id)) => {
                if let Some([a, b, c]) = self.tris[id] {
                    self.remove(id);
                    self.add([a, b, v]);
                    self.add([b, c, v]);
                    self.add([c, a, v]);
                }
            },
            Some(Location::OnEdge(u, w)) => self.split_edge(u, w, v),
            Some(Location::Vertex) => {},
            None => return Err(format!("point {v} lies outside the triangulated domain")),
        }
        Ok(())
    }

    /// Splits the edge `u -> w` (and its twin) at `v`.
    fn split_edge(&mut self, u: usize, w: usize, v: usize) {
        if let Some(&t1) = self.edges.get(&(u, w)) {
            if let Some(t) = self.tris[t1] {
                let x = third(t, u, w);
                self.remove(t1);
                self.add([u, v, x]);
                self.add([v, w, x]);
            }
        }
        if let Some(&t2) = self.edges.get(&(w, u)) {
            if let Some(t) = self.tris[t2] {
                let y = third(t, w, u);
                self.remove(t2);
                self.add([w, v, y]);
                self.add([v, u, y]);
            }
        }
    }

    /// The two triangles sharing `u -> v` and its twin, with their apexes.
    fn quad(&self, u: usize, v: usize) -> Option<(usize, usize, usize, usize)> {
        let t1 = *self.edges.get(&(u, v))?;
        let t2 = *self.edges.get(&(v, u))?;
        let p = third(self.tris[t1]?, u, v);
        let q = third(self.tris[t2]?, v, u);
        Some((t1, t2, p, q))
    }

    fn flip(&mut self, u: usize, v: usize, quad: (usize, usize, usize, usize)) {
        let (t1, t2, p, q) = quad;
        self.remove(t1);
        self.remove(t2);
        self.add([q, v, p]);
        self.add([p, u, q]);
    }

    /// Interior edges in a deterministic order.
    fn interior_edges(&self) -> Vec<(usize, usize)> {
        let mut out: Vec<(usize, usize)> = self
            .live()
            .flat_map(directed_edges)
            .filter(|&(u, v)| u < v && self.edges.contains_key(&(v, u)))
            .collect();
        out.sort_unstable();
        out
    }

    /// Makes `a - b` an edge by flipping every edge that crosses it.
    fn recover(&mut self, a: usize, b: usize) -> Result<(), String> {
        if !self.has_edge(a, b) {
            let mut queue: VecDeque<(usize, usize)> = self
                .interior_edges()
                .into_iter()
                .filter(|&(u, v)| crosses(self.pts, a, b, u, v))
                .collect();
            let limit = 64 * (queue.len() + 1) * (queue.len() + 1);
            let mut steps = 0;
            while let Some((u, v)) = queue.pop_front() {
                steps += 1;
                if steps > limit {
                    return Err(format!("constraint {a}-{b} could not be recovered"));
                }
                if self.constrained.contains(&undirected(u, v)) {
                    return Err(format!("constraints {a}-{b} and {u}-{v} cross"));
                }
                let quad @ (_, _, p, q) = self
                    .quad(u, v)
                    .ok_or_else(|| format!("constraint {a}-{b} crosses the domain boundary"))?;
                if !crosses(self.pts, u, v, p, q) {
                    queue.push_back((u, v));
                    continue;
                }
                self.flip(u, v, quad);
                if crosses(self.pts, a, b, p, q) {
                    queue.push_back((p, q));
                }
            }
            if !self.has_edge(a, b) {
                return Err(format!("constraint {a}-{b} missing after recovery"));
            }
        }
        self.constrained.insert(undirected(a, b));
        Ok(())
    }

    /// Lawson flips until every unconstrained edge is locally Delaunay.
    fn make_delaunay(&mut self) {
        let mut stack = self.interior_edges();
        while let Some((u, v)) = stack.pop() {
            if self.constrained.contains(&undirected(u, v)) {
                continue;
            }
            let Some(quad @ (_, _, p, q)) = self.quad(u, v) else {
                continue;
            };
            if incircle(&self.pts[u], &self.pts[v], &self.pts[p], &self.pts[q]) == Orientation::Positive {
                self.flip(u, v, quad);
                stack.extend([(u, q), (q, v), (v, p), (p, u)]);
            }
        }
    }
}

/// A counter-clockwise triangle that strictly contains every member.
fn super_triangle(problem: &PlanarProblem<'_>) -> [ExactPoint; 3] {
    let projection = problem.projection;
    let planar: Vec<Point2> = problem
        .members
        .iter()
        .flat_map(|m| m.iter().map(|p| projection.project(p)))
        .collect();
    let bound = |axis: usize, take_max: bool| {
        let values = planar.iter().map(|p| &p[axis]);
        let v = if take_max { values.max() } else { values.min() };
        v.cloned().unwrap_or_else(|| integer(0))
    };
    let (min_u, max_u, min_w, max_w) = (bound(0, false), bound(0, true), bound(1, false), bound(1, true));
    let span = {
        let du = &max_u - &min_u;
        let dw = &max_w - &min_w;
        if du > dw { du } else { dw }
    } + integer(1);
    let u0 = min_u - &span;
    let w0 = min_w - &span;
    let far = &span * integer(5);
    let corners: [Point2; 3] = [
        [u0.clone(), w0.clone()],
        [&u0 + &far, w0.clone()],
        [u0, w0 + far],
    ];

    let [a, b, c] = problem.members[0];
    let normal = b.sub(a).cross(&c.sub(a));
    corners.map(|p| projection.lift(&p, &normal, a))
}

/// Split constraint segments at mutual crossings and at every point lying on them.
fn split_segments(points: &mut PointSet, segments: &[(usize, usize)], projection: &Projection) -> Vec<(usize, usize)> {
    for (i, &(a, b)) in segments.iter().enumerate() {
        for &(c, d) in &segments[i + 1..] {
            if !crosses(&points.planar, a, b, c, d) {
                continue;
            }
            let va = orient2d_value(&points.planar[c], &points.planar[d], &points.planar[a]);
            let vb = orient2d_value(&points.planar[c], &points.planar[d], &points.planar[b]);
            let t: Rational = &va / (&va - &vb);
            let x = points.exact[a].lerp(&points.exact[b], &t);
            points.insert(x, projection);
        }
    }

    let pts = &points.planar;
    let mut out: Vec<(usize, usize)> = Vec::new();
    for &(a, b) in segments {
        let mut on: Vec<usize> = (0..pts.len())
            .filter(|&k| {
                k != a
                    && k != b
                    && orient2d(&pts[a], &pts[b], &pts[k]).is_zero()
                    && within_box(&pts[a], &pts[b], &pts[k])
            })
            .collect();
        on.push(a);
        on.push(b);
        on.sort_by(|&x, &y| cmp2(&pts[x], &pts[y]));
        out.extend(on.windows(2).map(|w| undirected(w[0], w[1])));
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Strictly inside the member triangle, whatever its projected orientation.
fn strictly_inside(projection: &Projection, member: [&ExactPoint; 3], q: &Point2) -> bool {
    let [a, b, c] = member.map(|p| projection.project(p));
    let o = orient2d(&a, &b, &c);
    [orient2d(&a, &b, q), orient2d(&b, &c, q), orient2d(&c, &a, q)]
        .iter()
        .all(|x| *x == o && !o.is_zero())
}

/// Triangulate a planar group. Fails only if an internal invariant breaks.
pub(crate) fn triangulate(problem: &PlanarProblem<'_>, delaunay: bool) -> Result<Vec<Piece>, String> {
    if problem.members.is_empty() {
        return Ok(Vec::new());
    }
    let projection = problem.projection;
    let mut points = PointSet::default();
    let single = problem.members.len() == 1;

    let domain: [ExactPoint; 3] = if single {
        let [a, b, c] = problem.members[0];
        if projected_orientation(&projection, [a, b, c]) == Orientation::Negative {
            [a.clone(), c.clone(), b.clone()]
        } else {
            [a.clone(), b.clone(), c.clone()]
        }
    } else {
        super_triangle(problem)
    };
    for p in domain {
        points.insert(p, &projection);
    }

    let mut segments: Vec<(usize, usize)> = Vec::new();
    for member in &problem.members {
        let ids = member.map(|p| points.insert(p.clone(), &projection));
        if !single {
            segments.extend([(ids[0], ids[1]), (ids[1], ids[2]), (ids[2], ids[0])]);
        }
    }
    for p in &problem.points {
        points.insert(p.clone(), &projection);
    }
    for (p, q) in &problem.segments {
        let a = points.insert(p.clone(), &projection);
        let b = points.insert(q.clone(), &projection);
        if a != b {
            segments.push((a, b));
        }
    }

    let constraints = split_segments(&mut points, &segments, &projection);

    let mut tri = Triangulation::new(&points.planar, [0, 1, 2]);
    for v in 3..points.planar.len() {
        tri.insert(v)?;
    }
    for &(a, b) in &constraints {
        tri.recover(a, b)?;
    }
    if delaunay {
        tri.make_delaunay();
    }

    let three = integer(3);
    let mut pieces = Vec::new();
    for t in tri.live() {
        let [a, b, c] = t.map(|i| &points.planar[i]);
        let centroid: Point2 = [
            (&a[0] + &b[0] + &c[0]) / &three,
            (&a[1] + &b[1] + &c[1]) / &three,
        ];
        let covers: Vec<usize> = problem
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| strictly_inside(&projection, **m, &centroid))
            .map(|(i, _)| i)
            .collect();
        if !covers.is_empty() {
            pieces.push(Piece {
                corners: t.map(|i| points.exact[i].clone()),
                covers,
            });
        }
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::exact::fraction;

    fn p(x: i64, y: i64, z: i64) -> ExactPoint {
        ExactPoint::new(integer(x), integer(y), integer(z))
    }

    fn area2(pieces: &[Piece], projection: &Projection) -> Rational {
        pieces
            .iter()
            .map(|piece| {
                let [a, b, c] = piece.corners.clone().map(|q| projection.project(&q));
                orient2d_value(&a, &b, &c)
            })
            .fold(integer(0), |acc, v| acc + v)
    }

    #[test]
    fn unconstrained_facet_is_itself() {
        let (a, b, c) = (p(0, 0, 0), p(1, 0, 0), p(0, 1, 0));
        let problem = PlanarProblem {
            projection: Projection::for_triangle(&a, &b, &c),
            members: vec![[&a, &b, &c]],
            points: vec![],
            segments: vec![],
        };
        let pieces = triangulate(&problem, true).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].covers, vec![0]);
    }

    #[test]
    fn segment_through_facet_is_recovered() {
        let (a, b, c) = (p(0, 0, 0), p(4, 0, 0), p(0, 4, 0));
        let projection = Projection::for_triangle(&a, &b, &c);
        let m1 = ExactPoint::new(integer(2), integer(0), integer(0));
        let m2 = ExactPoint::new(integer(0), integer(2), integer(0));
        let inner = ExactPoint::new(integer(1), integer(1), integer(0));
        let problem = PlanarProblem {
            projection,
            members: vec![[&a, &b, &c]],
            points: vec![inner.clone()],
            segments: vec![(m1.clone(), m2.clone())],
        };
        let pieces = triangulate(&problem, true).unwrap();
        // five vertices on the boundary plus one inside
        assert_eq!(pieces.len(), 5);
        assert_eq!(area2(&pieces, &projection), integer(16));
        let has_edge = |x: &ExactPoint, y: &ExactPoint| {
            pieces.iter().any(|piece| {
                let c = &piece.corners;
                (0..3).any(|i| {
                    let (u, v) = (&c[i], &c[(i + 1) % 3]);
                    (u == x && v == y) || (u == y && v == x)
                })
            })
        };
        // the constraint is split at the point lying on it
        assert!(has_edge(&m1, &inner));
        assert!(has_edge(&inner, &m2));
        assert!(!has_edge(&m1, &m2));
    }

    #[test]
    fn constraint_points_off_the_grid() {
        let (a, b, c) = (p(0, 0, 0), p(1, 0, 0), p(0, 1, 0));
        let third = ExactPoint::new(fraction(1, 3), fraction(1, 3), integer(0));
        let problem = PlanarProblem {
            projection: Projection::for_triangle(&a, &b, &c),
            members: vec![[&a, &c, &b]],
            points: vec![third.clone()],
            segments: vec![],
        };
        let pieces = triangulate(&problem, true).unwrap();
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|piece| piece.corners.contains(&third)));
    }

    #[test]
    fn crossing_segments_meet_at_a_vertex() {
        let (a, b, c) = (p(0, 0, 0), p(4, 0, 0), p(0, 4, 0));
        let projection = Projection::for_triangle(&a, &b, &c);
        let problem = PlanarProblem {
            projection,
            members: vec![[&a, &b, &c]],
            points: vec![],
            segments: vec![(p(1, 0, 0), p(1, 3, 0)), (p(0, 1, 0), p(3, 1, 0))],
        };
        let pieces = triangulate(&problem, false).unwrap();
        let crossing = p(1, 1, 0);
        assert!(pieces.iter().any(|piece| piece.corners.contains(&crossing)));
        assert_eq!(area2(&pieces, &projection), integer(16));
    }

    #[test]
    fn overlapping_coplanar_members_share_pieces() {
        let (a, b, c) = (p(0, 0, 0), p(2, 0, 0), p(0, 2, 0));
        let (d, e, f) = (p(1, 0, 0), p(3, 0, 0), p(1, 2, 0));
        let projection = Projection::for_triangle(&a, &b, &c);
        let problem = PlanarProblem {
            projection,
            members: vec![[&a, &b, &c], [&f, &e, &d]],
            points: vec![],
            segments: vec![],
        };
        let pieces = triangulate(&problem, true).unwrap();
        let shared: Vec<_> = pieces.iter().filter(|piece| piece.covers.len() == 2).collect();
        assert!(!shared.is_empty());
        // union of both members: 2 + 2 - overlap(1/2)
        let total = area2(&pieces, &projection);
        assert_eq!(total, integer(7));
    }
}
