//! Exact orientation predicates
//!
//! Every predicate returns one of a finite set of outcomes and is exact for
//! all finite inputs. Rational evaluation is the reference; the `robust`
//! adaptive filters are used only when every operand is an input coordinate
//! (exactly representable as `f64`) and lies in the filter's safe range.

use crate::float_types::Real;
use crate::kernel::exact::{ExactPoint, ExactVector, Point2, Rational, sign};
use num_traits::Zero;

/// Outcome of an orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Left of / above the reference (counter-clockwise)
    Positive,
    /// Right of / below the reference (clockwise)
    Negative,
    /// On the reference line or plane
    Zero,
}

impl Orientation {
    #[inline]
    pub fn of(value: &Rational) -> Self {
        match sign(value) {
            1 => Orientation::Positive,
            -1 => Orientation::Negative,
            _ => Orientation::Zero,
        }
    }

    #[inline]
    pub fn of_real(value: Real) -> Self {
        if value > 0.0 {
            Orientation::Positive
        } else if value < 0.0 {
            Orientation::Negative
        } else {
            Orientation::Zero
        }
    }

    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Orientation::Positive => Orientation::Negative,
            Orientation::Negative => Orientation::Positive,
            Orientation::Zero => Orientation::Zero,
        }
    }

    #[inline]
    pub const fn as_i8(self) -> i8 {
        match self {
            Orientation::Positive => 1,
            Orientation::Negative => -1,
            Orientation::Zero => 0,
        }
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        matches!(self, Orientation::Zero)
    }

    /// Strictly opposite non-zero orientations.
    #[inline]
    pub const fn opposes(self, other: Orientation) -> bool {
        self.as_i8() * other.as_i8() < 0
    }
}

/// Outcome of a closed segment against a closed triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentTriangle {
    /// No common point
    Disjoint,
    /// Common points exist but only on the boundary of the segment or of the triangle,
    /// or the segment lies in the triangle's plane
    Touches,
    /// The segment's interior crosses the triangle's interior at a single point
    Intersects,
}

/// Signed volume `det[b - a, c - a, d - a]`: positive when `d` lies on the
/// side the right-hand normal of `(a, b, c)` points to.
pub fn orient3d_value(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint, d: &ExactPoint) -> Rational {
    let ab = b.sub(a);
    let ac = c.sub(a);
    let ad = d.sub(a);
    ab.cross(&ac).dot(&ad)
}

/// Exact orientation of `d` relative to the oriented plane `(a, b, c)`.
pub fn orient3d(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint, d: &ExactPoint) -> Orientation {
    Orientation::of(&orient3d_value(a, b, c, d))
}

/// Orientation of `d` relative to `(a, b, c)` for floating-point inputs,
/// evaluated with Shewchuk's adaptive predicate.
///
/// Exact as long as every coordinate satisfies
/// [`crate::float_types::within_filter_range`].
pub fn orient3d_filtered(a: [Real; 3], b: [Real; 3], c: [Real; 3], d: [Real; 3]) -> Orientation {
    let coord = |p: [Real; 3]| robust::Coord3D { x: p[0], y: p[1], z: p[2] };
    // robust reports positive when d lies below the counter-clockwise plane
    Orientation::of_real(robust::orient3d(coord(a), coord(b), coord(c), coord(d))).reversed()
}

/// Twice the signed area of the 2D triangle `(a, b, c)`.
pub fn orient2d_value(a: &Point2, b: &Point2, c: &Point2) -> Rational {
    let abx = &b[0] - &a[0];
    let aby = &b[1] - &a[1];
    let acx = &c[0] - &a[0];
    let acy = &c[1] - &a[1];
    abx * acy - aby * acx
}

/// Exact orientation of `c` relative to the directed line `a -> b`.
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> Orientation {
    Orientation::of(&orient2d_value(a, b, c))
}

/// Exact orientation of `c` relative to `a -> b` for floating-point inputs.
pub fn orient2d_filtered(a: [Real; 2], b: [Real; 2], c: [Real; 2]) -> Orientation {
    let coord = |p: [Real; 2]| robust::Coord { x: p[0], y: p[1] };
    Orientation::of_real(robust::orient2d(coord(a), coord(b), coord(c)))
}

/// Positive when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `(a, b, c)`.
pub fn incircle(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> Orientation {
    let adx = &a[0] - &d[0];
    let ady = &a[1] - &d[1];
    let bdx = &b[0] - &d[0];
    let bdy = &b[1] - &d[1];
    let cdx = &c[0] - &d[0];
    let cdy = &c[1] - &d[1];

    let ab_det = &adx * &bdy - &bdx * &ady;
    let bc_det = &bdx * &cdy - &cdx * &bdy;
    let ca_det = &cdx * &ady - &adx * &cdy;

    let a_lift = &adx * &adx + &ady * &ady;
    let b_lift = &bdx * &bdx + &bdy * &bdy;
    let c_lift = &cdx * &cdx + &cdy * &cdy;

    Orientation::of(&(a_lift * bc_det + b_lift * ca_det + c_lift * ab_det))
}

/// Projects points of a plane onto the coordinate plane that drops the
/// normal's dominant axis. The kept axes are taken in cyclic order, so the
/// projected orientation of a triangle equals the sign of its normal's
/// dominant component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub axis: usize,
}

impl Projection {
    pub const fn dropping(axis: usize) -> Self {
        Projection { axis }
    }

    /// Projection for the plane through a non-degenerate triangle.
    pub fn for_triangle(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint) -> Self {
        Projection {
            axis: b.sub(a).cross(&c.sub(a)).dominant_axis(),
        }
    }

    pub fn project(&self, p: &ExactPoint) -> Point2 {
        [
            p.coord((self.axis + 1) % 3).clone(),
            p.coord((self.axis + 2) % 3).clone(),
        ]
    }

    /// The point of the plane through `origin` with `normal` that projects to `p`.
    /// `normal` must have a non-zero component along the dropped axis.
    pub fn lift(&self, p: &Point2, normal: &ExactVector, origin: &ExactPoint) -> ExactPoint {
        let (i, j, k) = ((self.axis + 1) % 3, (self.axis + 2) % 3, self.axis);
        let offset = normal.dot(&origin.sub(&ExactPoint::origin()));
        let dropped = (offset - normal.coord(i) * &p[0] - normal.coord(j) * &p[1]) / normal.coord(k);
        let mut coords = [Rational::zero(), Rational::zero(), Rational::zero()];
        coords[i] = p[0].clone();
        coords[j] = p[1].clone();
        coords[k] = dropped;
        let [x, y, z] = coords;
        ExactPoint::new(x, y, z)
    }
}

/// Closed point-in-triangle test for a point known to lie in the triangle's plane.
pub fn point_in_triangle(projection: &Projection, p: &ExactPoint, tri: [&ExactPoint; 3]) -> bool {
    let [a, b, c] = tri.map(|v| projection.project(v));
    let q = projection.project(p);
    let o = [orient2d(&b, &c, &q), orient2d(&c, &a, &q), orient2d(&a, &b, &q)];
    !(o.iter().any(|x| *x == Orientation::Positive) && o.iter().any(|x| *x == Orientation::Negative))
}

/// Classify the closed segment `p q` against the closed triangle `(a, b, c)`.
pub fn segment_triangle(p: &ExactPoint, q: &ExactPoint, tri: [&ExactPoint; 3]) -> SegmentTriangle {
    let [a, b, c] = tri;
    let sp = orient3d(a, b, c, p);
    let sq = orient3d(a, b, c, q);

    if sp.is_zero() && sq.is_zero() {
        let projection = Projection::for_triangle(a, b, c);
        let touches = point_in_triangle(&projection, p, tri)
            || point_in_triangle(&projection, q, tri)
            || tri_edges(tri).iter().any(|(u, v)| segments_meet_2d(&projection, p, q, u, v));
        return if touches { SegmentTriangle::Touches } else { SegmentTriangle::Disjoint };
    }
    if !sp.opposes(sq) && !sp.is_zero() && !sq.is_zero() {
        return SegmentTriangle::Disjoint;
    }

    let e = [orient3d(p, q, a, b), orient3d(p, q, b, c), orient3d(p, q, c, a)];
    let has_pos = e.iter().any(|o| *o == Orientation::Positive);
    let has_neg = e.iter().any(|o| *o == Orientation::Negative);
    if has_pos && has_neg {
        return SegmentTriangle::Disjoint;
    }
    if sp.is_zero() || sq.is_zero() || e.iter().any(|o| o.is_zero()) {
        SegmentTriangle::Touches
    } else {
        SegmentTriangle::Intersects
    }
}

fn tri_edges<'a>(tri: [&'a ExactPoint; 3]) -> [(&'a ExactPoint, &'a ExactPoint); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

/// Closed 2D segment intersection test in a projection.
fn segments_meet_2d(projection: &Projection, p: &ExactPoint, q: &ExactPoint, u: &ExactPoint, v: &ExactPoint) -> bool {
    let [p, q, u, v] = [p, q, u, v].map(|x| projection.project(x));
    let o1 = orient2d(&p, &q, &u);
    let o2 = orient2d(&p, &q, &v);
    let o3 = orient2d(&u, &v, &p);
    let o4 = orient2d(&u, &v, &q);
    if o1.opposes(o2) && o3.opposes(o4) {
        return true;
    }
    let on = |a: &Point2, b: &Point2, x: &Point2, o: Orientation| {
        o.is_zero() && within_box(a, b, x)
    };
    on(&p, &q, &u, o1) || on(&p, &q, &v, o2) || on(&u, &v, &p, o3) || on(&u, &v, &q, o4)
}

/// `x` lies in the closed axis-aligned box spanned by `a` and `b`.
pub fn within_box(a: &Point2, b: &Point2, x: &Point2) -> bool {
    (0..2).all(|i| {
        let (lo, hi) = if a[i] <= b[i] { (&a[i], &b[i]) } else { (&b[i], &a[i]) };
        *lo <= x[i] && x[i] <= *hi
    })
}

/// `true` if the three points are collinear (or coincide).
pub fn collinear(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint) -> bool {
    b.sub(a).cross(&c.sub(a)).is_zero()
}

/// `true` if the three floating-point points are collinear, decided exactly.
pub fn collinear_filtered(a: [Real; 3], b: [Real; 3], c: [Real; 3]) -> bool {
    (0..3).all(|axis| {
        let (i, j) = ((axis + 1) % 3, (axis + 2) % 3);
        orient2d_filtered([a[i], a[j]], [b[i], b[j]], [c[i], c[j]]).is_zero()
    })
}

/// Parameter `t` at which the segment from a point with plane-value `from`
/// to a point with plane-value `to` crosses the zero level.
pub fn crossing_parameter(from: &Rational, to: &Rational) -> Rational {
    let denom = from - to;
    if denom.is_zero() {
        Rational::zero()
    } else {
        from / denom
    }
}
