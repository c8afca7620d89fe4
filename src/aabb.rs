use crate::float_types::{BOX_PADDING, Real};
use crate::kernel::ExactPoint;
use nalgebra::Point3;

/// Axis-aligned bounding box used for broad-phase culling.
///
/// Boxes of input facets are exact (input coordinates are `f64`). Boxes of
/// constructed geometry are built from rounded coordinates and must be
/// [`Aabb::padded`] before they are used to exclude a pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub mins: Point3<Real>,
    pub maxs: Point3<Real>,
}

impl Aabb {
    #[inline]
    pub const fn new(mins: Point3<Real>, maxs: Point3<Real>) -> Self {
        Self { mins, maxs }
    }

    /// The inverted box that contains nothing and grows on the first merge.
    pub fn empty() -> Self {
        Self {
            mins: Point3::new(Real::MAX, Real::MAX, Real::MAX),
            maxs: Point3::new(Real::MIN, Real::MIN, Real::MIN),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<Real>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.grow(p);
        }
        aabb
    }

    /// Conservative box around exact points.
    pub fn from_exact<'a>(points: impl IntoIterator<Item = &'a ExactPoint>) -> Self {
        let rounded: Vec<Point3<Real>> = points.into_iter().map(ExactPoint::to_point).collect();
        Self::from_points(&rounded).padded()
    }

    pub fn grow(&mut self, p: &Point3<Real>) {
        for i in 0..3 {
            self.mins[i] = self.mins[i].min(p[i]);
            self.maxs[i] = self.maxs[i].max(p[i]);
        }
    }

    pub fn merged(&self, other: &Self) -> Self {
        let mut out = *self;
        out.grow(&other.mins);
        out.grow(&other.maxs);
        out
    }

    /// Closed overlap test; boxes that only touch do intersect.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.maxs.x >= other.mins.x
            && self.mins.x <= other.maxs.x
            && self.maxs.y >= other.mins.y
            && self.mins.y <= other.maxs.y
            && self.maxs.z >= other.mins.z
            && self.mins.z <= other.maxs.z
    }

    #[inline]
    pub fn center(&self) -> Point3<Real> {
        Point3::new(
            (self.mins.x + self.maxs.x) * 0.5,
            (self.mins.y + self.maxs.y) * 0.5,
            (self.mins.z + self.maxs.z) * 0.5,
        )
    }

    pub fn longest_axis(&self) -> usize {
        let d = self.maxs - self.mins;
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Grown by a relative margin that covers the rounding of each coordinate.
    pub fn padded(&self) -> Self {
        let pad = |v: Real| v.abs() * BOX_PADDING + Real::MIN_POSITIVE;
        let mut out = *self;
        for i in 0..3 {
            out.mins[i] -= pad(self.mins[i]);
            out.maxs[i] += pad(self.maxs[i]);
        }
        out
    }
}

#[cfg(feature = "parry")]
impl From<Aabb> for crate::float_types::parry3d::bounding_volume::Aabb {
    fn from(aabb: Aabb) -> Self {
        crate::float_types::parry3d::bounding_volume::Aabb::new(aabb.mins, aabb.maxs)
    }
}
