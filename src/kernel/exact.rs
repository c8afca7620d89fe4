//! Exact rational points and vectors

use crate::float_types::Real;
use nalgebra::Point3;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

/// Arbitrary-precision rational scalar.
pub type Rational = BigRational;

/// A point with exact rational coordinates.
///
/// Equality, hashing and ordering are exact; two points are the same vertex
/// if and only if they compare equal. The derived ordering is lexicographic
/// on `(x, y, z)`, which is monotone along any line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExactPoint {
    pub x: Rational,
    pub y: Rational,
    pub z: Rational,
}

/// An exact rational vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactVector {
    pub x: Rational,
    pub y: Rational,
    pub z: Rational,
}

/// A point in a 2D projection of a plane.
pub type Point2 = [Rational; 2];

/// Converts a finite `f64` into the rational with exactly the same value.
pub fn rational(value: Real) -> Option<Rational> {
    Rational::from_float(value)
}

/// Rational from a small integer.
pub fn integer(value: i64) -> Rational {
    Rational::from_integer(BigInt::from(value))
}

/// Rational `numer / denom`.
pub fn fraction(numer: i64, denom: i64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

/// Sign of a rational as `-1`, `0` or `1`.
#[inline]
pub fn sign(value: &Rational) -> i8 {
    if value.is_zero() {
        0
    } else if value.is_positive() {
        1
    } else {
        -1
    }
}

impl ExactPoint {
    pub const fn new(x: Rational, y: Rational, z: Rational) -> Self {
        ExactPoint { x, y, z }
    }

    /// Exact conversion of a floating-point position. `None` if any
    /// coordinate is NaN or infinite.
    pub fn from_f64(p: [Real; 3]) -> Option<Self> {
        Some(ExactPoint {
            x: rational(p[0])?,
            y: rational(p[1])?,
            z: rational(p[2])?,
        })
    }

    pub fn origin() -> Self {
        ExactPoint {
            x: Rational::zero(),
            y: Rational::zero(),
            z: Rational::zero(),
        }
    }

    /// Coordinate along `axis` (0 = x, 1 = y, 2 = z).
    #[inline]
    pub const fn coord(&self, axis: usize) -> &Rational {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    /// Nearest floating-point position, used for output only.
    pub fn to_point(&self) -> Point3<Real> {
        Point3::new(to_real(&self.x), to_real(&self.y), to_real(&self.z))
    }

    pub fn sub(&self, other: &ExactPoint) -> ExactVector {
        ExactVector {
            x: &self.x - &other.x,
            y: &self.y - &other.y,
            z: &self.z - &other.z,
        }
    }

    pub fn add(&self, v: &ExactVector) -> ExactPoint {
        ExactPoint {
            x: &self.x + &v.x,
            y: &self.y + &v.y,
            z: &self.z + &v.z,
        }
    }

    /// `self + t * (other - self)`
    pub fn lerp(&self, other: &ExactPoint, t: &Rational) -> ExactPoint {
        self.add(&other.sub(self).scale(t))
    }

    /// Weighted combination `(wa * a + wb * b + wc * c) / (wa + wb + wc)`.
    pub fn barycentric(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint, weights: [i64; 3]) -> ExactPoint {
        let [wa, wb, wc] = weights.map(integer);
        let total = &wa + &wb + &wc;
        let combine = |pa: &Rational, pb: &Rational, pc: &Rational| (pa * &wa + pb * &wb + pc * &wc) / &total;
        ExactPoint {
            x: combine(&a.x, &b.x, &c.x),
            y: combine(&a.y, &b.y, &c.y),
            z: combine(&a.z, &b.z, &c.z),
        }
    }
}

impl ExactVector {
    pub fn dot(&self, other: &ExactVector) -> Rational {
        &self.x * &other.x + &self.y * &other.y + &self.z * &other.z
    }

    pub fn cross(&self, other: &ExactVector) -> ExactVector {
        ExactVector {
            x: &self.y * &other.z - &self.z * &other.y,
            y: &self.z * &other.x - &self.x * &other.z,
            z: &self.x * &other.y - &self.y * &other.x,
        }
    }

    pub fn scale(&self, t: &Rational) -> ExactVector {
        ExactVector {
            x: &self.x * t,
            y: &self.y * t,
            z: &self.z * t,
        }
    }

    pub fn neg(&self) -> ExactVector {
        ExactVector {
            x: -&self.x,
            y: -&self.y,
            z: -&self.z,
        }
    }

    #[inline]
    pub const fn coord(&self, axis: usize) -> &Rational {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }

    /// Index of the component with the largest magnitude. Ties resolve to the
    /// highest axis so the choice is deterministic.
    pub fn dominant_axis(&self) -> usize {
        let ax = self.x.abs();
        let ay = self.y.abs();
        let az = self.z.abs();
        if ax > ay && ax > az {
            0
        } else if ay > az {
            1
        } else {
            2
        }
    }
}

/// Nearest `f64` to a rational.
pub fn to_real(value: &Rational) -> Real {
    value.to_f64().unwrap_or(Real::NAN)
}

/// Compare two 2D points lexicographically.
pub fn cmp2(a: &Point2, b: &Point2) -> Ordering {
    a[0].cmp(&b[0]).then_with(|| a[1].cmp(&b[1]))
}
