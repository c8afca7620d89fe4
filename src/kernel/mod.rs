//! Exact geometric predicate kernel
//!
//! Every decision taken by the arrangement pipeline goes through this module.
//! Points carry exact rational coordinates; points that came straight from
//! the input additionally remember their `f64` coordinates so that the
//! filtered engines can decide orientation with `robust`'s adaptive
//! predicates instead of rational arithmetic.

pub mod exact;
pub mod predicates;

pub use exact::{ExactPoint, ExactVector, Point2, Rational};
pub use predicates::{Orientation, Projection, SegmentTriangle};

use crate::float_types::Real;

/// A vertex as seen by the predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelPoint {
    /// Exact position.
    pub exact: ExactPoint,
    /// Floating-point coordinates equal to `exact`, present for input vertices only.
    pub input: Option<[Real; 3]>,
}

impl KernelPoint {
    /// An input vertex. `None` for non-finite coordinates.
    pub fn from_input(p: [Real; 3]) -> Option<Self> {
        Some(KernelPoint {
            exact: ExactPoint::from_f64(p)?,
            input: Some(p),
        })
    }

    /// A constructed vertex (intersection point).
    pub const fn constructed(exact: ExactPoint) -> Self {
        KernelPoint { exact, input: None }
    }
}

/// Predicate evaluation strategy of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kernel {
    /// Rational arithmetic for everything.
    #[default]
    Rational,
    /// Adaptive floating-point predicates whenever all operands are input
    /// vertices, rational arithmetic otherwise.
    Adaptive,
}

impl Kernel {
    /// Orientation of `d` relative to the oriented plane `(a, b, c)`.
    pub fn orient3d(&self, a: &KernelPoint, b: &KernelPoint, c: &KernelPoint, d: &KernelPoint) -> Orientation {
        if let (Kernel::Adaptive, Some(pa), Some(pb), Some(pc), Some(pd)) = (self, a.input, b.input, c.input, d.input) {
            return predicates::orient3d_filtered(pa, pb, pc, pd);
        }
        predicates::orient3d(&a.exact, &b.exact, &c.exact, &d.exact)
    }

    /// `true` if `a`, `b` and `c` are collinear or coincide.
    pub fn collinear(&self, a: &KernelPoint, b: &KernelPoint, c: &KernelPoint) -> bool {
        if let (Kernel::Adaptive, Some(pa), Some(pb), Some(pc)) = (self, a.input, b.input, c.input) {
            return predicates::collinear_filtered(pa, pb, pc);
        }
        predicates::collinear(&a.exact, &b.exact, &c.exact)
    }
}
