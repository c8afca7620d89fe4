// Re-export parry for the backend engine
#[cfg(feature = "parry")]
pub use parry3d_f64 as parry3d;

/// Floating-point scalar used for input coordinates and reported geometry.
///
/// Decisions are never taken on this type: every predicate is evaluated either
/// on exact rationals or with `robust`'s adaptive-precision filters.
pub type Real = f64;

/// Largest coordinate magnitude the `robust`-filtered engines accept.
///
/// Products of three coordinate differences must stay far from overflow for
/// the adaptive orientation test to remain exact.
pub const FILTER_MAX_MAGNITUDE: Real = 1.606_938_044_258_990_3e60; // 2^200

/// Smallest non-zero coordinate magnitude the `robust`-filtered engines accept.
///
/// Below this the error-free expansions used by `robust` may underflow.
pub const FILTER_MIN_MAGNITUDE: Real = 6.223_015_277_861_142e-61; // 2^-200

/// Relative padding applied to bounding boxes built from rounded coordinates.
///
/// Only used for broad-phase culling of already-constructed geometry, never
/// to decide a geometric predicate.
pub const BOX_PADDING: Real = 1e-9;

/// Returns `true` if `value` can be handled exactly by the filtered engines.
#[inline]
pub fn within_filter_range(value: Real) -> bool {
    let magnitude = value.abs();
    magnitude == 0.0
        || (FILTER_MIN_MAGNITUDE..=FILTER_MAX_MAGNITUDE).contains(&magnitude)
}
