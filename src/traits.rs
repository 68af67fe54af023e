//! Floating-point tolerance helpers shared by the simplifier, integrator and renderer.
//!
//! Numbers are stored as `f64`; these helpers avoid precision issues like
//! `1.0/3.0 * 3.0 != 1.0` when matching identities. A value is only treated
//! as zero relative to the magnitudes that produced it.

/// Default tolerance for floating-point comparisons
pub(crate) const FLOAT_TOLERANCE: f64 = 1e-10;

/// Largest denominator tried when displaying a coefficient as a fraction
const MAX_DENOMINATOR: i64 = 1000;

/// Check if `total` is rounding noise left by adding numbers up to `scale` in magnitude
#[inline]
pub(crate) fn cancels(total: f64, scale: f64) -> bool {
    total == 0.0 || total.abs() <= FLOAT_TOLERANCE * scale
}

/// Round to the nearest non-zero integer when within rounding noise of it
#[inline]
pub(crate) fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if rounded != 0.0 && (v - rounded).abs() < FLOAT_TOLERANCE * rounded.abs() {
        rounded
    } else {
        v
    }
}

/// Check if a float is approximately one (within tolerance)
#[inline]
pub(crate) fn is_one(n: f64) -> bool {
    (n - 1.0).abs() < FLOAT_TOLERANCE
}

/// Check if a float is approximately negative one (within tolerance)
#[inline]
pub(crate) fn is_neg_one(n: f64) -> bool {
    (n + 1.0).abs() < FLOAT_TOLERANCE
}

/// Approximate equality used for numeric pattern matching
#[inline]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < FLOAT_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Check if a float holds an integer value that survives an `i64` round trip
#[inline]
pub(crate) fn is_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15
}

/// Recover a small fraction `p/q` from a float, if one exists.
///
/// Returns `None` for integers, non-finite values and values without a
/// denominator up to 1000. The numerator is never zero.
pub(crate) fn as_fraction(n: f64) -> Option<(i64, i64)> {
    if !n.is_finite() || is_integer(n) || is_integer(snap(n)) {
        return None;
    }
    for den in 2..=MAX_DENOMINATOR {
        let rounded = (n * den as f64).round();
        if rounded == 0.0 || rounded.abs() >= 1e15 {
            continue;
        }
        if (rounded / den as f64 - n).abs() <= FLOAT_TOLERANCE * n.abs() {
            return Some((rounded as i64, den));
        }
    }
    None
}
