//! Process-wide numeric tolerance.
//!
//! Every comparison in the toolkit reads the same epsilon. The value is
//! stored in an atomic so reads never race, but updating it while other
//! threads are computing still changes their results mid-flight: set it
//! once, before any parallel work starts.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Point3, Scalar};

/// Default tolerance, `1e-6`.
pub const DEFAULT_EPSILON: Scalar = 1e-6;

// Bit pattern of `1e-6_f64`.
const DEFAULT_EPSILON_BITS: u64 = 0x3eb0_c6f7_a0b5_ed8d;

static EPSILON_BITS: AtomicU64 = AtomicU64::new(DEFAULT_EPSILON_BITS);

/// Current tolerance.
#[inline]
pub fn epsilon() -> Scalar {
    f64::from_bits(EPSILON_BITS.load(Ordering::Relaxed)) as Scalar
}

/// Square of the current tolerance.
#[inline]
pub fn epsilon_sq() -> Scalar {
    Tolerance::current().eps_sq()
}

/// Replace the process-wide tolerance.
///
/// Non-finite or non-positive values are ignored.
pub fn set_epsilon(eps: Scalar) {
    if !eps.is_finite() || eps <= 0.0 {
        tracing::warn!(eps = f64::from(eps), "ignoring invalid tolerance");
        return;
    }
    EPSILON_BITS.store(f64::from(eps).to_bits(), Ordering::Relaxed);
    tracing::debug!(eps = f64::from(eps), "tolerance updated");
}

/// Restore the default tolerance.
pub fn reset_epsilon() {
    EPSILON_BITS.store(DEFAULT_EPSILON_BITS, Ordering::Relaxed);
}

/// `|x| <= eps`.
#[inline]
pub fn is_zero(x: Scalar) -> bool {
    Tolerance::current().is_zero(x)
}

/// A snapshot of the tolerance policy.
///
/// Useful when a computation should keep using one epsilon even if the
/// global value is changed later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub eps: Scalar,
}

impl Tolerance {
    /// Default tolerance (`1e-6`).
    pub const DEFAULT: Self = Self {
        eps: DEFAULT_EPSILON,
    };

    /// Snapshot of the process-wide tolerance.
    #[inline]
    pub fn current() -> Self {
        Self { eps: epsilon() }
    }

    /// Square of `eps`.
    #[inline]
    pub fn eps_sq(&self) -> Scalar {
        self.eps * self.eps
    }

    /// Check if two points are coincident within tolerance.
    #[inline]
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm_squared() <= self.eps_sq()
    }

    /// Check if a scalar is effectively zero.
    #[inline]
    pub fn is_zero(&self, d: Scalar) -> bool {
        d.abs() <= self.eps
    }

    /// Make this snapshot the process-wide tolerance.
    pub fn install(&self) {
        set_epsilon(self.eps);
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bits_match_default_epsilon() {
        assert_eq!(f64::from_bits(DEFAULT_EPSILON_BITS), 1e-6);
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-7, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point3::new(1.001, 2.0, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }

    #[test]
    fn test_tolerance_is_zero() {
        let tol = Tolerance { eps: 1e-3 };
        assert!(tol.is_zero(5e-4));
        assert!(tol.is_zero(-1e-3));
        assert!(!tol.is_zero(2e-3));
        assert!((tol.eps_sq() - 1e-6).abs() < 1e-12);
    }

    #[test]
    fn test_free_functions_follow_snapshot() {
        // Reads only; the global value is mutated solely by the facade's
        // tolerance test binary.
        let tol = Tolerance::current();
        assert_eq!(tol, Tolerance::DEFAULT);
        assert_eq!(epsilon_sq(), tol.eps_sq());
        assert_eq!(is_zero(5e-7), tol.is_zero(5e-7));
        assert!(!is_zero(2e-6));
    }
}
