//! Scalar helpers.

use std::f32::consts;

/// π.
#[inline]
pub const fn pi() -> f32 {
    consts::PI
}

/// π / 2.
#[inline]
pub const fn pi_2() -> f32 {
    consts::FRAC_PI_2
}

/// π / 4.
#[inline]
pub const fn pi_4() -> f32 {
    consts::FRAC_PI_4
}

/// Cotangent of `x` in radians.
#[inline]
pub fn cot(x: f32) -> f32 {
    1.0 / x.tan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cot() {
        assert!((cot(pi_4()) - 1.0).abs() < 1e-6);
        assert!(cot(pi_2()).abs() < 1e-6);
    }

    #[test]
    fn test_pi_fractions() {
        assert_eq!(pi_2() * 2.0, pi());
        assert_eq!(pi_4() * 4.0, pi());
    }
}
