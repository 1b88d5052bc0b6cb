//! Shared numerical primitives anchored on `num_complex`.

use num_complex::Complex;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for impedances.
pub type CScalar = Complex<Scalar>;

/// The imaginary unit `j`.
pub const J: CScalar = Complex::new(0.0, 1.0);

/// Returns `jω`.
#[inline]
#[must_use]
pub fn j_omega(omega: Scalar) -> CScalar {
    omega * J
}

/// Returns `(jω)^α` with principal-branch complex power semantics.
#[inline]
#[must_use]
pub fn cpe_term(omega: Scalar, alpha: Scalar) -> CScalar {
    j_omega(omega).powf(alpha)
}

/// Returns `r·e^(jθ)`.
#[must_use]
pub fn polar(r: Scalar, theta: Scalar) -> CScalar {
    Complex::from_polar(r, theta)
}

/// Index of the first non-finite sample, if any.
#[must_use]
pub fn first_non_finite(values: &[CScalar]) -> Option<usize> {
    values.iter().position(|z| !z.is_finite())
}
