//! Decomposition of complex impedance into its scalar columns.

use crate::errors::{EisError, Result};
use crate::math::{first_non_finite, CScalar, Scalar};

/// How the phase angle column is computed.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseConvention {
    /// Quadrant-correct `atan2(im, re)`.
    #[default]
    Atan2,
    /// `atan(im/re)`, which folds the left half plane onto the right. Only
    /// useful to reproduce historical datasets.
    LegacyAtan,
}

impl PhaseConvention {
    /// Phase of `z` in radians.
    #[inline]
    #[must_use]
    pub fn phase(self, z: CScalar) -> Scalar {
        match self {
            Self::Atan2 => z.im.atan2(z.re),
            Self::LegacyAtan => (z.im / z.re).atan(),
        }
    }
}

/// Complex impedance and its derived columns, one entry per sweep point.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ImpedanceResponse {
    /// Complex impedance in ohms.
    pub complex: Vec<CScalar>,
    /// Real part in ohms.
    pub real: Vec<Scalar>,
    /// Imaginary part in ohms.
    pub imag: Vec<Scalar>,
    /// Magnitude `hypot(re, im)` in ohms.
    pub magnitude: Vec<Scalar>,
    /// Phase angle in radians.
    pub phase: Vec<Scalar>,
}

impl ImpedanceResponse {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.complex.len()
    }

    /// True if the response holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.complex.is_empty()
    }
}

/// Magnitude of a complex sequence.
#[must_use]
pub fn magnitude(values: impl IntoIterator<Item = CScalar>) -> Vec<Scalar> {
    values
        .into_iter()
        .map(|z| z.norm())
        .collect()
}

/// Phase in radians of a complex sequence.
#[must_use]
pub fn phase_rad(
    values: impl IntoIterator<Item = CScalar>,
    convention: PhaseConvention,
) -> Vec<Scalar> {
    values.into_iter().map(|z| convention.phase(z)).collect()
}

/// Splits `values` into real, imaginary, magnitude and phase columns.
///
/// # Errors
///
/// [`EisError::Numeric`] if any sample is not finite.
pub fn decompose(values: &[CScalar], convention: PhaseConvention) -> Result<ImpedanceResponse> {
    if let Some(idx) = first_non_finite(values) {
        return Err(EisError::Numeric(format!(
            "non-finite impedance {} at sample {idx}",
            values[idx]
        )));
    }
    Ok(ImpedanceResponse {
        complex: values.to_vec(),
        real: values.iter().map(|z| z.re).collect(),
        imag: values.iter().map(|z| z.im).collect(),
        magnitude: magnitude(values.iter().copied()),
        phase: phase_rad(values.iter().copied(), convention),
    })
}
