//! Frequency sweep generation.

use crate::constants::{angular_frequency, DEFAULT_POINTS_PER_DECADE};
use crate::errors::{EisError, Result};
use crate::math::Scalar;

/// Bounds and density of a logarithmic sweep.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    /// Initial (highest) frequency in Hz.
    pub high_freq: Scalar,
    /// Final (lowest) frequency in Hz.
    pub low_freq: Scalar,
    /// Points per decade.
    pub decades: usize,
}

impl SweepConfig {
    /// Creates a sweep configuration with the default density.
    #[must_use]
    pub fn new(high_freq: Scalar, low_freq: Scalar) -> Self {
        Self {
            high_freq,
            low_freq,
            decades: DEFAULT_POINTS_PER_DECADE,
        }
    }

    /// Overrides the density in points per decade.
    #[must_use]
    pub fn with_decades(mut self, decades: usize) -> Self {
        self.decades = decades;
        self
    }

    /// Generates the sweep described by this configuration.
    pub fn generate(&self) -> Result<FrequencySweep> {
        freq_gen(self.high_freq, self.low_freq, self.decades)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new(1.0e6, 1.0e-2)
    }
}

/// Ordered frequency axis paired with its angular frequencies.
///
/// Both columns always have the same length and `angular_frequency[i] == 2π·frequency[i]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySweep {
    frequency: Vec<Scalar>,
    angular_frequency: Vec<Scalar>,
}

impl FrequencySweep {
    /// Builds a sweep from explicit frequencies in Hz.
    ///
    /// Every frequency must be finite and strictly positive.
    pub fn from_frequencies(frequency: impl IntoIterator<Item = Scalar>) -> Result<Self> {
        let frequency: Vec<Scalar> = frequency.into_iter().collect();
        if let Some(bad) = frequency.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
            return Err(EisError::Numeric(format!(
                "sweep frequencies must be finite and positive, got {bad}"
            )));
        }
        let angular_frequency = frequency.iter().copied().map(angular_frequency).collect();
        Ok(Self {
            frequency,
            angular_frequency,
        })
    }

    /// Frequencies in Hz.
    #[must_use]
    pub fn frequency(&self) -> &[Scalar] {
        &self.frequency
    }

    /// Angular frequencies in rad/s.
    #[must_use]
    pub fn angular_frequency(&self) -> &[Scalar] {
        &self.angular_frequency
    }

    /// Number of sweep points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    /// True if the sweep holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Iterates `(f, ω)` pairs in sweep order.
    pub fn iter(&self) -> impl Iterator<Item = (Scalar, Scalar)> + '_ {
        self.frequency
            .iter()
            .copied()
            .zip(self.angular_frequency.iter().copied())
    }
}

/// Generates `n` logarithmically spaced samples from `start_hz` to `stop_hz`.
///
/// The endpoints are reproduced exactly; spacing may run in either direction.
/// Callers are expected to pass strictly positive bounds.
#[must_use]
pub fn logspace_hz(start_hz: Scalar, stop_hz: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start_hz],
        _ => {
            let log_start = start_hz.log10();
            let log_stop = stop_hz.log10();
            let step = (log_stop - log_start) / (n as Scalar - 1.0);
            let mut out: Vec<Scalar> = (0..n)
                .map(|i| 10f64.powf(log_start + step * i as Scalar))
                .collect();
            out[0] = start_hz;
            out[n - 1] = stop_hz;
            out
        }
    }
}

/// Number of points for a sweep of `decades` points per decade between the bounds.
fn point_count(high_freq: Scalar, low_freq: Scalar, decades: usize) -> usize {
    let span = high_freq.log10() - low_freq.log10();
    let n = (decades as Scalar * span).round() as usize;
    // Keep both endpoints whenever the bounds differ.
    if high_freq > low_freq {
        n.max(2)
    } else {
        n.max(1)
    }
}

/// Generates a logarithmic sweep from `high_freq` down to `low_freq` (inclusive).
///
/// The sweep holds `round(decades · (log10(high_freq) − log10(low_freq)))` points,
/// starts exactly at `high_freq` and ends exactly at `low_freq`.
///
/// # Errors
///
/// [`EisError::InvalidRange`] when `high_freq < low_freq`, when a bound is not
/// finite and positive, or when `decades` is zero.
pub fn freq_gen(high_freq: Scalar, low_freq: Scalar, decades: usize) -> Result<FrequencySweep> {
    let valid_bound = |f: Scalar| f.is_finite() && f > 0.0;
    if !valid_bound(high_freq) || !valid_bound(low_freq) || high_freq < low_freq || decades == 0 {
        return Err(EisError::InvalidRange {
            high: high_freq,
            low: low_freq,
            decades,
        });
    }
    let n = point_count(high_freq, low_freq, decades);
    tracing::debug!(high_freq, low_freq, decades, points = n, "generating frequency sweep");
    let frequency = logspace_hz(high_freq, low_freq, n);
    let angular_frequency = frequency.iter().copied().map(angular_frequency).collect();
    Ok(FrequencySweep {
        frequency,
        angular_frequency,
    })
}
