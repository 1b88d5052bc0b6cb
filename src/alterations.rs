//! Synthetic alterations applied on top of a clean simulated response.
//!
//! Every transform reads the clean columns and returns new `*_noise` columns;
//! the clean columns are never modified.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::constants::DEFAULT_EXCITATION_VOLTAGE;
use crate::errors::{EisError, Result};
use crate::impedance::ImpedanceResponse;
use crate::math::{polar, CScalar, Scalar};

/// Catalogue of alterations; exactly one is applied per record.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alteration {
    /// Trigonometric jitter of the frequency axis; the circuit is re-evaluated
    /// at the jittered angular frequencies.
    FreqNoise,
    /// Trigonometric jitter of the real part.
    RealNoise,
    /// Trigonometric jitter of the imaginary part.
    ImagNoise,
    /// Gaussian radius with uniform phase added to both parts.
    ComplexNoise,
    /// Gaussian noise on the implied current `I = V/Z`.
    CurrentNoise,
    /// Gaussian noise on the excitation voltage.
    VoltageNoise,
    /// Correlated noise on both the voltage and the current.
    IvNoise,
    /// Sparse large deviations.
    Outliers,
}

impl Alteration {
    /// Every supported alteration.
    pub const ALL: [Self; 8] = [
        Self::FreqNoise,
        Self::RealNoise,
        Self::ImagNoise,
        Self::ComplexNoise,
        Self::CurrentNoise,
        Self::VoltageNoise,
        Self::IvNoise,
        Self::Outliers,
    ];

    /// Canonical name, as written in record headers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FreqNoise => "freq_noise",
            Self::RealNoise => "real_noise",
            Self::ImagNoise => "imag_noise",
            Self::ComplexNoise => "complex_noise",
            Self::CurrentNoise => "current_noise",
            Self::VoltageNoise => "voltage_noise",
            Self::IvNoise => "iv_noise",
            Self::Outliers => "outliers",
        }
    }

    /// Tag used in file names. Free of `_` and `-`, which separate file name fields.
    #[must_use]
    pub const fn file_tag(self) -> &'static str {
        match self {
            Self::FreqNoise => "freqnoise",
            Self::RealNoise => "realnoise",
            Self::ImagNoise => "imagnoise",
            Self::ComplexNoise => "complexnoise",
            Self::CurrentNoise => "currentnoise",
            Self::VoltageNoise => "voltagenoise",
            Self::IvNoise => "ivnoise",
            Self::Outliers => "outliers",
        }
    }

    /// Looks an alteration up by its file tag.
    #[must_use]
    pub fn from_file_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.file_tag() == tag)
    }
}

impl fmt::Display for Alteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Alteration {
    type Err = EisError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s || a.file_tag() == s)
            .ok_or_else(|| EisError::UnsupportedAlteration(s.to_owned()))
    }
}

/// Choice between the cosine and sine branch of the trigonometric jitter.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchSelector {
    /// Fair coin.
    #[default]
    CoinFlip,
    /// Parity of a random entry of a short Fibonacci table (cosine on even),
    /// which picks cosine with probability 1/3.
    Fibonacci,
}

const FIBONACCI: [u32; 12] = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89];

impl BranchSelector {
    /// True when the cosine branch is selected.
    pub fn cosine<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        match self {
            Self::CoinFlip => rng.random_bool(0.5),
            Self::Fibonacci => FIBONACCI[rng.random_range(0..FIBONACCI.len())] % 2 == 0,
        }
    }
}

/// Tuning shared by all alterations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlterationParams {
    /// Relative noise scale in `[0, 1]`.
    pub noise_scale: Scalar,
    /// Excitation amplitude in volts for the current/voltage models.
    pub excitation_voltage: Scalar,
    /// Probability per sample of an outlier, in `[0, 1]`.
    pub outlier_fraction: Scalar,
    /// Outlier deviation relative to the sample magnitude.
    pub outlier_amplitude: Scalar,
    /// Trigonometric branch selection for the jitter alterations.
    pub branch: BranchSelector,
}

impl Default for AlterationParams {
    fn default() -> Self {
        Self {
            noise_scale: 0.4,
            excitation_voltage: DEFAULT_EXCITATION_VOLTAGE,
            outlier_fraction: 0.05,
            outlier_amplitude: 0.5,
            branch: BranchSelector::CoinFlip,
        }
    }
}

impl AlterationParams {
    /// Default parameters with the given noise scale.
    #[must_use]
    pub fn with_noise_scale(noise_scale: Scalar) -> Self {
        Self {
            noise_scale,
            ..Self::default()
        }
    }

    /// Rejects out-of-range parameters.
    pub fn validate(&self) -> Result<()> {
        let unit = |v: Scalar| (0.0..=1.0).contains(&v);
        if !unit(self.noise_scale) {
            return Err(EisError::InvalidNoiseScale {
                name: "noise_scale",
                value: self.noise_scale,
            });
        }
        if !(self.excitation_voltage.is_finite() && self.excitation_voltage > 0.0) {
            return Err(EisError::InvalidNoiseScale {
                name: "excitation_voltage",
                value: self.excitation_voltage,
            });
        }
        if !unit(self.outlier_fraction) {
            return Err(EisError::InvalidNoiseScale {
                name: "outlier_fraction",
                value: self.outlier_fraction,
            });
        }
        if !(self.outlier_amplitude.is_finite() && self.outlier_amplitude >= 0.0) {
            return Err(EisError::InvalidNoiseScale {
                name: "outlier_amplitude",
                value: self.outlier_amplitude,
            });
        }
        Ok(())
    }
}

/// One appended column, written as `<name>_noise [<unit>]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseColumn {
    /// Name of the clean column this one shadows.
    pub name: String,
    /// Unit label.
    pub unit: String,
    /// Noisy values.
    pub values: Vec<Scalar>,
}

impl NoiseColumn {
    /// Creates a column.
    #[must_use]
    pub fn new(name: &str, unit: &str, values: Vec<Scalar>) -> Self {
        Self {
            name: name.to_owned(),
            unit: unit.to_owned(),
            values,
        }
    }

    /// Column header.
    #[must_use]
    pub fn header(&self) -> String {
        format!("{}_noise [{}]", self.name, self.unit)
    }
}

/// Ordered set of appended noise columns.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseColumns {
    columns: Vec<NoiseColumn>,
}

impl NoiseColumns {
    /// Appends a column, replacing one with the same name.
    pub fn push(&mut self, column: NoiseColumn) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Noisy column shadowing the clean column `name` (e.g. `Re_Z`).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NoiseColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns in append order.
    pub fn iter(&self) -> impl Iterator<Item = &NoiseColumn> + '_ {
        self.columns.iter()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if no noise was applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Read-only view of the clean columns an alteration works from.
#[derive(Debug, Clone, Copy)]
pub struct CleanColumns<'a> {
    /// Frequencies in Hz.
    pub frequency: &'a [Scalar],
    /// Angular frequencies in rad/s.
    pub angular_frequency: &'a [Scalar],
    /// Clean impedance response.
    pub response: &'a ImpedanceResponse,
}

/// Applies `alteration` and returns the appended columns.
///
/// For [`Alteration::FreqNoise`] only the jittered frequency columns are
/// produced here; the record assembler re-evaluates the circuit for the
/// impedance columns.
pub fn apply<R: Rng + ?Sized>(
    alteration: Alteration,
    clean: CleanColumns<'_>,
    params: &AlterationParams,
    rng: &mut R,
) -> Result<NoiseColumns> {
    params.validate()?;
    let s = params.noise_scale;
    let z = clean.response.complex.as_slice();
    let mut out = NoiseColumns::default();
    match alteration {
        Alteration::FreqNoise => {
            let (f, w) =
                freq_noise(clean.frequency, clean.angular_frequency, s, params.branch, rng);
            out.push(NoiseColumn::new("freq", "Hz", f));
            out.push(NoiseColumn::new("angular_freq", "1/s", w));
        }
        Alteration::RealNoise => {
            let re = jitter(&clean.response.real, s, params.branch, rng);
            out.push(NoiseColumn::new("Re_Z", "ohm", re));
        }
        Alteration::ImagNoise => {
            let im = jitter(&clean.response.imag, s, params.branch, rng);
            out.push(NoiseColumn::new("Im_Z", "ohm", im));
        }
        Alteration::ComplexNoise => push_impedance(&mut out, &complex_noise(z, s, rng)),
        Alteration::CurrentNoise => {
            push_impedance(&mut out, &current_noise(z, params.excitation_voltage, s, rng));
        }
        Alteration::VoltageNoise => {
            push_impedance(&mut out, &voltage_noise(z, params.excitation_voltage, s, rng));
        }
        Alteration::IvNoise => {
            push_impedance(&mut out, &iv_noise(z, params.excitation_voltage, s, rng));
        }
        Alteration::Outliers => push_impedance(
            &mut out,
            &outliers(z, params.outlier_fraction, params.outlier_amplitude, rng),
        ),
    }
    tracing::debug!(%alteration, noise_scale = s, columns = out.len(), "applied alteration");
    Ok(out)
}

/// Appends `Re_Z_noise` and `Im_Z_noise` built from `z`.
pub(crate) fn push_impedance(out: &mut NoiseColumns, z: &[CScalar]) {
    out.push(NoiseColumn::new("Re_Z", "ohm", z.iter().map(|v| v.re).collect()));
    out.push(NoiseColumn::new("Im_Z", "ohm", z.iter().map(|v| v.im).collect()));
}

/// Gaussian radius with standard deviation `sigma`.
///
/// Equivalent in distribution to `√2·σ·erfinv(2u − 1)` for uniform `u`.
fn gaussian<R: Rng + ?Sized>(rng: &mut R, sigma: Scalar) -> Scalar {
    let n: Scalar = StandardNormal.sample(rng);
    sigma * n
}

fn random_phase<R: Rng + ?Sized>(rng: &mut R) -> Scalar {
    rng.random::<Scalar>() * 2.0 * PI
}

#[inline]
fn trig_step(x: Scalar, scale: Scalar, cosine: bool) -> Scalar {
    let t = if cosine { x.cos() } else { x.sin() };
    x + scale * x * t
}

/// `x + s·x·cos(x)` or `x + s·x·sin(x)`, branch drawn per sample.
pub fn jitter<R: Rng + ?Sized>(
    values: &[Scalar],
    scale: Scalar,
    branch: BranchSelector,
    rng: &mut R,
) -> Vec<Scalar> {
    values
        .iter()
        .map(|&x| trig_step(x, scale, branch.cosine(rng)))
        .collect()
}

/// Jitters frequency and angular frequency with one branch draw per sample.
pub fn freq_noise<R: Rng + ?Sized>(
    frequency: &[Scalar],
    angular_frequency: &[Scalar],
    scale: Scalar,
    branch: BranchSelector,
    rng: &mut R,
) -> (Vec<Scalar>, Vec<Scalar>) {
    frequency
        .iter()
        .zip(angular_frequency)
        .map(|(&f, &w)| {
            let cosine = branch.cosine(rng);
            (trig_step(f, scale, cosine), trig_step(w, scale, cosine))
        })
        .unzip()
}

/// Adds a Gaussian radius with uniform phase to every sample.
///
/// The standard deviation is `scale·|Re(z_last)|`, the real part of the last
/// (lowest-frequency) sample.
pub fn complex_noise<R: Rng + ?Sized>(z: &[CScalar], scale: Scalar, rng: &mut R) -> Vec<CScalar> {
    let reference = z.last().map_or(0.0, |v| v.re.abs());
    let sigma = scale * reference;
    z.iter()
        .map(|&v| v + polar(gaussian(rng, sigma), random_phase(rng)))
        .collect()
}

/// Perturbs `I = V/Z` by a Gaussian phasor with σ = `scale·|I|`, returns `V/I'`.
pub fn current_noise<R: Rng + ?Sized>(
    z: &[CScalar],
    voltage: Scalar,
    scale: Scalar,
    rng: &mut R,
) -> Vec<CScalar> {
    z.iter()
        .map(|&v| {
            let current = voltage / v;
            let noisy = current + polar(gaussian(rng, scale * current.norm()), random_phase(rng));
            voltage / noisy
        })
        .collect()
}

/// Perturbs the excitation by a Gaussian with σ = `scale·V`, returns `V'/I`.
pub fn voltage_noise<R: Rng + ?Sized>(
    z: &[CScalar],
    voltage: Scalar,
    scale: Scalar,
    rng: &mut R,
) -> Vec<CScalar> {
    z.iter()
        .map(|&v| {
            let current = voltage / v;
            let noisy_voltage = voltage + gaussian(rng, scale * voltage);
            noisy_voltage / current
        })
        .collect()
}

/// Perturbs voltage and current with one shared standard-normal draw per sample.
pub fn iv_noise<R: Rng + ?Sized>(
    z: &[CScalar],
    voltage: Scalar,
    scale: Scalar,
    rng: &mut R,
) -> Vec<CScalar> {
    z.iter()
        .map(|&v| {
            let current = voltage / v;
            let n = gaussian(rng, 1.0);
            let noisy_voltage = voltage + scale * voltage * n;
            let noisy_current = current + polar(scale * current.norm() * n, random_phase(rng));
            noisy_voltage / noisy_current
        })
        .collect()
}

/// Turns each sample into an outlier with probability `fraction`.
///
/// Outliers move by `±amplitude·|z|` in a uniformly random direction.
pub fn outliers<R: Rng + ?Sized>(
    z: &[CScalar],
    fraction: Scalar,
    amplitude: Scalar,
    rng: &mut R,
) -> Vec<CScalar> {
    z.iter()
        .map(|&v| {
            if rng.random_bool(fraction) {
                let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                v + polar(sign * amplitude * v.norm(), random_phase(rng))
            } else {
                v
            }
        })
        .collect()
}

/// Rescales `values` into `[0, 1]`.
///
/// Shifts by `|min|` when the minimum is negative, then divides by the maximum
/// when it exceeds one. Already-normalized input is returned unchanged.
///
/// # Errors
///
/// [`EisError::Numeric`] on non-finite input.
pub fn normalize(values: &[Scalar]) -> Result<Vec<Scalar>> {
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(EisError::Numeric(format!("cannot normalize non-finite value {bad}")));
    }
    let mut out = values.to_vec();
    let min = out.iter().copied().fold(Scalar::INFINITY, Scalar::min);
    if min < 0.0 {
        let shift = min.abs();
        out.iter_mut().for_each(|v| *v += shift);
    }
    let max = out.iter().copied().fold(Scalar::NEG_INFINITY, Scalar::max);
    if max > 1.0 {
        out.iter_mut().for_each(|v| *v /= max);
    }
    Ok(out)
}
