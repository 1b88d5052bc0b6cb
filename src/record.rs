//! Assembly of labeled simulation records.

use rand::Rng;

use crate::alterations::{self, Alteration, AlterationParams, CleanColumns, NoiseColumns};
use crate::circuits::{evaluate, CircuitElements, CircuitSpec, Topology};
use crate::constants::SIMULATION_SOURCE;
use crate::errors::{EisError, Result};
use crate::impedance::{decompose, ImpedanceResponse, PhaseConvention};
use crate::math::{CScalar, Scalar};
use crate::sweep::FrequencySweep;

/// Header of the frequency column.
pub const FREQ_HEADER: &str = "freq [Hz]";
/// Header of the angular frequency column.
pub const ANGULAR_FREQ_HEADER: &str = "angular_freq [1/s]";
/// Header of the complex impedance column.
pub const COMPLEX_Z_HEADER: &str = "complex_Z [ohm]";
/// Header of the real part column.
pub const RE_Z_HEADER: &str = "Re_Z [ohm]";
/// Header of the imaginary part column.
pub const IM_Z_HEADER: &str = "Im_Z [ohm]";
/// Header of the magnitude column.
pub const MAG_Z_HEADER: &str = "|Z| [ohm]";
/// Header of the phase column.
pub const PHASE_HEADER: &str = "phase_angle [rad]";

/// Clean column headers, in file order.
pub const CLEAN_HEADERS: [&str; 7] = [
    FREQ_HEADER,
    ANGULAR_FREQ_HEADER,
    COMPLEX_Z_HEADER,
    RE_Z_HEADER,
    IM_Z_HEADER,
    MAG_Z_HEADER,
    PHASE_HEADER,
];

/// An alteration together with its parameters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlterationRequest {
    /// Alteration to apply.
    pub alteration: Alteration,
    /// Its parameters.
    pub params: AlterationParams,
}

impl AlterationRequest {
    /// Request with default parameters apart from the noise scale.
    #[must_use]
    pub fn new(alteration: Alteration, noise_scale: Scalar) -> Self {
        Self {
            alteration,
            params: AlterationParams::with_noise_scale(noise_scale),
        }
    }
}

/// Knobs of the assembly step that are not part of the circuit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    /// Phase angle convention.
    pub phase: PhaseConvention,
    /// Data source tag stored in the metadata.
    pub source: String,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            phase: PhaseConvention::default(),
            source: SIMULATION_SOURCE.to_owned(),
        }
    }
}

/// Labels attached to a record.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMetadata {
    /// Circuit topology, the classification ground truth.
    pub topology: Topology,
    /// Circuit element values.
    pub elements: CircuitElements,
    /// Applied alteration, if any.
    pub alteration: Option<AlterationRequest>,
    /// Data source tag.
    pub source: String,
}

/// The persisted unit: metadata plus clean and noisy columns.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRecord {
    metadata: RecordMetadata,
    sweep: FrequencySweep,
    response: ImpedanceResponse,
    noise: NoiseColumns,
}

impl SimulationRecord {
    /// Labels of the record.
    #[must_use]
    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    /// Frequency sweep.
    #[must_use]
    pub fn sweep(&self) -> &FrequencySweep {
        &self.sweep
    }

    /// Clean response.
    #[must_use]
    pub fn response(&self) -> &ImpedanceResponse {
        &self.response
    }

    /// Appended noise columns (empty when unaltered).
    #[must_use]
    pub fn noise(&self) -> &NoiseColumns {
        &self.noise
    }

    /// Number of rows; equals the sweep length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sweep.len()
    }

    /// True if the record holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sweep.is_empty()
    }

    /// Full ordered header row.
    #[must_use]
    pub fn column_headers(&self) -> Vec<String> {
        CLEAN_HEADERS
            .iter()
            .map(|h| (*h).to_owned())
            .chain(self.noise.iter().map(|c| c.header()))
            .collect()
    }

    /// Real-valued column by header; the complex column is reached via [`Self::response`].
    #[must_use]
    pub fn column(&self, header: &str) -> Option<&[Scalar]> {
        match header {
            FREQ_HEADER => Some(self.sweep.frequency()),
            ANGULAR_FREQ_HEADER => Some(self.sweep.angular_frequency()),
            RE_Z_HEADER => Some(&self.response.real),
            IM_Z_HEADER => Some(&self.response.imag),
            MAG_Z_HEADER => Some(&self.response.magnitude),
            PHASE_HEADER => Some(&self.response.phase),
            other => self
                .noise
                .iter()
                .find(|c| c.header() == other)
                .map(|c| c.values.as_slice()),
        }
    }
}

fn check_len(context: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(EisError::LengthMismatch {
            context,
            expected,
            found,
        })
    }
}

/// Runs evaluator, decomposition and the optional alteration, and assembles the record.
///
/// # Errors
///
/// Propagates evaluator, decomposition and alteration errors, and reports
/// [`EisError::LengthMismatch`] if any column disagrees with the sweep length.
pub fn simulate<R: Rng + ?Sized>(
    sweep: &FrequencySweep,
    spec: &CircuitSpec,
    alteration: Option<&AlterationRequest>,
    options: &SimulationOptions,
    rng: &mut R,
) -> Result<SimulationRecord> {
    let _span = tracing::info_span!(
        "simulate",
        topology = %spec.topology(),
        points = sweep.len(),
        alteration = alteration.map_or("None", |a| a.alteration.name()),
    )
    .entered();

    let z: Vec<CScalar> = evaluate(spec, sweep.angular_frequency())?;
    check_len("impedance", sweep.len(), z.len())?;
    let response = decompose(&z, options.phase)?;

    let mut noise = NoiseColumns::default();
    if let Some(request) = alteration {
        let clean = CleanColumns {
            frequency: sweep.frequency(),
            angular_frequency: sweep.angular_frequency(),
            response: &response,
        };
        noise = alterations::apply(request.alteration, clean, &request.params, rng)?;
        if request.alteration == Alteration::FreqNoise {
            let jittered = noise
                .get("angular_freq")
                .map(|c| c.values.clone())
                .unwrap_or_default();
            let z_noise = evaluate(spec, &jittered)?;
            alterations::push_impedance(&mut noise, &z_noise);
        }
        for column in noise.iter() {
            check_len("noise column", sweep.len(), column.values.len())?;
        }
    }

    Ok(SimulationRecord {
        metadata: RecordMetadata {
            topology: spec.topology(),
            elements: spec.elements().clone(),
            alteration: alteration.copied(),
            source: options.source.clone(),
        },
        sweep: sweep.clone(),
        response,
        noise,
    })
}
