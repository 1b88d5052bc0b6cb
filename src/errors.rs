//! Shared error types used across submodules.

use std::path::PathBuf;

use thiserror::Error;

use crate::circuits::Topology;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum EisError {
    /// Frequency bounds are inverted, non-positive or the density is zero.
    #[error("invalid frequency range: high={high} Hz, low={low} Hz, decades={decades}")]
    InvalidRange {
        /// Upper bound in hertz.
        high: f64,
        /// Lower bound in hertz.
        low: f64,
        /// Points per decade.
        decades: usize,
    },
    /// The number of supplied circuit elements does not match the topology.
    #[error("{topology} expects {expected} circuit elements, got {found}")]
    ParameterCount {
        /// Requested topology.
        topology: Topology,
        /// Arity of the topology.
        expected: usize,
        /// Number of supplied elements.
        found: usize,
    },
    /// The element count is right but the names are not.
    #[error("{topology} requires element `{missing}` (found unexpected `{unexpected}`)")]
    ParameterMismatch {
        /// Requested topology.
        topology: Topology,
        /// First required name that was not supplied.
        missing: &'static str,
        /// First supplied name the topology does not know.
        unexpected: String,
    },
    /// Non-finite or domain-invalid numeric value.
    #[error("numeric error: {0}")]
    Numeric(String),
    /// Column lengths disagree while assembling a record.
    #[error("length mismatch in {context}: expected {expected}, got {found}")]
    LengthMismatch {
        /// Where the mismatch was detected.
        context: &'static str,
        /// Sweep length.
        expected: usize,
        /// Offending length.
        found: usize,
    },
    /// Noise parameters outside of their admissible range.
    #[error("invalid alteration parameter `{name}` = {value}")]
    InvalidNoiseScale {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Every serial number for one date in one directory is taken.
    #[error("no free serial number left for {date} in {}", dir.display())]
    FileCollisionExhausted {
        /// `YYMMDD` date stamp.
        date: String,
        /// Output directory.
        dir: PathBuf,
    },
    /// Circuit name outside of the supported catalogue.
    #[error("unsupported circuit topology: {0}")]
    UnsupportedTopology(String),
    /// Alteration name outside of the supported catalogue.
    #[error("unsupported alteration: {0}")]
    UnsupportedAlteration(String),
    /// Malformed file name or metadata header.
    #[error("malformed record: {0}")]
    Format(String),
    /// Filesystem failure while writing or reading records.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EisError>;
