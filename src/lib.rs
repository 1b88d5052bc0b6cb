#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Sweep and file format constants.
pub mod constants;
/// Shared scalar and complex helpers.
pub mod math;
/// Logarithmic frequency sweeps.
pub mod sweep;
/// Equivalent-circuit catalogue and evaluators.
pub mod circuits;
/// Real/imaginary/magnitude/phase decomposition.
pub mod impedance;
/// Synthetic noise and normalization.
pub mod alterations;
/// Labeled record assembly.
pub mod record;
/// Record files: naming, layout and the dataset writer.
pub mod io;
/// Error types shared between submodules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
