//! Convenience re-exports for building simulated datasets.

pub use crate::alterations::{
    normalize, Alteration, AlterationParams, BranchSelector, NoiseColumn, NoiseColumns,
};
pub use crate::circuits::{
    evaluate, CircuitElements, CircuitSpec, Component, ElementKind, Topology,
};
pub use crate::constants::*;
pub use crate::errors::{EisError, Result};
pub use crate::impedance::{decompose, ImpedanceResponse, PhaseConvention};
pub use crate::io::{
    find_records, read_metadata, read_record, DatasetWriter, HeaderMetadata, ParsedFileName,
    RecordBody, RecordColumn, RecordQuery, SimulationFileName, StoredRecord, WriterConfig,
    WrittenRecord,
};
pub use crate::math::{CScalar, Scalar};
pub use crate::record::{
    simulate, AlterationRequest, RecordMetadata, SimulationOptions, SimulationRecord,
};
pub use crate::sweep::{freq_gen, FrequencySweep, SweepConfig};
