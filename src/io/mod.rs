//! I/O helpers for persisting simulation records.

/// Tag-based selection of record files.
pub mod catalog;
/// File name convention and parsing.
pub mod filename;
/// Metadata header and tabular body format.
pub mod format;
/// Collision-free dataset writer.
pub mod writer;

pub use catalog::{find_records, RecordQuery};
pub use filename::{ParsedFileName, SimulationFileName};
pub use format::{
    parse_complex, read_body, read_metadata, read_record, write_body, write_metadata, write_record,
    HeaderMetadata, RecordBody, RecordColumn, StoredRecord,
};
pub use writer::{DatasetWriter, WriterConfig, WrittenRecord};
