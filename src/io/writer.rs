//! Collision-free dataset writer.
//!
//! Serial numbers are allocated per calendar date and directory. A serial is
//! reserved by exclusively creating a hidden `.{date}-{serial}.partial` file,
//! which receives the record and is renamed into place once fully written.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::constants::MAX_SERIAL;
use crate::errors::{EisError, Result};
use crate::record::SimulationRecord;

use super::filename::{split_serial_id, SimulationFileName};
use super::format::write_record;

const PARTIAL_EXTENSION: &str = "partial";

/// Output settings injected by the caller.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    /// Directory receiving the records; created on demand.
    pub save_dir: PathBuf,
    /// Cell delimiter of the tabular body.
    pub delimiter: char,
    /// Highest serial handed out per date, capped at 9999.
    pub max_serial: u32,
}

impl WriterConfig {
    /// Comma-delimited output into `save_dir`.
    #[must_use]
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            delimiter: ',',
            max_serial: MAX_SERIAL,
        }
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::new("simulation_data")
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRecord {
    /// Final path of the record.
    pub path: PathBuf,
    /// Name the record was stored under.
    pub name: SimulationFileName,
}

/// Writes records under unique, date-scoped serial numbers.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    config: WriterConfig,
}

/// Serial encoded in a record or reservation file name for `date`.
fn serial_of(file_name: &str, date: &str) -> Option<u32> {
    let name = file_name.strip_prefix('.').unwrap_or(file_name);
    let id_end = name.find(['_', '.'])?;
    let (d, serial) = split_serial_id(&name[..id_end])?;
    (d == date).then_some(serial)
}

fn scan_serials(dir: &Path, date: &str, include_partial: bool) -> Result<HashSet<u32>> {
    let mut used = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !include_partial && name.starts_with('.') {
            continue;
        }
        if let Some(serial) = serial_of(name, date) {
            used.insert(serial);
        }
    }
    Ok(used)
}

/// A reserved serial and its open reservation file.
struct Reservation {
    serial: u32,
    partial: PathBuf,
    file: File,
}

impl DatasetWriter {
    /// Creates a writer.
    #[must_use]
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Writer configuration.
    #[must_use]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Writes `record` under today's local date.
    pub fn write_today(&self, record: &SimulationRecord) -> Result<WrittenRecord> {
        self.write(record, Local::now().date_naive())
    }

    /// Writes `record` under `date`.
    ///
    /// # Errors
    ///
    /// [`EisError::FileCollisionExhausted`] when every serial of the date is
    /// taken, [`EisError::Io`] on filesystem failures. No partial record is
    /// left behind on failure.
    pub fn write(&self, record: &SimulationRecord, date: NaiveDate) -> Result<WrittenRecord> {
        let dir = self.config.save_dir.as_path();
        fs::create_dir_all(dir)?;
        let date = date.format("%y%m%d").to_string();
        let reservation = self.reserve(dir, &date)?;
        let serial = reservation.serial;

        let meta = record.metadata();
        let name = SimulationFileName::new(
            date,
            serial,
            meta.topology,
            meta.alteration.map(|a| a.alteration),
        );
        let path = dir.join(name.file_name());

        commit(reservation, &path, &name.serial_id(), record, self.config.delimiter)?;
        tracing::info!(path = %path.display(), rows = record.len(), "wrote simulation record");
        Ok(WrittenRecord { path, name })
    }

    /// Finds the lowest free serial for `date` and reserves it.
    fn reserve(&self, dir: &Path, date: &str) -> Result<Reservation> {
        let used = scan_serials(dir, date, true)?;
        let max_serial = self.config.max_serial.min(MAX_SERIAL);
        for serial in (1..=max_serial).filter(|s| !used.contains(s)) {
            let partial = dir.join(format!(".{date}-{serial:04}.{PARTIAL_EXTENSION}"));
            let file = match OpenOptions::new().write(true).create_new(true).open(&partial) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!(serial, "serial reserved concurrently, trying the next one");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            // A concurrent writer may have finished this serial after the scan.
            if scan_serials(dir, date, false)?.contains(&serial) {
                drop(file);
                fs::remove_file(&partial)?;
                tracing::warn!(serial, "serial completed concurrently, trying the next one");
                continue;
            }
            return Ok(Reservation {
                serial,
                partial,
                file,
            });
        }
        Err(EisError::FileCollisionExhausted {
            date: date.to_owned(),
            dir: dir.to_path_buf(),
        })
    }
}

/// Fills the reservation and renames it to `path`.
///
/// The reservation file is removed if any step fails.
fn commit(
    reservation: Reservation,
    path: &Path,
    serial_id: &str,
    record: &SimulationRecord,
    delimiter: char,
) -> Result<()> {
    let Reservation { partial, file, .. } = reservation;
    let written = write_and_sync(file, serial_id, record, delimiter)
        .and_then(|()| fs::rename(&partial, path).map_err(EisError::from));
    if let Err(err) = written {
        if let Err(cleanup) = fs::remove_file(&partial) {
            tracing::warn!(
                path = %partial.display(),
                %cleanup,
                "failed to remove partial record"
            );
        }
        return Err(err);
    }
    Ok(())
}

fn write_and_sync(
    file: File,
    serial_id: &str,
    record: &SimulationRecord,
    delimiter: char,
) -> Result<()> {
    let mut out = BufWriter::new(file);
    write_record(&mut out, serial_id, record, delimiter)?;
    let file = out.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()?;
    Ok(())
}
